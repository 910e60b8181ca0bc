//! # Frame Context
//!
//! Owns everything that lives longer than one frame: the style, the retained
//! widget state, the frame arena and the three backends. One call to
//! [`Context::new_frame`] runs the whole pipeline:
//!
//! ```text
//! callback(&mut RootCanvas) → balance check → screen bounds → emit → optimize → backend
//! ```
//!
//! A failing step aborts the frame before the backend sees anything, so the
//! previously submitted command list stays in effect.

use crate::canvas::{RootCanvas, ScreenBounds, SCREEN_BOUNDS};
use crate::command::CommandList;
use crate::config::{ContextConfig, GlintConfig};
use crate::emitter::Emitter;
use crate::error::UiResult;
use crate::fonts::FontBackend;
use crate::input::InputBackend;
use crate::optimizer::optimize;
use crate::primitive::Op;
use crate::render::RenderBackend;
use crate::style::Style;
use glint_core::{Arena, Point, Size, StateManager};
use smallvec::SmallVec;

/// Counters describing one finished frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Entries in the operation log.
    pub ops: usize,
    /// Commands submitted to the render backend.
    pub commands: usize,
    /// Vertices across all submitted batches.
    pub vertices: usize,
    /// Regions skipped by the emitter because they were clipped away.
    pub discarded_regions: usize,
}

/// The immediate-mode UI context.
pub struct Context<I, F, R> {
    config: ContextConfig,
    style: Style,
    state: StateManager,
    ops: Arena<Op>,
    input: I,
    fonts: F,
    render: R,
    frame_index: u64,
}

impl<I, F, R> Context<I, F, R>
where
    I: InputBackend,
    F: FontBackend,
    R: RenderBackend,
{
    /// Creates a context from its configuration and backends.
    pub fn new(config: GlintConfig, input: I, fonts: F, render: R) -> Self {
        let GlintConfig { context, style } = config;
        Self {
            state: StateManager::with_min_batch(context.min_batch_size),
            ops: Arena::new(context.op_capacity),
            config: context,
            style,
            input,
            fonts,
            render,
            frame_index: 0,
        }
    }

    /// Builds, lays out and submits one frame of `width` by `height` pixels.
    ///
    /// # Errors
    ///
    /// Any error returned by `callback`, an unbalanced region stack, or a
    /// retained state collision. The render backend is not touched when this
    /// fails.
    pub fn new_frame<C>(&mut self, width: f32, height: f32, delta_time: f32, callback: C) -> UiResult<FrameStats>
    where
        C: FnOnce(&mut RootCanvas<'_>) -> UiResult<()>,
    {
        let span = tracing::trace_span!("frame", index = self.frame_index, width, height);
        let _entered = span.enter();

        let size = Size::new(width, height);
        let mut ops = self.ops.acquire();
        {
            let mut canvas = RootCanvas::new(
                &mut ops,
                &mut self.state,
                &self.style,
                &self.input,
                &self.fonts,
                size,
                delta_time,
            );
            callback(&mut canvas)?;
            canvas.finish()?;
        }

        resolve_screen_bounds(&ops, &mut self.state)?;

        let mut emitter = Emitter::new(&self.style, &self.fonts);
        let mut commands = CommandList::with_capacity(self.config.command_capacity);
        emitter.transform(size, &ops, &mut commands);
        if self.config.optimize_commands {
            optimize(&mut commands);
        }

        let stats = FrameStats {
            ops: ops.len(),
            commands: commands.len(),
            vertices: commands.iter().map(crate::command::Command::vertex_count).sum(),
            discarded_regions: emitter.discarded_regions(),
        };
        drop(ops);

        self.render.update_command_list(commands);
        self.render.emit(size);
        self.frame_index += 1;
        tracing::trace!(?stats, "frame submitted");
        Ok(stats)
    }

    /// Drops all retained widget state. Use after changes that invalidate it,
    /// such as a font or DPI change.
    pub fn reset_cache(&mut self) {
        tracing::debug!(frame = self.frame_index, "resetting widget cache");
        self.state.reset();
    }

    /// Current style.
    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Style for modification between frames.
    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    /// Pipeline settings.
    #[must_use]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Input backend.
    #[must_use]
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Input backend, for feeding events between frames.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Font backend.
    #[must_use]
    pub fn fonts(&self) -> &F {
        &self.fonts
    }

    /// Font backend, for loading fonts between frames.
    pub fn fonts_mut(&mut self) -> &mut F {
        &mut self.fonts
    }

    /// Render backend.
    #[must_use]
    pub fn render(&self) -> &R {
        &self.render
    }

    /// Render backend, for creating textures.
    pub fn render_mut(&mut self) -> &mut R {
        &mut self.render
    }

    /// Retained widget state.
    #[must_use]
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Number of frames submitted so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Usage of the op log arena.
    #[must_use]
    pub fn arena_stats(&self) -> glint_core::ArenaStats {
        self.ops.stats()
    }
}

/// Records the absolute bounds of every region for next frame's hit testing.
fn resolve_screen_bounds(ops: &[Op], state: &mut StateManager) -> UiResult<()> {
    let mut origins: SmallVec<[Point; 16]> = SmallVec::new();
    origins.push(Point::ZERO);
    for op in ops {
        match op {
            Op::PushRegion { uid, bounds } => {
                let parent = origins[origins.len() - 1];
                let absolute = bounds.offset(parent);
                *state.ensure::<ScreenBounds>(uid.mix_tag(SCREEN_BOUNDS))? = ScreenBounds(absolute);
                origins.push(absolute.origin());
            }
            Op::PopRegion => {
                if origins.len() > 1 {
                    origins.pop();
                }
            }
            Op::Primitive(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::fonts::MonospaceFonts;
    use crate::input::InputState;
    use crate::primitive::Primitive;
    use crate::render::HeadlessRenderer;
    use crate::UiError;
    use glint_core::{Bounds, Color, Uid};

    type TestContext = Context<InputState, MonospaceFonts, HeadlessRenderer>;

    fn context() -> TestContext {
        Context::new(
            GlintConfig::default(),
            InputState::new(),
            MonospaceFonts::new(),
            HeadlessRenderer::new(),
        )
    }

    fn panel(canvas: &mut RootCanvas<'_>) -> UiResult<()> {
        canvas.push_region(Uid::tag("panel"), Some(Bounds::new(10.0, 20.0, 60.0, 70.0)));
        canvas.push_region(Uid::tag("inner"), Some(Bounds::new(5.0, 5.0, 15.0, 15.0)));
        canvas.add_primitive(
            Uid::tag("fill"),
            Primitive::filled(Bounds::new(0.0, 0.0, 10.0, 10.0), Color::WHITE),
        );
        canvas.pop_region(None)?;
        canvas.pop_region(None)?;
        Ok(())
    }

    #[test]
    fn test_frame_submits_to_backend() {
        let mut ctx = context();
        let stats = ctx.new_frame(100.0, 100.0, 0.016, panel).unwrap();
        assert_eq!(stats.ops, 5);
        assert_eq!(stats.commands, 1);
        assert_eq!(stats.vertices, 6);
        assert_eq!(ctx.render().updates(), 1);
        assert_eq!(ctx.render().last_size(), Some(Size::new(100.0, 100.0)));
        assert_eq!(ctx.frame_index(), 1);
    }

    #[test]
    fn test_screen_bounds_are_absolute() {
        let mut ctx = context();
        ctx.new_frame(100.0, 100.0, 0.016, panel).unwrap();
        let inner = Uid::ROOT.mix(Uid::tag("panel")).mix(Uid::tag("inner"));
        let screen = ctx
            .state()
            .get::<ScreenBounds>(inner.mix_tag(SCREEN_BOUNDS))
            .unwrap();
        assert_eq!(screen.0, Bounds::new(15.0, 25.0, 25.0, 35.0));
    }

    #[test]
    fn test_failed_frame_keeps_previous_commands() {
        let mut ctx = context();
        ctx.new_frame(100.0, 100.0, 0.016, panel).unwrap();

        let result = ctx.new_frame(100.0, 100.0, 0.016, |canvas| {
            canvas.push_region(Uid::tag("left-open"), None);
            Ok(())
        });
        assert!(matches!(result, Err(UiError::UnbalancedRegions { open: 1 })));
        assert_eq!(ctx.render().updates(), 1);
        assert_eq!(ctx.render().commands().len(), 1);
        assert_eq!(ctx.frame_index(), 1);
        assert_eq!(ctx.arena_stats().in_use, 0);
    }

    #[test]
    fn test_callback_error_propagates() {
        let mut ctx = context();
        let result = ctx.new_frame(10.0, 10.0, 0.0, |canvas| {
            canvas.pop_region(None)?;
            Ok(())
        });
        assert!(matches!(result, Err(UiError::PopWithoutPush)));
        assert_eq!(ctx.render().updates(), 0);
    }

    #[test]
    fn test_reset_cache_clears_state() {
        let mut ctx = context();
        ctx.new_frame(100.0, 100.0, 0.016, panel).unwrap();
        assert!(!ctx.state().is_empty());
        ctx.reset_cache();
        assert!(ctx.state().is_empty());
    }

    #[test]
    fn test_style_changes_apply_next_frame() {
        let mut ctx = context();
        ctx.style_mut().spacing = glint_core::Point::new(2.0, 2.0);
        assert_eq!(ctx.style().spacing.x, 2.0);
    }
}
