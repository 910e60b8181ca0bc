//! # Canvas / Region Protocol
//!
//! Widgets describe a frame by calling into a [`Canvas`]: they open regions,
//! add primitives inside them, and close them again. Every call appends to the
//! frame's operation log. Layouts are decorators that implement the same trait
//! and forward to the canvas they wrap.
//!
//! ```text
//! push_region(row)            ┐
//!   push_region(label)        │ op log: [Push row, Push label, Prim text,
//!     add_primitive(text)     │          Pop, Push button, ..., Pop, Pop]
//!   pop_region()              │
//!   push_region(button) ...   │
//! pop_region()                ┘
//! ```

use crate::error::{UiError, UiResult};
use crate::fonts::FontBackend;
use crate::input::{InputBackend, Key};
use crate::primitive::{Op, Primitive};
use crate::style::Style;
use glint_core::{Bounds, Size, StateManager, Uid};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Tag mixed into a region uid to key its last resolved (parent-relative)
/// bounds.
pub const LAST_BOUNDS: &str = "last_bounds";
/// Tag mixed into a region uid to key its absolute screen bounds.
pub const SCREEN_BOUNDS: &str = "screen_bounds";

/// Parent-relative bounds a region resolved to.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LastBounds(pub Bounds);

/// Absolute bounds of a region in canvas pixels, resolved after the frame
/// callback returns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenBounds(pub Bounds);

/// Result of opening a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionHandle {
    /// Index of the `PushRegion` op in the caller's index space.
    pub index: usize,
    /// Mixed uid of the region.
    pub uid: Uid,
}

/// The drawing surface widgets write to.
///
/// Object safe: layouts hold a `&mut dyn Canvas`.
pub trait Canvas {
    /// Opens a region. `uid` is local and is mixed with the current region's
    /// uid. Without `reserved` bounds the push op holds a zero placeholder until
    /// it is resolved by [`pop_region`](Self::pop_region) or patched by a layout.
    fn push_region(&mut self, uid: Uid, reserved: Option<Bounds>) -> RegionHandle;

    /// Closes the innermost region, optionally overwriting its bounds, and
    /// returns the bounds it resolved to.
    ///
    /// # Errors
    ///
    /// [`UiError::PopWithoutPush`] if no region is open, or a state error if
    /// the bounds record cannot be stored.
    fn pop_region(&mut self, bounds: Option<Bounds>) -> UiResult<Bounds>;

    /// Adds a primitive to the innermost region and returns its mixed uid.
    fn add_primitive(&mut self, uid: Uid, primitive: Primitive) -> Uid;

    /// Overwrites the bounds recorded by the push op at `index`.
    ///
    /// # Errors
    ///
    /// [`UiError::NotARegion`] if the op at `index` is not a `PushRegion`.
    fn set_region_bounds(&mut self, index: usize, bounds: Bounds) -> UiResult<()>;

    /// Uid of the innermost open region.
    fn current_uid(&self) -> Uid;

    /// Number of regions opened through this canvas that are still open.
    fn depth(&self) -> usize;

    /// Number of ops appended through this canvas.
    fn op_count(&self) -> usize;

    /// Retained widget state.
    fn state(&self) -> &StateManager;

    /// Retained widget state, mutably.
    fn state_mut(&mut self) -> &mut StateManager;

    /// Style of the current frame.
    fn style(&self) -> &Style;

    /// Input of the current frame.
    fn input(&self) -> &dyn InputBackend;

    /// Font metrics.
    fn fonts(&self) -> &dyn FontBackend;

    /// Size of the whole canvas in pixels.
    fn canvas_size(&self) -> Size;

    /// Seconds since the previous frame.
    fn delta_time(&self) -> f32;

    /// Bounds of the innermost open region as last resolved, or the whole
    /// canvas when no region is open.
    fn region_bounds(&self) -> Bounds {
        if self.depth() == 0 {
            return Bounds::from_size(self.canvas_size());
        }
        self.last_bounds(self.current_uid()).unwrap_or(Bounds::ZERO)
    }

    /// Mixes a local uid with the current region's uid.
    fn child_uid(&self, local: Uid) -> Uid {
        self.current_uid().mix(local)
    }

    /// Last resolved parent-relative bounds of the region `uid`.
    fn last_bounds(&self, uid: Uid) -> Option<Bounds> {
        self.state()
            .get::<LastBounds>(uid.mix_tag(LAST_BOUNDS))
            .map(|last| last.0)
    }

    /// Absolute bounds of the region `uid` as of the previous frame.
    fn screen_bounds(&self, uid: Uid) -> Option<Bounds> {
        self.state()
            .get::<ScreenBounds>(uid.mix_tag(SCREEN_BOUNDS))
            .map(|screen| screen.0)
    }

    /// Returns true if the cursor is inside the absolute `bounds`.
    fn hovered(&self, bounds: Bounds) -> bool {
        bounds.contains(self.input().cursor_pos())
    }

    /// Returns true if `key` went down this frame with the cursor inside the
    /// absolute `bounds`.
    fn pressed(&self, key: Key, bounds: Bounds) -> bool {
        self.hovered(bounds) && self.input().key_pulse(key, false)
    }
}

/// Typed helpers available on every canvas, including `dyn Canvas`.
pub trait CanvasExt: Canvas {
    /// Returns the state of type `T` stored at `uid`, registering `T` with its
    /// `Default` constructor on first use.
    ///
    /// # Errors
    ///
    /// [`StateError::Collision`](glint_core::StateError::Collision) if `uid`
    /// already holds a different type.
    fn storage<T: Default + 'static>(&mut self, uid: Uid) -> UiResult<&mut T> {
        Ok(self.state_mut().ensure::<T>(uid)?)
    }
}

impl<C: Canvas + ?Sized> CanvasExt for C {}

/// Stores the resolved bounds of a region.
pub(crate) fn store_last_bounds(state: &mut StateManager, uid: Uid, bounds: Bounds) -> UiResult<()> {
    *state.ensure::<LastBounds>(uid.mix_tag(LAST_BOUNDS))? = LastBounds(bounds);
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct RegionEntry {
    index: usize,
    uid: Uid,
}

/// The canvas at the bottom of every decorator chain. Records one frame's op
/// log into a buffer the caller owns.
pub struct RootCanvas<'f> {
    ops: &'f mut Vec<Op>,
    stack: SmallVec<[RegionEntry; 16]>,
    seen: HashSet<Uid>,
    state: &'f mut StateManager,
    style: &'f Style,
    input: &'f dyn InputBackend,
    fonts: &'f dyn FontBackend,
    size: Size,
    delta_time: f32,
}

impl<'f> RootCanvas<'f> {
    /// Creates a canvas writing into `ops`, which is cleared first.
    pub fn new(
        ops: &'f mut Vec<Op>,
        state: &'f mut StateManager,
        style: &'f Style,
        input: &'f dyn InputBackend,
        fonts: &'f dyn FontBackend,
        size: Size,
        delta_time: f32,
    ) -> Self {
        ops.clear();
        Self {
            ops,
            stack: SmallVec::new(),
            seen: HashSet::new(),
            state,
            style,
            input,
            fonts,
            size,
            delta_time,
        }
    }

    /// The operation log recorded so far.
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Ends the frame, releasing the borrows of the op log and state.
    ///
    /// # Errors
    ///
    /// [`UiError::UnbalancedRegions`] if regions are still open.
    pub fn finish(self) -> UiResult<()> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(UiError::UnbalancedRegions {
                open: self.stack.len(),
            })
        }
    }
}

impl Canvas for RootCanvas<'_> {
    fn push_region(&mut self, uid: Uid, reserved: Option<Bounds>) -> RegionHandle {
        let uid = self.current_uid().mix(uid);
        let index = self.ops.len();
        self.ops.push(Op::PushRegion {
            uid,
            bounds: reserved.unwrap_or(Bounds::ZERO),
        });
        if !self.seen.insert(uid) {
            tracing::warn!(%uid, "duplicate widget identity in one frame; disambiguate with Uid::indexed");
        }
        self.stack.push(RegionEntry { index, uid });
        RegionHandle { index, uid }
    }

    fn pop_region(&mut self, bounds: Option<Bounds>) -> UiResult<Bounds> {
        let entry = self.stack.pop().ok_or(UiError::PopWithoutPush)?;
        self.ops.push(Op::PopRegion);
        let resolved = match (bounds, &mut self.ops[entry.index]) {
            (Some(new_bounds), Op::PushRegion { bounds, .. }) => {
                *bounds = new_bounds;
                new_bounds
            }
            (None, Op::PushRegion { bounds, .. }) => *bounds,
            _ => return Err(UiError::NotARegion { index: entry.index }),
        };
        store_last_bounds(self.state, entry.uid, resolved)?;
        Ok(resolved)
    }

    fn add_primitive(&mut self, uid: Uid, primitive: Primitive) -> Uid {
        let uid = self.current_uid().mix(uid);
        self.ops.push(Op::Primitive(primitive));
        uid
    }

    fn set_region_bounds(&mut self, index: usize, new_bounds: Bounds) -> UiResult<()> {
        match self.ops.get_mut(index) {
            Some(Op::PushRegion { bounds, .. }) => {
                *bounds = new_bounds;
                Ok(())
            }
            _ => Err(UiError::NotARegion { index }),
        }
    }

    fn current_uid(&self) -> Uid {
        self.stack.last().map_or(Uid::ROOT, |entry| entry.uid)
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn op_count(&self) -> usize {
        self.ops.len()
    }

    fn state(&self) -> &StateManager {
        self.state
    }

    fn state_mut(&mut self) -> &mut StateManager {
        self.state
    }

    fn style(&self) -> &Style {
        self.style
    }

    fn input(&self) -> &dyn InputBackend {
        self.input
    }

    fn fonts(&self) -> &dyn FontBackend {
        self.fonts
    }

    fn canvas_size(&self) -> Size {
        self.size
    }

    fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Prefers bounds reserved on the push op over the previous frame's record.
    fn region_bounds(&self) -> Bounds {
        let Some(entry) = self.stack.last() else {
            return Bounds::from_size(self.size);
        };
        match &self.ops[entry.index] {
            Op::PushRegion { bounds, .. } if !bounds.is_empty() => *bounds,
            _ => self.last_bounds(entry.uid).unwrap_or(Bounds::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::MonospaceFonts;
    use crate::input::InputState;
    use glint_core::{Color, Point};

    struct Fixture {
        ops: Vec<Op>,
        state: StateManager,
        style: Style,
        input: InputState,
        fonts: MonospaceFonts,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ops: Vec::new(),
                state: StateManager::new(),
                style: Style::default(),
                input: InputState::new(),
                fonts: MonospaceFonts::new(),
            }
        }

        fn canvas(&mut self) -> RootCanvas<'_> {
            RootCanvas::new(
                &mut self.ops,
                &mut self.state,
                &self.style,
                &self.input,
                &self.fonts,
                Size::new(200.0, 100.0),
                0.016,
            )
        }
    }

    #[test]
    fn test_push_pop_resolves_bounds() {
        let mut fixture = Fixture::new();
        let mut canvas = fixture.canvas();

        let outer = canvas.push_region(Uid::tag("outer"), Some(Bounds::new(0.0, 0.0, 50.0, 50.0)));
        assert_eq!(outer.uid, Uid::ROOT.mix(Uid::tag("outer")));
        assert_eq!(canvas.depth(), 1);

        let inner = canvas.push_region(Uid::tag("inner"), None);
        assert_eq!(inner.uid, outer.uid.mix(Uid::tag("inner")));
        let resolved = canvas.pop_region(Some(Bounds::new(2.0, 2.0, 10.0, 10.0))).unwrap();
        assert_eq!(resolved, Bounds::new(2.0, 2.0, 10.0, 10.0));

        let resolved = canvas.pop_region(None).unwrap();
        assert_eq!(resolved, Bounds::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(canvas.depth(), 0);
        assert_eq!(canvas.last_bounds(inner.uid), Some(Bounds::new(2.0, 2.0, 10.0, 10.0)));

        match &canvas.ops()[inner.index] {
            Op::PushRegion { bounds, .. } => assert_eq!(*bounds, Bounds::new(2.0, 2.0, 10.0, 10.0)),
            other => panic!("unexpected op {other:?}"),
        }
        assert_eq!(canvas.op_count(), 4);
        canvas.finish().unwrap();
    }

    #[test]
    fn test_pop_without_push() {
        let mut fixture = Fixture::new();
        let mut canvas = fixture.canvas();
        assert!(matches!(canvas.pop_region(None), Err(UiError::PopWithoutPush)));
    }

    #[test]
    fn test_unbalanced_finish() {
        let mut fixture = Fixture::new();
        let mut canvas = fixture.canvas();
        canvas.push_region(Uid::tag("a"), None);
        canvas.push_region(Uid::tag("b"), None);
        assert!(matches!(canvas.finish(), Err(UiError::UnbalancedRegions { open: 2 })));
    }

    #[test]
    fn test_set_region_bounds_rejects_primitives() {
        let mut fixture = Fixture::new();
        let mut canvas = fixture.canvas();
        canvas.add_primitive(Uid::tag("dot"), Primitive::Point {
            at: Point::ZERO,
            color: Color::WHITE,
            size: 2.0,
        });
        assert!(matches!(
            canvas.set_region_bounds(0, Bounds::ZERO),
            Err(UiError::NotARegion { index: 0 })
        ));
        assert!(matches!(
            canvas.set_region_bounds(7, Bounds::ZERO),
            Err(UiError::NotARegion { index: 7 })
        ));
    }

    #[test]
    fn test_region_bounds_at_root_is_canvas() {
        let mut fixture = Fixture::new();
        let mut canvas = fixture.canvas();
        assert_eq!(canvas.region_bounds(), Bounds::new(0.0, 0.0, 200.0, 100.0));
        canvas.push_region(Uid::tag("panel"), Some(Bounds::new(10.0, 10.0, 60.0, 40.0)));
        assert_eq!(canvas.region_bounds().width(), 50.0);
    }

    #[test]
    fn test_storage_is_keyed_by_uid() {
        let mut fixture = Fixture::new();
        let mut canvas = fixture.canvas();
        let uid = canvas.child_uid(Uid::tag("clicks"));
        *canvas.storage::<u32>(uid).unwrap() += 3;
        assert_eq!(*canvas.storage::<u32>(uid).unwrap(), 3);
        assert!(canvas.storage::<f32>(uid).is_err());
    }

    #[test]
    fn test_hit_testing_queries_do_not_log() {
        let mut fixture = Fixture::new();
        fixture.input.set_mouse_pos(15.0, 15.0);
        fixture.input.mouse_button_down(crate::input::MouseButton::Left);
        let canvas = fixture.canvas();
        let area = Bounds::new(10.0, 10.0, 20.0, 20.0);
        assert!(canvas.hovered(area));
        assert!(canvas.pressed(Key::PRIMARY, area));
        assert!(!canvas.hovered(Bounds::new(30.0, 30.0, 40.0, 40.0)));
        assert_eq!(canvas.op_count(), 0);
    }
}
