//! Row layout: children flow left to right in lines.

use super::{forward_canvas, Align, Child, Overflow, Scope};
use crate::canvas::{Canvas, RegionHandle};
use crate::emitter::calculate_bounds;
use crate::error::UiResult;
use crate::primitive::Primitive;
use glint_core::{Bounds, Point, Size, Uid};
use smallvec::SmallVec;

type Line = SmallVec<[Child; 8]>;

/// Opens a row region `uid` in `canvas`, runs `f` inside it and closes the
/// region sized to its content.
///
/// The available width is the width of the region the row is declared in (the
/// whole canvas at the root).
///
/// # Errors
///
/// Propagates errors from `f` and fails if `f` leaves a child region open.
pub fn layout_row<F>(canvas: &mut dyn Canvas, uid: Uid, align: Align, f: F) -> UiResult<Size>
where
    F: FnOnce(&mut RowLayout<'_>) -> UiResult<()>,
{
    let available = canvas.region_bounds().width().max(0.0);
    canvas.push_region(uid, None);
    let size = {
        let mut row = RowLayout::new(canvas, align, available);
        f(&mut row)?;
        row.finish()?
    };
    canvas.pop_region(Some(Bounds::from_size(size)))?;
    Ok(size)
}

/// Canvas decorator placing its direct children in horizontal lines.
pub struct RowLayout<'a> {
    scope: Scope<'a>,
    align: Align,
    overflow: Overflow,
    available: f32,
    line: Line,
    next_top: f32,
    lines: usize,
    widest: f32,
}

impl<'a> RowLayout<'a> {
    /// Wraps `inner`, whose innermost open region becomes the row region.
    pub fn new(inner: &'a mut dyn Canvas, align: Align, available: f32) -> Self {
        let spacing = inner.style().spacing;
        Self {
            scope: Scope::new(inner),
            align,
            overflow: Overflow::Clip,
            available,
            line: Line::new(),
            next_top: spacing.y,
            lines: 0,
            widest: 0.0,
        }
    }

    /// Sets how lines wider than the available width are handled.
    pub fn set_overflow(&mut self, overflow: Overflow) {
        self.overflow = overflow;
    }

    /// Width the row lays its lines out in.
    #[must_use]
    pub fn available_width(&self) -> f32 {
        self.available
    }

    /// Ends the current line. The next child starts a new one.
    ///
    /// # Errors
    ///
    /// Fails if a child region is still open, a wrapped primitive could not
    /// be closed, or a patch is rejected.
    pub fn newline(&mut self) -> UiResult<()> {
        self.scope.ensure_closed()?;
        self.flush()
    }

    /// Places the pending line and returns the row's intrinsic size.
    ///
    /// # Errors
    ///
    /// Fails if a child region is still open, a wrapped primitive could not
    /// be closed, or a patch is rejected.
    pub fn finish(mut self) -> UiResult<Size> {
        self.newline()?;
        let spacing = self.scope.inner.style().spacing;
        let margin = spacing;
        if self.lines == 0 {
            return Ok(match self.align {
                Align::Left => Size::ZERO,
                _ => Size::new(self.available, 0.0),
            });
        }
        let width = match self.align {
            Align::Left => self.widest + margin.x * 2.0,
            _ => self.available,
        };
        let last_bottom = self.next_top - spacing.y;
        Ok(Size::new(width, last_bottom + margin.y))
    }

    fn flush(&mut self) -> UiResult<()> {
        let line = std::mem::take(&mut self.line);
        if line.is_empty() {
            return Ok(());
        }
        match self.overflow {
            Overflow::Clip => self.place_line(&line),
            Overflow::Wrap => {
                let spacing = self.scope.inner.style().spacing;
                let limit = self.available - spacing.x * 2.0;
                let mut start = 0;
                let mut width = 0.0;
                for (i, child) in line.iter().enumerate() {
                    let extra = if i == start { child.size.width } else { spacing.x + child.size.width };
                    if i > start && width + extra > limit {
                        self.place_line(&line[start..i])?;
                        start = i;
                        width = child.size.width;
                    } else {
                        width += extra;
                    }
                }
                self.place_line(&line[start..])
            }
        }
    }

    fn place_line(&mut self, line: &[Child]) -> UiResult<()> {
        let spacing = self.scope.inner.style().spacing;
        let (margin, gap) = (spacing, spacing.x);
        let count = line.len();
        let sum: f32 = line.iter().map(|child| child.size.width).sum();
        #[allow(clippy::cast_precision_loss)]
        let gaps = (count - 1) as f32;
        let total = sum + gap * gaps;
        let height = line
            .iter()
            .map(|child| child.size.height)
            .fold(0.0_f32, f32::max);

        let justify_gap = if count > 1 {
            Some((self.available - margin.x * 2.0 - sum) / gaps).filter(|gap| *gap >= 0.0)
        } else {
            None
        };
        let (mut x, step) = match (self.align, justify_gap) {
            (Align::Left, _) => (margin.x, gap),
            (Align::Right, _) => (self.available - total - margin.x, gap),
            (Align::Justify, Some(justified)) => (margin.x, justified),
            (Align::Middle | Align::Justify, _) => ((self.available - total) * 0.5, gap),
        };

        let top = self.next_top;
        for child in line {
            let bounds = Bounds::from_pos_size(Point::new(x, top), child.size);
            self.scope.place(child, bounds)?;
            x += child.size.width + step;
        }

        tracing::trace!(line = self.lines, top, count, "row line placed");
        self.lines += 1;
        self.widest = self.widest.max(total);
        self.next_top = top + height + spacing.y;
        Ok(())
    }
}

impl Canvas for RowLayout<'_> {
    fn push_region(&mut self, uid: Uid, reserved: Option<Bounds>) -> RegionHandle {
        let (handle, child) = self.scope.push(uid, reserved);
        if let Some(child) = child {
            self.line.push(child);
        }
        handle
    }

    fn pop_region(&mut self, bounds: Option<Bounds>) -> UiResult<Bounds> {
        let (resolved, closed_child) = self.scope.pop(bounds)?;
        if closed_child {
            if let Some(child) = self.line.last_mut() {
                child.size = resolved.size();
            }
        }
        Ok(resolved)
    }

    /// Bare primitives on the row are wrapped in a region of their intrinsic
    /// size; the returned uid is that region's. A failure to close the wrapper
    /// is returned by the next `pop_region`, `newline` or `finish`.
    fn add_primitive(&mut self, uid: Uid, primitive: Primitive) -> Uid {
        if self.scope.depth() > 0 {
            return self.scope.inner.add_primitive(uid, primitive);
        }
        let size = calculate_bounds(&primitive, self.scope.inner.style(), self.scope.inner.fonts());
        let handle = self.push_region(uid, Some(Bounds::from_size(size)));
        self.scope.inner.add_primitive(uid, primitive);
        if let Err(err) = self.pop_region(None) {
            self.scope.defer(err);
        }
        handle.uid
    }

    fn region_bounds(&self) -> Bounds {
        self.scope.region_bounds(self.available)
    }

    forward_canvas!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RootCanvas;
    use crate::fonts::MonospaceFonts;
    use crate::input::InputState;
    use crate::primitive::Op;
    use crate::style::Style;
    use glint_core::{Color, StateManager};

    fn spacer(width: f32, height: f32) -> Primitive {
        Primitive::filled(Bounds::new(0.0, 0.0, width, height), Color::WHITE)
    }

    fn pushed_bounds(ops: &[Op]) -> Vec<Bounds> {
        ops.iter()
            .filter_map(|op| match op {
                Op::PushRegion { bounds, .. } => Some(*bounds),
                _ => None,
            })
            .collect()
    }

    fn run_row<F>(width: f32, align: Align, f: F) -> (Vec<Bounds>, Size)
    where
        F: FnOnce(&mut RowLayout<'_>) -> UiResult<()>,
    {
        let mut ops = Vec::new();
        let mut state = StateManager::new();
        let style = Style::default();
        let input = InputState::new();
        let fonts = MonospaceFonts::new();
        let mut canvas = RootCanvas::new(
            &mut ops,
            &mut state,
            &style,
            &input,
            &fonts,
            Size::new(width, 100.0),
            0.0,
        );
        let size = layout_row(&mut canvas, Uid::tag("row"), align, f).unwrap();
        canvas.finish().unwrap();
        (pushed_bounds(&ops)[1..].to_vec(), size)
    }

    #[test]
    fn test_left_alignment_uses_margin_and_gap() {
        let (children, size) = run_row(200.0, Align::Left, |row| {
            row.add_primitive(Uid::tag("a"), spacer(20.0, 10.0));
            row.add_primitive(Uid::tag("b"), spacer(30.0, 14.0));
            Ok(())
        });
        assert_eq!(children[0], Bounds::new(8.0, 8.0, 28.0, 18.0));
        assert_eq!(children[1], Bounds::new(36.0, 8.0, 66.0, 22.0));
        assert_eq!(size, Size::new(74.0, 30.0));
    }

    #[test]
    fn test_right_and_middle_alignment() {
        let (right, _) = run_row(200.0, Align::Right, |row| {
            row.add_primitive(Uid::tag("a"), spacer(40.0, 10.0));
            Ok(())
        });
        assert_eq!(right[0].left, 200.0 - 40.0 - 8.0);

        let (middle, size) = run_row(200.0, Align::Middle, |row| {
            row.add_primitive(Uid::tag("a"), spacer(40.0, 10.0));
            Ok(())
        });
        assert_eq!(middle[0].left, 80.0);
        assert_eq!(size.width, 200.0);
    }

    #[test]
    fn test_newline_starts_below_previous_line() {
        let (children, size) = run_row(200.0, Align::Left, |row| {
            row.add_primitive(Uid::tag("a"), spacer(20.0, 10.0));
            row.newline()?;
            row.newline()?;
            row.add_primitive(Uid::tag("b"), spacer(20.0, 12.0));
            Ok(())
        });
        assert_eq!(children[1].top, 8.0 + 10.0 + 8.0);
        assert_eq!(size.height, 8.0 + 10.0 + 8.0 + 12.0 + 8.0);
    }

    #[test]
    fn test_nested_regions_are_not_children() {
        let (pushes, _) = run_row(200.0, Align::Left, |row| {
            row.push_region(Uid::tag("panel"), None);
            row.push_region(Uid::tag("inner"), Some(Bounds::new(1.0, 1.0, 5.0, 5.0)));
            row.pop_region(None)?;
            row.pop_region(Some(Bounds::new(0.0, 0.0, 30.0, 20.0)))?;
            Ok(())
        });
        assert_eq!(pushes[0], Bounds::new(8.0, 8.0, 38.0, 28.0));
        assert_eq!(pushes[1], Bounds::new(1.0, 1.0, 5.0, 5.0));
    }

    #[test]
    fn test_local_index_space() {
        run_row(200.0, Align::Left, |row| {
            assert_eq!(row.op_count(), 0);
            let handle = row.push_region(Uid::tag("a"), None);
            assert_eq!(handle.index, 0);
            assert_eq!(row.depth(), 1);
            row.pop_region(Some(Bounds::new(0.0, 0.0, 4.0, 4.0)))?;
            row.set_region_bounds(handle.index, Bounds::new(0.0, 0.0, 6.0, 6.0))?;
            assert_eq!(row.op_count(), 2);
            Ok(())
        });
    }

    #[test]
    fn test_open_child_fails_the_row() {
        let mut ops = Vec::new();
        let mut state = StateManager::new();
        let style = Style::default();
        let input = InputState::new();
        let fonts = MonospaceFonts::new();
        let mut canvas = RootCanvas::new(
            &mut ops,
            &mut state,
            &style,
            &input,
            &fonts,
            Size::new(100.0, 100.0),
            0.0,
        );
        let result = layout_row(&mut canvas, Uid::tag("row"), Align::Left, |row| {
            row.push_region(Uid::tag("dangling"), None);
            Ok(())
        });
        assert!(matches!(result, Err(crate::UiError::UnbalancedRegions { open: 1 })));
    }

    #[test]
    fn test_wrap_splits_wide_lines() {
        let (children, size) = run_row(100.0, Align::Left, |row| {
            row.set_overflow(Overflow::Wrap);
            for i in 0..3 {
                row.add_primitive(Uid::indexed("item", i), spacer(30.0, 10.0));
            }
            Ok(())
        });
        // Two items and a gap fit between the margins; the third wraps.
        assert_eq!(children[0].top, 8.0);
        assert_eq!(children[1].top, 8.0);
        assert_eq!(children[2], Bounds::new(8.0, 26.0, 38.0, 36.0));
        assert_eq!(size.height, 8.0 + 10.0 + 8.0 + 10.0 + 8.0);
    }

    #[test]
    fn test_clip_keeps_wide_lines() {
        let (children, _) = run_row(60.0, Align::Left, |row| {
            row.add_primitive(Uid::tag("a"), spacer(40.0, 10.0));
            row.add_primitive(Uid::tag("b"), spacer(40.0, 10.0));
            Ok(())
        });
        assert_eq!(children[1].top, 8.0);
        assert_eq!(children[1].left, 56.0);
    }

    #[test]
    fn test_nested_row_spans_the_available_width() {
        let (pushes, size) = run_row(200.0, Align::Left, |row| {
            layout_row(row, Uid::tag("inner"), Align::Middle, |inner| {
                assert_eq!(inner.available_width(), 200.0);
                inner.add_primitive(Uid::tag("cell"), spacer(20.0, 10.0));
                Ok(())
            })?;
            Ok(())
        });
        assert_eq!(pushes[0], Bounds::new(8.0, 8.0, 208.0, 34.0));
        assert_eq!(pushes[1], Bounds::new(90.0, 8.0, 110.0, 18.0));
        assert_eq!(size.width, 216.0);
    }

    #[test]
    fn test_wrapper_close_failure_fails_the_row() {
        let mut ops = Vec::new();
        let mut state = StateManager::new();
        let wrapper = Uid::ROOT.mix(Uid::tag("row")).mix(Uid::tag("a"));
        *state
            .ensure::<u32>(wrapper.mix_tag(crate::canvas::LAST_BOUNDS))
            .unwrap() = 1;
        let style = Style::default();
        let input = InputState::new();
        let fonts = MonospaceFonts::new();
        let mut canvas = RootCanvas::new(
            &mut ops,
            &mut state,
            &style,
            &input,
            &fonts,
            Size::new(100.0, 100.0),
            0.0,
        );
        let result = layout_row(&mut canvas, Uid::tag("row"), Align::Left, |row| {
            let uid = row.add_primitive(Uid::tag("a"), spacer(10.0, 10.0));
            assert_eq!(uid, wrapper);
            assert_eq!(row.depth(), 0);
            Ok(())
        });
        assert!(matches!(
            result,
            Err(crate::UiError::State(glint_core::StateError::Collision { .. }))
        ));
    }
}
