//! Column layout: children stack top to bottom.

use super::{forward_canvas, Child, HAlign, Scope};
use crate::canvas::{Canvas, RegionHandle};
use crate::emitter::calculate_bounds;
use crate::error::UiResult;
use crate::primitive::Primitive;
use glint_core::{Bounds, Point, Size, Uid};

/// Opens a column region `uid` in `canvas`, runs `f` inside it and closes the
/// region sized to its content.
///
/// # Errors
///
/// Propagates errors from `f` and fails if `f` leaves a child region open.
pub fn layout_column<F>(canvas: &mut dyn Canvas, uid: Uid, align: HAlign, f: F) -> UiResult<Size>
where
    F: FnOnce(&mut ColumnLayout<'_>) -> UiResult<()>,
{
    let available = canvas.region_bounds().width().max(0.0);
    canvas.push_region(uid, None);
    let size = {
        let mut column = ColumnLayout::new(canvas, align, available);
        f(&mut column)?;
        column.finish()?
    };
    canvas.pop_region(Some(Bounds::from_size(size)))?;
    Ok(size)
}

/// Canvas decorator stacking its direct children vertically.
///
/// Children are placed as soon as their region closes, so a column never
/// defers more than one child.
pub struct ColumnLayout<'a> {
    scope: Scope<'a>,
    align: HAlign,
    available: f32,
    pending: Option<Child>,
    next_top: f32,
    count: usize,
    widest: f32,
}

impl<'a> ColumnLayout<'a> {
    /// Wraps `inner`, whose innermost open region becomes the column region.
    pub fn new(inner: &'a mut dyn Canvas, align: HAlign, available: f32) -> Self {
        let spacing = inner.style().spacing;
        Self {
            scope: Scope::new(inner),
            align,
            available,
            pending: None,
            next_top: spacing.y,
            count: 0,
            widest: 0.0,
        }
    }

    /// Returns the column's intrinsic size.
    ///
    /// # Errors
    ///
    /// Fails if a child region is still open or a wrapped primitive could
    /// not be closed.
    pub fn finish(mut self) -> UiResult<Size> {
        self.scope.ensure_closed()?;
        if self.count == 0 {
            return Ok(Size::ZERO);
        }
        let margin = self.scope.inner.style().spacing;
        let width = match self.align {
            HAlign::Left => self.widest + margin.x * 2.0,
            _ => self.available,
        };
        Ok(Size::new(width, self.next_top))
    }

    fn place(&mut self, child: &Child) -> UiResult<()> {
        let margin = self.scope.inner.style().spacing;
        let size = child.size;
        let (x, width) = match self.align {
            HAlign::Left => (margin.x, size.width),
            HAlign::Right => (self.available - size.width - margin.x, size.width),
            HAlign::Middle => ((self.available - size.width) * 0.5, size.width),
            HAlign::Stretch => (margin.x, (self.available - margin.x * 2.0).max(0.0)),
        };
        let bounds = Bounds::from_pos_size(Point::new(x, self.next_top), Size::new(width, size.height));
        self.scope.place(child, bounds)?;
        self.count += 1;
        self.widest = self.widest.max(width);
        self.next_top += size.height + margin.y;
        Ok(())
    }
}

impl Canvas for ColumnLayout<'_> {
    fn push_region(&mut self, uid: Uid, reserved: Option<Bounds>) -> RegionHandle {
        let (handle, child) = self.scope.push(uid, reserved);
        if child.is_some() {
            self.pending = child;
        }
        handle
    }

    fn pop_region(&mut self, bounds: Option<Bounds>) -> UiResult<Bounds> {
        let (resolved, closed_child) = self.scope.pop(bounds)?;
        if closed_child {
            if let Some(mut child) = self.pending.take() {
                child.size = resolved.size();
                self.place(&child)?;
            }
        }
        Ok(resolved)
    }

    /// Bare primitives are wrapped like in a row; the returned uid is the
    /// wrapper region's. A failure to close the wrapper is returned by the next
    /// `pop_region` or `finish`.
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

    fn run_column(align: HAlign) -> (Vec<Bounds>, Size) {
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
        let size = layout_column(&mut canvas, Uid::tag("column"), align, |column| {
            column.add_primitive(
                Uid::tag("a"),
                Primitive::filled(Bounds::new(0.0, 0.0, 20.0, 10.0), Color::WHITE),
            );
            column.push_region(Uid::tag("b"), None);
            column.pop_region(Some(Bounds::new(0.0, 0.0, 40.0, 12.0)))?;
            Ok(())
        })
        .unwrap();
        canvas.finish().unwrap();
        let bounds = ops
            .iter()
            .filter_map(|op| match op {
                Op::PushRegion { bounds, .. } => Some(*bounds),
                _ => None,
            })
            .skip(1)
            .collect();
        (bounds, size)
    }

    #[test]
    fn test_left_column_stacks_with_spacing() {
        let (children, size) = run_column(HAlign::Left);
        assert_eq!(children[0], Bounds::new(8.0, 8.0, 28.0, 18.0));
        assert_eq!(children[1], Bounds::new(8.0, 26.0, 48.0, 38.0));
        assert_eq!(size, Size::new(56.0, 46.0));
    }

    #[test]
    fn test_stretch_spans_margins() {
        let (children, size) = run_column(HAlign::Stretch);
        assert_eq!(children[0].left, 8.0);
        assert_eq!(children[0].right, 92.0);
        assert_eq!(children[1].width(), 84.0);
        assert_eq!(size.width, 100.0);
    }

    #[test]
    fn test_right_and_middle() {
        let (right, _) = run_column(HAlign::Right);
        assert_eq!(right[1].right, 92.0);
        let (middle, _) = run_column(HAlign::Middle);
        assert_eq!(middle[0].left, 40.0);
    }

    #[test]
    fn test_nested_row_uses_column_width() {
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
        layout_column(&mut canvas, Uid::tag("column"), HAlign::Left, |column| {
            let size = crate::layout::layout_row(column, Uid::tag("row"), crate::layout::Align::Right, |row| {
                assert_eq!(row.available_width(), 100.0);
                Ok(())
            })?;
            assert_eq!(size, Size::new(100.0, 0.0));
            Ok(())
        })
        .unwrap();
        canvas.finish().unwrap();
    }
}
