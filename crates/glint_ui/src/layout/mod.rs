//! Layout system for UI.
//!
//! Layouts are canvas decorators. Children are recorded with placeholder
//! bounds while the layout callback runs; once a line (or column) is complete
//! the layout places them and patches the recorded `PushRegion` ops in place.
//!
//! A layout sees the ops it appended as its own index space: index `0` is the
//! first op appended through the layout, whatever the parent's log length.

mod column;
mod row;

pub use column::{layout_column, ColumnLayout};
pub use row::{layout_row, RowLayout};

use crate::canvas::{store_last_bounds, Canvas, RegionHandle};
use crate::error::{UiError, UiResult};
use glint_core::{Bounds, Size, Uid};

/// Horizontal alignment of a row's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Packed against the left margin.
    #[default]
    Left,
    /// Packed against the right margin.
    Right,
    /// Centered.
    Middle,
    /// First child on the left margin, last on the right margin, equal gaps.
    Justify,
}

/// Horizontal alignment of a column's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    /// Against the left margin.
    #[default]
    Left,
    /// Against the right margin.
    Right,
    /// Centered.
    Middle,
    /// Widened to span both margins.
    Stretch,
}

/// What a row does with a line wider than the available width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Keep the line and let the region clip hide the excess.
    #[default]
    Clip,
    /// Split the line greedily into as many lines as needed.
    Wrap,
}

/// A direct child of a layout.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Child {
    /// Mixed uid of the child region.
    pub uid: Uid,
    /// Index of the child's push op in the wrapped canvas's index space.
    pub index: usize,
    /// Resolved size, known once the child's region is closed.
    pub size: Size,
}

/// Depth and index bookkeeping shared by every layout.
pub(crate) struct Scope<'a> {
    pub inner: &'a mut dyn Canvas,
    base: usize,
    depth: usize,
    /// First failure from a call that could not return it.
    deferred: Option<UiError>,
}

impl<'a> Scope<'a> {
    pub fn new(inner: &'a mut dyn Canvas) -> Self {
        let base = inner.op_count();
        Self {
            inner,
            base,
            depth: 0,
            deferred: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Forwards a push. Returns the handle in local index space and the child
    /// record if the region is a direct child.
    pub fn push(&mut self, uid: Uid, reserved: Option<Bounds>) -> (RegionHandle, Option<Child>) {
        let handle = self.inner.push_region(uid, reserved);
        let child = (self.depth == 0).then(|| Child {
            uid: handle.uid,
            index: handle.index,
            size: reserved.map_or(Size::ZERO, |bounds| bounds.size()),
        });
        self.depth += 1;
        let local = RegionHandle {
            index: handle.index - self.base,
            uid: handle.uid,
        };
        (local, child)
    }

    /// Forwards a pop. Returns the resolved bounds and whether a direct child
    /// was closed.
    ///
    /// The region is closed on the inner canvas even when this fails.
    pub fn pop(&mut self, bounds: Option<Bounds>) -> UiResult<(Bounds, bool)> {
        if self.depth == 0 {
            return Err(UiError::PopWithoutPush);
        }
        let resolved = self.inner.pop_region(bounds);
        self.depth -= 1;
        self.take_deferred()?;
        Ok((resolved?, self.depth == 0))
    }

    /// Keeps `err` until the next fallible call on the layout returns it.
    pub fn defer(&mut self, err: UiError) {
        if self.deferred.is_none() {
            self.deferred = Some(err);
        }
    }

    fn take_deferred(&mut self) -> UiResult<()> {
        self.deferred.take().map_or(Ok(()), Err)
    }

    pub fn set_local_bounds(&mut self, index: usize, bounds: Bounds) -> UiResult<()> {
        self.inner.set_region_bounds(index + self.base, bounds)
    }

    /// Bounds a layout reports while no child is open: the available width
    /// and the last resolved height of the layout region.
    pub fn region_bounds(&self, available: f32) -> Bounds {
        if self.depth > 0 {
            return self.inner.region_bounds();
        }
        let height = self.inner.region_bounds().height();
        Bounds::from_size(Size::new(available, height))
    }

    pub fn op_count(&self) -> usize {
        self.inner.op_count() - self.base
    }

    /// Moves a direct child to its final bounds.
    pub fn place(&mut self, child: &Child, bounds: Bounds) -> UiResult<()> {
        self.inner.set_region_bounds(child.index, bounds)?;
        store_last_bounds(self.inner.state_mut(), child.uid, bounds)
    }

    /// Fails with a deferred error, or if a child region is still open.
    pub fn ensure_closed(&mut self) -> UiResult<()> {
        self.take_deferred()?;
        if self.depth == 0 {
            Ok(())
        } else {
            Err(UiError::UnbalancedRegions { open: self.depth })
        }
    }
}

/// Implements the pass-through part of [`Canvas`] for a layout holding a
/// `scope: Scope` field.
macro_rules! forward_canvas {
    () => {
        fn set_region_bounds(
            &mut self,
            index: usize,
            bounds: glint_core::Bounds,
        ) -> $crate::error::UiResult<()> {
            self.scope.set_local_bounds(index, bounds)
        }

        fn current_uid(&self) -> glint_core::Uid {
            self.scope.inner.current_uid()
        }

        fn depth(&self) -> usize {
            self.scope.depth()
        }

        fn op_count(&self) -> usize {
            self.scope.op_count()
        }

        fn state(&self) -> &glint_core::StateManager {
            self.scope.inner.state()
        }

        fn state_mut(&mut self) -> &mut glint_core::StateManager {
            self.scope.inner.state_mut()
        }

        fn style(&self) -> &$crate::style::Style {
            self.scope.inner.style()
        }

        fn input(&self) -> &dyn $crate::input::InputBackend {
            self.scope.inner.input()
        }

        fn fonts(&self) -> &dyn $crate::fonts::FontBackend {
            self.scope.inner.fonts()
        }

        fn canvas_size(&self) -> glint_core::Size {
            self.scope.inner.canvas_size()
        }

        fn delta_time(&self) -> f32 {
            self.scope.inner.delta_time()
        }
    };
}

pub(crate) use forward_canvas;
