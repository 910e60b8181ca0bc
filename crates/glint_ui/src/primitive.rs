//! Drawable primitives and the per-frame operation log.
//!
//! Primitive coordinates are relative to the origin of the region they are
//! declared in.

use crate::command::{CommandList, TextureId};
use crate::fonts::{FontBackend, FontId};
use crate::style::Style;
use glint_core::{Bounds, Color, Point, Size, Uid};
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// How a rectangle is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    /// Filled interior.
    Solid,
    /// Outline of the given width, drawn inside the bounds.
    Stroke(f32),
}

/// Visual state of a button frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Idle.
    #[default]
    Normal,
    /// Cursor over the button.
    Hovered,
    /// Held down.
    Pressed,
    /// Not interactive.
    Disabled,
    /// Toggled on.
    Selected,
}

/// User-defined primitive with its own sizing and emission.
pub trait CustomPrimitive: fmt::Debug {
    /// Intrinsic size used by layouts.
    fn size(&self, style: &Style, fonts: &dyn FontBackend) -> Size;

    /// Appends commands for this primitive. `origin` is the absolute origin of
    /// the enclosing region and `clip` the active clip rectangle; every command
    /// pushed must be clipped to it.
    fn emit(&self, origin: Point, clip: Bounds, style: &Style, out: &mut CommandList);
}

/// An abstract drawable.
#[derive(Debug, Clone)]
pub enum Primitive {
    /// Axis-aligned rectangle, optionally rounded.
    Rect {
        /// Region-relative bounds.
        bounds: Bounds,
        /// Paint color.
        color: Color,
        /// Fill mode.
        fill: Fill,
        /// Corner radius.
        rounding: f32,
    },
    /// Straight segment.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke color.
        color: Color,
        /// Stroke width.
        width: f32,
    },
    /// Square dot centered on `at`.
    Point {
        /// Center.
        at: Point,
        /// Color.
        color: Color,
        /// Edge length.
        size: f32,
    },
    /// Textured rectangle.
    Image {
        /// Region-relative bounds.
        bounds: Bounds,
        /// Texture to sample.
        texture: TextureId,
        /// Normalized texture coordinates.
        uv: Bounds,
        /// Color multiplied with the texture.
        tint: Color,
    },
    /// Single line of text drawn at the region origin.
    Text {
        /// Content.
        text: Cow<'static, str>,
        /// Font, or the style's default font.
        font: Option<FontId>,
        /// Color, or the style's font color.
        color: Option<Color>,
    },
    /// Button frame around content of the given size.
    Button {
        /// Size of the content the frame surrounds.
        content: Size,
        /// Visual state.
        state: ButtonState,
        /// Hover highlight factor in `0..=1`.
        highlight: f32,
    },
    /// User-defined primitive.
    Custom(Rc<dyn CustomPrimitive>),
}

impl Primitive {
    /// Filled rectangle.
    #[must_use]
    pub fn filled(bounds: Bounds, color: Color) -> Self {
        Self::Rect {
            bounds,
            color,
            fill: Fill::Solid,
            rounding: 0.0,
        }
    }

    /// Rectangle outline.
    #[must_use]
    pub fn stroked(bounds: Bounds, color: Color, width: f32) -> Self {
        Self::Rect {
            bounds,
            color,
            fill: Fill::Stroke(width),
            rounding: 0.0,
        }
    }

    /// Text in the default font and color.
    #[must_use]
    pub fn text(text: impl Into<Cow<'static, str>>) -> Self {
        Self::Text {
            text: text.into(),
            font: None,
            color: None,
        }
    }

    /// Untinted image covering the whole texture.
    #[must_use]
    pub fn image(bounds: Bounds, texture: TextureId) -> Self {
        Self::Image {
            bounds,
            texture,
            uv: Bounds::new(0.0, 0.0, 1.0, 1.0),
            tint: Color::WHITE,
        }
    }
}

/// One entry of the operation log.
#[derive(Debug, Clone)]
pub enum Op {
    /// Opens a region with parent-relative bounds.
    PushRegion {
        /// Mixed uid of the region.
        uid: Uid,
        /// Parent-relative bounds, possibly a placeholder until patched.
        bounds: Bounds,
    },
    /// Closes the innermost open region.
    PopRegion,
    /// Draws a primitive in the innermost open region.
    Primitive(Primitive),
}
