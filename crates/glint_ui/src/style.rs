//! Styling shared by layout and emission.
//!
//! The style is owned by the [`Context`](crate::Context). It is borrowed
//! immutably for the whole frame, so it can only change between frames.

use crate::fonts::FontId;
use glint_core::{Color, Point};
use serde::{Deserialize, Serialize};

/// Visual configuration read by layouts, widgets and the emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Gap between siblings (x) and between lines (y). Also used as the
    /// layout margin.
    pub spacing: Point,
    /// Inner padding of framed widgets such as buttons.
    pub padding: Point,
    /// Corner radius of framed widgets.
    pub rounding: f32,
    /// Width of widget outlines.
    pub bounds_edge_width: f32,
    /// Text color.
    pub font_color: Color,
    /// Window/background color.
    pub background_color: Color,
    /// Idle widget color.
    pub normal_color: Color,
    /// Hovered widget color.
    pub highlight_color: Color,
    /// Pressed widget color.
    pub pressed_color: Color,
    /// Disabled widget color.
    pub disabled_color: Color,
    /// Selected/checked widget color.
    pub selected_color: Color,
    /// Outline color of framed widgets.
    pub edge_color: Color,
    /// Font used when a primitive does not name one.
    pub default_font: FontId,
    /// Font consulted when the primary font lacks a glyph.
    pub fallback_font: FontId,
    /// Code point drawn when no font has the requested glyph.
    pub fallback_code_point: char,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            spacing: Point::new(8.0, 8.0),
            padding: Point::new(5.0, 5.0),
            rounding: 3.0,
            bounds_edge_width: 1.0,
            font_color: Color::rgba(0.9, 0.9, 0.9, 1.0),
            background_color: Color::rgba(0.05, 0.05, 0.08, 0.95),
            normal_color: Color::rgba(0.16, 0.18, 0.22, 1.0),
            highlight_color: Color::rgba(0.24, 0.28, 0.36, 1.0),
            pressed_color: Color::rgba(0.10, 0.12, 0.16, 1.0),
            disabled_color: Color::rgba(0.12, 0.12, 0.12, 0.6),
            selected_color: Color::rgba(0.2, 0.45, 0.9, 1.0),
            edge_color: Color::rgba(0.3, 0.34, 0.4, 1.0),
            default_font: FontId::DEFAULT,
            fallback_font: FontId::FALLBACK,
            fallback_code_point: '?',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metrics() {
        let style = Style::default();
        assert_eq!(style.spacing, Point::new(8.0, 8.0));
        assert_eq!(style.padding, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let style: Style = toml::from_str(
            r##"
            rounding = 0.0
            fallback_code_point = "#"
            font_color = 0xFF0000FF
            spacing = { x = 4.0, y = 2.0 }
            "##,
        )
        .unwrap();

        assert_eq!(style.rounding, 0.0);
        assert_eq!(style.fallback_code_point, '#');
        assert_eq!(style.font_color, Color::hex(0xFF00_00FF));
        assert_eq!(style.spacing, Point::new(4.0, 2.0));
        assert_eq!(style.padding, Style::default().padding);
    }
}
