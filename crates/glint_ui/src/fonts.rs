//! Font backend interface.
//!
//! The core never rasterizes. It asks the backend for glyph metrics and for
//! the atlas location of each glyph bitmap.

use crate::command::TextureId;
use crate::style::Style;
use glint_core::{Bounds, Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Handle of a loaded font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FontId(pub u32);

impl FontId {
    /// Conventional id of the default font.
    pub const DEFAULT: Self = Self(0);
    /// Conventional id of the fallback font.
    pub const FALLBACK: Self = Self(1);
}

/// Metrics and atlas location of one glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Horizontal advance to the next glyph.
    pub advance: f32,
    /// Bitmap size. Zero for whitespace.
    pub size: Size,
    /// Offset from the glyph cell's top-left corner to the bitmap.
    pub bearing: Point,
    /// Atlas texture holding the bitmap.
    pub texture: TextureId,
    /// Normalized atlas coordinates of the bitmap.
    pub uv: Bounds,
}

/// Source of glyph metrics and atlas coordinates.
pub trait FontBackend {
    /// Line height of `font` in pixels.
    fn line_height(&self, font: FontId) -> f32;

    /// Looks up `ch` in `font`. `None` if the font lacks the glyph.
    fn glyph(&self, font: FontId, ch: char) -> Option<Glyph>;
}

/// Resolves a glyph with the style's fallbacks.
///
/// Order: `(font, ch)`, `(fallback_font, ch)`, `(font, fallback_code_point)`,
/// `(fallback_font, fallback_code_point)`.
pub fn resolve_glyph(
    fonts: &dyn FontBackend,
    style: &Style,
    font: FontId,
    ch: char,
) -> Option<Glyph> {
    fonts
        .glyph(font, ch)
        .or_else(|| fonts.glyph(style.fallback_font, ch))
        .or_else(|| fonts.glyph(font, style.fallback_code_point))
        .or_else(|| fonts.glyph(style.fallback_font, style.fallback_code_point))
}

/// Measures a single line of text: sum of advances by line height.
pub fn measure_text(fonts: &dyn FontBackend, style: &Style, font: FontId, text: &str) -> Size {
    let width = text
        .chars()
        .filter_map(|ch| resolve_glyph(fonts, style, font, ch))
        .map(|glyph| glyph.advance)
        .sum();
    Size::new(width, fonts.line_height(font))
}

/// One face of [`MonospaceFonts`].
#[derive(Debug, Clone)]
pub struct MonoFace {
    /// Advance of every glyph.
    pub advance: f32,
    /// Line height.
    pub line_height: f32,
    /// Code points the face has glyphs for.
    pub coverage: RangeInclusive<char>,
}

/// Fixed-advance font backend for headless rendering and tests.
///
/// Glyph bitmaps are assumed to live in a 16x16 cell atlas indexed by the low
/// byte of the code point.
#[derive(Debug, Clone)]
pub struct MonospaceFonts {
    faces: HashMap<FontId, MonoFace>,
    texture: TextureId,
}

impl MonospaceFonts {
    /// Creates the default pair of faces: printable ASCII as
    /// [`FontId::DEFAULT`], Latin-1 supplement as [`FontId::FALLBACK`], both
    /// 8x16 pixels.
    #[must_use]
    pub fn new() -> Self {
        Self::empty(TextureId(0))
            .with_face(
                FontId::DEFAULT,
                MonoFace {
                    advance: 8.0,
                    line_height: 16.0,
                    coverage: ' '..='~',
                },
            )
            .with_face(
                FontId::FALLBACK,
                MonoFace {
                    advance: 8.0,
                    line_height: 16.0,
                    coverage: '\u{a0}'..='\u{ff}',
                },
            )
    }

    /// Creates a backend without faces whose atlas is `texture`.
    #[must_use]
    pub fn empty(texture: TextureId) -> Self {
        Self {
            faces: HashMap::new(),
            texture,
        }
    }

    /// Adds or replaces a face.
    #[must_use]
    pub fn with_face(mut self, id: FontId, face: MonoFace) -> Self {
        self.faces.insert(id, face);
        self
    }

    fn cell_uv(ch: char) -> Bounds {
        let cell = u32::from(ch) & 0xFF;
        #[allow(clippy::cast_precision_loss)]
        let (col, row) = ((cell % 16) as f32, (cell / 16) as f32);
        let step = 1.0 / 16.0;
        Bounds::new(col * step, row * step, (col + 1.0) * step, (row + 1.0) * step)
    }
}

impl Default for MonospaceFonts {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBackend for MonospaceFonts {
    fn line_height(&self, font: FontId) -> f32 {
        self.faces.get(&font).map_or(0.0, |face| face.line_height)
    }

    fn glyph(&self, font: FontId, ch: char) -> Option<Glyph> {
        let face = self.faces.get(&font)?;
        if !face.coverage.contains(&ch) {
            return None;
        }
        let size = if ch.is_whitespace() {
            Size::ZERO
        } else {
            Size::new(face.advance, face.line_height)
        };
        Some(Glyph {
            advance: face.advance,
            size,
            bearing: Point::ZERO,
            texture: self.texture,
            uv: Self::cell_uv(ch),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_ascii() {
        let fonts = MonospaceFonts::new();
        let size = measure_text(&fonts, &Style::default(), FontId::DEFAULT, "Hello");
        assert_eq!(size, Size::new(40.0, 16.0));
    }

    #[test]
    fn test_fallback_font_used_for_latin1() {
        let fonts = MonospaceFonts::new();
        let style = Style::default();
        assert!(fonts.glyph(FontId::DEFAULT, 'é').is_none());
        let glyph = resolve_glyph(&fonts, &style, FontId::DEFAULT, 'é').unwrap();
        assert_eq!(glyph.advance, 8.0);
    }

    #[test]
    fn test_fallback_code_point_for_unknown_glyph() {
        let fonts = MonospaceFonts::new();
        let style = Style::default();
        let glyph = resolve_glyph(&fonts, &style, FontId::DEFAULT, '漢').unwrap();
        assert_eq!(glyph.uv, MonospaceFonts::cell_uv('?'));
    }

    #[test]
    fn test_missing_everything_measures_zero() {
        let fonts = MonospaceFonts::empty(TextureId(3));
        let size = measure_text(&fonts, &Style::default(), FontId::DEFAULT, "abc");
        assert_eq!(size, Size::ZERO);
    }
}
