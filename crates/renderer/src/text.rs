//! Text overlay using the embedded monospace font.

use image::Rgb;
use imageproc::drawing::draw_text_mut;
use once_cell::sync::Lazy;
use rusttype::{Font, Scale};

use crate::Raster;

/// Embedded font data - DejaVu Sans Mono
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Horizontal advance of one DejaVu Sans Mono glyph, in ems.
const MONO_ADVANCE_EM: f32 = 0.6;

static FONT: Lazy<Option<Font<'static>>> = Lazy::new(|| Font::try_from_bytes(FONT_DATA));

pub(crate) fn font() -> Option<&'static Font<'static>> {
    FONT.as_ref()
}

/// Approximate rendered size of `text` at `font_size` pixels.
pub fn text_extent(text: &str, font_size: f32) -> (u32, u32) {
    let width = (text.chars().count() as f32 * font_size * MONO_ADVANCE_EM).round();
    (width as u32, font_size.ceil() as u32)
}

/// Overlay style for a label.
#[derive(Debug, Clone, Copy)]
pub struct LabelStyle {
    pub font_size: f32,
    pub color: Rgb<u8>,
    pub shadow: Option<Rgb<u8>>,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            color: Rgb([255, 255, 255]),
            shadow: Some(Rgb([0, 0, 0])),
        }
    }
}

/// Draw `text` with its top-left corner at `(x, y)`.
///
/// Returns `false` if the font could not be loaded and nothing was drawn.
pub fn draw_label(img: &mut Raster, text: &str, x: i32, y: i32, style: &LabelStyle) -> bool {
    let Some(font) = font() else {
        tracing::warn!("Failed to load font for text overlay");
        return false;
    };

    let scale = Scale::uniform(style.font_size);
    let offset = (style.font_size / 16.0).ceil().max(1.0) as i32;

    if let Some(shadow) = style.shadow {
        draw_text_mut(img, shadow, x + offset, y + offset, scale, font, text);
    }
    draw_text_mut(img, style.color, x, y, scale, font, text);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_loads() {
        assert!(font().is_some());
    }

    #[test]
    fn test_text_extent_scales_with_length() {
        let (w1, h1) = text_extent("abc", 20.0);
        let (w2, h2) = text_extent("abcdef", 20.0);
        assert_eq!(w1, 36);
        assert_eq!(w2, 72);
        assert_eq!(h1, h2);
        assert_eq!(text_extent("", 20.0).0, 0);
    }

    #[test]
    fn test_draw_label_marks_pixels() {
        let mut img = Raster::new(120, 40);
        assert!(draw_label(&mut img, "GOES", 4, 4, &LabelStyle::default()));
        assert!(img.pixels().any(|p| p.0 != [0, 0, 0]));
    }
}
