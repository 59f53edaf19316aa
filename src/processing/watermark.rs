//! Watermark overlay rendering
//!
//! The watermark is rendered onto a transparent RGBA layer the same size as
//! the image, anchored so the text bounding box sits `margin` pixels in from
//! the bottom-right corner, then alpha-composited over the base image by the
//! transform pipeline.

use std::path::Path;

use font8x8::legacy::BASIC_LEGACY;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use once_cell::sync::Lazy;
use rusttype::{Font, Scale};
use tracing::warn;

use crate::config::WatermarkConfig;

/// Point size used for TrueType rendering
const TRUETYPE_SIZE: f32 = 14.0;

/// Integer upscale applied to the 8x8 fallback glyphs
const BUILTIN_GLYPH_SCALE: u32 = 2;

/// Well-known font locations tried when no font path is configured
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

// Loaded once per process; every pipeline clones the handle (rusttype fonts
// are reference-counted internally).
static SYSTEM_FONT: Lazy<Option<Font<'static>>> = Lazy::new(|| {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .find_map(|candidate| font_from_file(Path::new(candidate)))
});

fn font_from_file(path: &Path) -> Option<Font<'static>> {
    let data = std::fs::read(path).ok()?;
    Font::try_from_vec(data)
}

/// Glyph renderer backing the watermark.
///
/// TrueType is preferred; the built-in 8x8 bitmap set guarantees the
/// watermark still renders when no font can be found, with degraded styling.
#[derive(Clone)]
pub enum FontRenderer {
    Truetype { font: Font<'static>, scale: Scale },
    Builtin { scale: u32 },
}

impl FontRenderer {
    /// Resolve a renderer: explicit font path, then system fonts, then the
    /// built-in glyph set. Never fails.
    pub fn load(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            match font_from_file(path) {
                Some(font) => return Self::truetype(font),
                None => warn!("Could not load font {:?}, trying system fonts", path),
            }
        }

        if let Some(font) = SYSTEM_FONT.as_ref() {
            return Self::truetype(font.clone());
        }

        warn!("No TrueType font available, watermark falls back to built-in glyphs");
        Self::Builtin {
            scale: BUILTIN_GLYPH_SCALE,
        }
    }

    fn truetype(font: Font<'static>) -> Self {
        Self::Truetype {
            font,
            scale: Scale::uniform(TRUETYPE_SIZE),
        }
    }

    /// Bounding box of the rendered text in pixels
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            Self::Truetype { font, scale } => {
                let (w, h) = text_size(*scale, font, text);
                (w.max(0) as u32, h.max(0) as u32)
            }
            Self::Builtin { scale } => {
                let glyphs = text.chars().filter(char::is_ascii).count() as u32;
                (glyphs * 8 * scale, 8 * scale)
            }
        }
    }

    fn draw(&self, canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>, text: &str) {
        match self {
            Self::Truetype { font, scale } => {
                draw_text_mut(canvas, color, x as i32, y as i32, *scale, font, text);
            }
            Self::Builtin { scale } => {
                draw_bitmap_text(canvas, x, y, *scale, color, text);
            }
        }
    }
}

/// Render `text` with the 8x8 fallback glyphs, upscaled by `scale`.
/// Non-ASCII characters have no glyph in the table and are skipped.
fn draw_bitmap_text(canvas: &mut RgbaImage, x: u32, y: u32, scale: u32, color: Rgba<u8>, text: &str) {
    let (width, height) = canvas.dimensions();

    for (index, ch) in text.chars().filter(char::is_ascii).enumerate() {
        let glyph = BASIC_LEGACY[ch as usize];
        let glyph_x = x + index as u32 * 8 * scale;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8u32 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = glyph_x + col * scale + dx;
                        let py = y + row as u32 * scale + dy;
                        if px < width && py < height {
                            canvas.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
    }
}

/// Render the transparent overlay layer for an image of the given size.
///
/// The text's bottom-right corner sits `margin` pixels from the image's
/// bottom-right corner; the anchor clamps to the origin when the text is
/// larger than the image.
pub fn render_overlay(
    width: u32,
    height: u32,
    mark: &WatermarkConfig,
    renderer: &FontRenderer,
) -> RgbaImage {
    // zero-initialized buffer is fully transparent
    let mut overlay = RgbaImage::new(width, height);

    if mark.text.is_empty() || mark.opacity == 0 {
        return overlay;
    }

    let (text_width, text_height) = renderer.measure(&mark.text);
    let x = width.saturating_sub(text_width + mark.margin);
    let y = height.saturating_sub(text_height + mark.margin);

    let color = Rgba([255, 255, 255, mark.opacity]);
    renderer.draw(&mut overlay, x, y, color, &mark.text);

    overlay
}
