//! Text drawing for axis labels, titles and tick labels.

use field_common::{FieldError, FieldResult};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

/// Horizontal anchor of a label relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical anchor of a label relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// Parse TrueType/OpenType font bytes.
pub fn load_font(bytes: Vec<u8>) -> FieldResult<Font<'static>> {
    Font::try_from_vec(bytes).ok_or_else(|| FieldError::Font("failed to parse font data".into()))
}

/// Pixel size of `text` at `font_size`.
pub fn measure(font: &Font<'_>, text: &str, font_size: f32) -> (i32, i32) {
    text_size(Scale::uniform(font_size), font, text)
}

/// Draw `text` anchored at `(x, y)`.
#[allow(clippy::too_many_arguments)]
pub fn draw_label(
    img: &mut RgbaImage,
    font: &Font<'_>,
    text: &str,
    x: i32,
    y: i32,
    font_size: f32,
    color: Rgba<u8>,
    align: (HAlign, VAlign),
) {
    if text.is_empty() {
        return;
    }

    let (w, h) = measure(font, text, font_size);
    let left = match align.0 {
        HAlign::Left => x,
        HAlign::Center => x - w / 2,
        HAlign::Right => x - w,
    };
    let top = match align.1 {
        VAlign::Top => y,
        VAlign::Middle => y - h / 2,
        VAlign::Bottom => y - h,
    };

    draw_text_mut(img, color, left, top, Scale::uniform(font_size), font, text);
}

/// Format a tick value with as many decimals as the tick step needs.
pub fn format_tick(value: f64, step: f64) -> String {
    // Snap values that are zero up to rounding error
    let value = if value.abs() < step.abs() * 1e-9 { 0.0 } else { value };

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-3..1e5).contains(&magnitude) {
        return format!("{:.1e}", value);
    }

    format!("{:.*}", tick_decimals(step), value)
}

/// Fewest decimals (up to 6) that represent `step` exactly.
fn tick_decimals(step: f64) -> usize {
    if !(step > 0.0) {
        return 2;
    }
    (0..=6)
        .find(|&d| {
            let scaled = step * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-6 * scaled.max(1.0)
        })
        .unwrap_or(6)
}
