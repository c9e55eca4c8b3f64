//! Tests for PNG encoding.

use field_renderer::png::{encode_indexed, encode_png, encode_rgba, extract_palette, PNG_SIGNATURE};

/// Offset of the color type byte: signature (8) + length (4) + "IHDR" (4) +
/// width (4) + height (4) + bit depth (1).
const COLOR_TYPE_OFFSET: usize = 25;

fn two_color_image(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .flat_map(|i| {
            if i % 2 == 0 {
                [255, 0, 0, 255]
            } else {
                [0, 0, 255, 128]
            }
        })
        .collect()
}

fn gradient_image(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .flat_map(|i| [(i % 256) as u8, (i / 256 % 256) as u8, 7, 255])
        .collect()
}

#[test]
fn test_signature_and_ihdr() {
    let png = encode_png(&two_color_image(4, 3), 4, 3).unwrap();
    assert_eq!(&png[..8], &PNG_SIGNATURE);
    assert_eq!(&png[12..16], b"IHDR");
    assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 4);
    assert_eq!(u32::from_be_bytes([png[20], png[21], png[22], png[23]]), 3);
    assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
}

#[test]
fn test_few_colors_encode_indexed() {
    let png = encode_png(&two_color_image(16, 16), 16, 16).unwrap();
    assert_eq!(png[COLOR_TYPE_OFFSET], 3);
}

#[test]
fn test_many_colors_encode_rgba() {
    let png = encode_png(&gradient_image(32, 32), 32, 32).unwrap();
    assert_eq!(png[COLOR_TYPE_OFFSET], 6);
}

#[test]
fn test_indexed_decodes_to_same_pixels() {
    let pixels = two_color_image(16, 8);
    let png = encode_png(&pixels, 16, 8).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (16, 8));
    assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn test_rgba_decodes_to_same_pixels() {
    let pixels = gradient_image(20, 20);
    let png = encode_rgba(&pixels, 20, 20).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn test_parallel_palette_matches_pixels() {
    // 128x128 crosses the parallel threshold
    let pixels = two_color_image(128, 128);
    let palette = extract_palette(&pixels).unwrap();

    assert_eq!(palette.colors.len(), 2);
    for (i, px) in pixels.chunks_exact(4).enumerate().step_by(61) {
        assert_eq!(&palette.colors[palette.indices[i] as usize], px);
    }

    let png = encode_indexed(&palette, 128, 128).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn test_too_many_colors_has_no_palette() {
    assert!(extract_palette(&gradient_image(32, 32)).is_none());
}

#[test]
fn test_dimension_mismatch_is_error() {
    assert!(encode_png(&[0u8; 12], 2, 2).is_err());
    assert!(encode_rgba(&[], 0, 0).is_err());
}
