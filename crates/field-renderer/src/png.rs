//! PNG encoding for rendered figures.
//!
//! Two encodings are produced:
//! - **Indexed PNG (color type 3)** when the image has at most 256 distinct
//!   colors. Heatmaps drawn from a 256-entry colormap lookup table usually
//!   qualify unless anti-aliased strokes add intermediate shades.
//! - **RGBA PNG (color type 6)** otherwise.
//!
//! [`encode_png`] picks the encoding automatically.

use std::collections::HashMap;
use std::io::Write;

use field_common::{FieldError, FieldResult};
use rayon::prelude::*;

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096;

/// PNG color type written to the IHDR chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    Indexed,
    Rgba,
}

impl ColorType {
    fn code(self) -> u8 {
        match self {
            ColorType::Indexed => 3,
            ColorType::Rgba => 6,
        }
    }

    fn bytes_per_pixel(self) -> usize {
        match self {
            ColorType::Indexed => 1,
            ColorType::Rgba => 4,
        }
    }
}

/// Palette and per-pixel indices for an indexed image.
#[derive(Debug, Clone)]
pub struct Palette {
    pub colors: Vec<[u8; 4]>,
    pub indices: Vec<u8>,
}

/// Encode RGBA pixels, choosing indexed output when the palette fits.
pub fn encode_png(pixels: &[u8], width: usize, height: usize) -> FieldResult<Vec<u8>> {
    check_dimensions(pixels.len(), width, height, 4)?;

    match extract_palette(pixels) {
        Some(palette) => {
            tracing::debug!(
                width,
                height,
                palette_size = palette.colors.len(),
                "Encoding indexed PNG"
            );
            encode_indexed(&palette, width, height)
        }
        None => {
            tracing::debug!(width, height, "Encoding RGBA PNG");
            encode_rgba(pixels, width, height)
        }
    }
}

/// Encode RGBA pixels as color type 6.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> FieldResult<Vec<u8>> {
    check_dimensions(pixels.len(), width, height, 4)?;

    let mut png = start_png(width, height, ColorType::Rgba);
    let idat = deflate_scanlines(pixels, width, height, ColorType::Rgba)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode an indexed image as color type 3.
pub fn encode_indexed(palette: &Palette, width: usize, height: usize) -> FieldResult<Vec<u8>> {
    check_dimensions(palette.indices.len(), width, height, 1)?;
    if palette.colors.is_empty() || palette.colors.len() > MAX_PALETTE_SIZE {
        return Err(FieldError::Encode(format!(
            "palette must hold 1..={} colors, got {}",
            MAX_PALETTE_SIZE,
            palette.colors.len()
        )));
    }

    let mut png = start_png(width, height, ColorType::Indexed);

    let plte: Vec<u8> = palette.colors.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only when some entry is not fully opaque
    if palette.colors.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.colors.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(&palette.indices, width, height, ColorType::Indexed)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Build a palette when the image has at most 256 distinct colors.
pub fn extract_palette(pixels: &[u8]) -> Option<Palette> {
    if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    }
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

fn extract_palette_sequential(pixels: &[u8]) -> Option<Palette> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut colors = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack(px);
        let index = match lookup.get(&key) {
            Some(&index) => index,
            None => {
                if colors.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let index = colors.len() as u8;
                colors.push(key.to_le_bytes());
                lookup.insert(key, index);
                index
            }
        };
        indices.push(index);
    }

    Some(Palette { colors, indices })
}

/// Two parallel passes: collect distinct colors per chunk, then map every
/// pixel to its palette index.
fn extract_palette_parallel(pixels: &[u8]) -> Option<Palette> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let per_chunk: Vec<Option<Vec<u32>>> = pixels
        .par_chunks(chunk_pixels * 4)
        .map(|chunk| {
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack(px), ());
                if seen.len() > MAX_PALETTE_SIZE {
                    return None;
                }
            }
            Some(seen.into_keys().collect())
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut colors = Vec::with_capacity(MAX_PALETTE_SIZE);
    for key in per_chunk.into_iter().collect::<Option<Vec<_>>>()?.into_iter().flatten() {
        if lookup.contains_key(&key) {
            continue;
        }
        if colors.len() >= MAX_PALETTE_SIZE {
            return None;
        }
        lookup.insert(key, colors.len() as u8);
        colors.push(key.to_le_bytes());
    }

    let indices: Vec<u8> = pixels
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack(px)).copied().unwrap_or(0))
        .collect();

    Some(Palette { colors, indices })
}

fn check_dimensions(len: usize, width: usize, height: usize, bpp: usize) -> FieldResult<()> {
    if width == 0 || height == 0 {
        return Err(FieldError::Encode(format!(
            "cannot encode a {}x{} image",
            width, height
        )));
    }
    if len != width * height * bpp {
        return Err(FieldError::Encode(format!(
            "expected {} bytes for {}x{} image, got {}",
            width * height * bpp,
            width,
            height,
            len
        )));
    }
    Ok(())
}

/// Signature plus IHDR chunk.
fn start_png(width: usize, height: usize, color_type: ColorType) -> Vec<u8> {
    let mut png = Vec::with_capacity(64);
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(color_type.code());
    ihdr.push(0); // compression method
    ihdr.push(0); // filter method
    ihdr.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr);

    png
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(
    data: &[u8],
    width: usize,
    height: usize,
    color_type: ColorType,
) -> FieldResult<Vec<u8>> {
    let stride = width * color_type.bytes_per_pixel();
    let mut raw = Vec::with_capacity(height * (stride + 1));
    for row in data.chunks_exact(stride).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| FieldError::Encode(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| FieldError::Encode(format!("IDAT compression failed: {}", e)))
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_palette_reuses_indices() {
        let pixels = [
            255, 0, 0, 255, //
            0, 255, 0, 255, //
            255, 0, 0, 255,
        ];
        let palette = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(palette.colors.len(), 2);
        assert_eq!(palette.indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_parallel_matches_sequential_color_count() {
        let mut pixels = Vec::with_capacity(128 * 128 * 4);
        for i in 0..128 * 128 {
            let shade = (i % 40) as u8;
            pixels.extend_from_slice(&[shade, 255 - shade, 0, 255]);
        }
        let par = extract_palette_parallel(&pixels).unwrap();
        let seq = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(par.colors.len(), seq.colors.len());
        for (px, &idx) in pixels.chunks_exact(4).zip(&par.indices) {
            assert_eq!(&par.colors[idx as usize][..], px);
        }
    }

    #[test]
    fn test_too_many_colors() {
        let pixels: Vec<u8> = (0..300u32).flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255]).collect();
        assert!(extract_palette_sequential(&pixels).is_none());
    }
}
