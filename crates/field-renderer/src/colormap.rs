//! Colormaps for heatmap rendering.
//!
//! A colormap is a list of color stops. Named maps follow the common
//! scientific plotting palettes; custom maps can be given as stops in
//! JSON. Rendering goes through a precomputed 256-entry lookup table.

use std::fmt;
use std::str::FromStr;

use field_common::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};

/// Number of entries in a colormap lookup table.
pub const LUT_SIZE: usize = 256;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Same color with its alpha scaled by `alpha` in [0, 1].
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (self.a as f64 * alpha.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// RGBA with color channels scaled by alpha, as tiny-skia stores pixels.
    pub fn to_premultiplied(self) -> [u8; 4] {
        let scale = |c: u8| ((c as u16 * self.a as u16 + 127) / 255) as u8;
        [scale(self.r), scale(self.g), scale(self.b), self.a]
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| (a as f32 * t_inv + b as f32 * t).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Color stop for a colormap
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ColorStop {
    pub value: f32,
    pub color: String,
}

impl ColorStop {
    pub fn new(value: f32, color: &str) -> Self {
        Self {
            value,
            color: color.to_string(),
        }
    }
}

const RDBU: &[&str] = &[
    "#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7", "#f7f7f7", "#d1e5f0", "#92c5de",
    "#4393c3", "#2166ac", "#053061",
];
const BWR: &[&str] = &["#0000ff", "#ffffff", "#ff0000"];
const SEISMIC: &[&str] = &["#00004c", "#0000ff", "#ffffff", "#ff0000", "#7f0000"];
const VIRIDIS: &[&str] = &[
    "#440154", "#472d7b", "#3b528b", "#2c728e", "#21918c", "#28ae80", "#5ec962", "#addc30",
    "#fde725",
];
const MAGMA: &[&str] = &[
    "#000004", "#1c1044", "#4f127b", "#812581", "#b5367a", "#e55064", "#fb8761", "#fec287",
    "#fcfdbf",
];
const INFERNO: &[&str] = &[
    "#000004", "#1f0c48", "#550f6d", "#88226a", "#ba3655", "#e35933", "#f98e09", "#f9cb35",
    "#fcffa4",
];
const GREYS: &[&str] = &["#ffffff", "#000000"];
const GRAY: &[&str] = &["#000000", "#ffffff"];

/// A named or custom colormap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColormapRepr", into = "ColormapRepr")]
pub enum Colormap {
    /// Diverging red (low) to blue (high).
    RdBu,
    /// Diverging blue (low) to red (high).
    RdBuR,
    Bwr,
    Seismic,
    Viridis,
    Magma,
    Inferno,
    /// White (low) to black (high).
    Greys,
    /// Black (low) to white (high).
    Gray,
    Custom(Vec<ColorStop>),
}

/// Serialized form: a colormap name or a list of stops.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum ColormapRepr {
    Name(String),
    Stops(Vec<ColorStop>),
}

impl TryFrom<ColormapRepr> for Colormap {
    type Error = FieldError;

    fn try_from(repr: ColormapRepr) -> FieldResult<Self> {
        match repr {
            ColormapRepr::Name(name) => name.parse(),
            ColormapRepr::Stops(stops) => Colormap::custom(stops),
        }
    }
}

impl From<Colormap> for ColormapRepr {
    fn from(cmap: Colormap) -> Self {
        match cmap {
            Colormap::Custom(stops) => ColormapRepr::Stops(stops),
            named => ColormapRepr::Name(named.name().to_string()),
        }
    }
}

impl FromStr for Colormap {
    type Err = FieldError;

    fn from_str(name: &str) -> FieldResult<Self> {
        match name {
            "RdBu" => Ok(Colormap::RdBu),
            "RdBu_r" => Ok(Colormap::RdBuR),
            "bwr" => Ok(Colormap::Bwr),
            "seismic" => Ok(Colormap::Seismic),
            "viridis" => Ok(Colormap::Viridis),
            "magma" => Ok(Colormap::Magma),
            "inferno" => Ok(Colormap::Inferno),
            "Greys" => Ok(Colormap::Greys),
            "gray" | "grey" => Ok(Colormap::Gray),
            other => Err(FieldError::UnknownColormap(other.to_string())),
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Colormap {
    /// Build a custom colormap, validating the stops.
    pub fn custom(mut stops: Vec<ColorStop>) -> FieldResult<Self> {
        if stops.len() < 2 {
            return Err(FieldError::invalid("cmap", "a colormap needs at least two stops"));
        }
        if let Some(bad) = stops.iter().find(|s| Color::from_hex(&s.color).is_none()) {
            return Err(FieldError::invalid(
                "cmap",
                format!("invalid color '{}'", bad.color),
            ));
        }
        if stops.iter().any(|s| !s.value.is_finite()) {
            return Err(FieldError::invalid("cmap", "stop values must be finite"));
        }
        stops.sort_by(|a, b| a.value.total_cmp(&b.value));
        Ok(Colormap::Custom(stops))
    }

    pub fn name(&self) -> &str {
        match self {
            Colormap::RdBu => "RdBu",
            Colormap::RdBuR => "RdBu_r",
            Colormap::Bwr => "bwr",
            Colormap::Seismic => "seismic",
            Colormap::Viridis => "viridis",
            Colormap::Magma => "magma",
            Colormap::Inferno => "inferno",
            Colormap::Greys => "Greys",
            Colormap::Gray => "gray",
            Colormap::Custom(_) => "custom",
        }
    }

    /// Whether the map is designed for data centred on zero.
    pub fn is_diverging(&self) -> bool {
        matches!(
            self,
            Colormap::RdBu | Colormap::RdBuR | Colormap::Bwr | Colormap::Seismic
        )
    }

    /// Color stops sorted by value.
    pub fn stops(&self) -> Vec<ColorStop> {
        let evenly = |hexes: &[&str]| -> Vec<ColorStop> {
            let last = (hexes.len() - 1) as f32;
            hexes
                .iter()
                .enumerate()
                .map(|(i, hex)| ColorStop::new(i as f32 / last, hex))
                .collect()
        };

        match self {
            Colormap::RdBu => evenly(RDBU),
            Colormap::RdBuR => {
                let reversed: Vec<&str> = RDBU.iter().rev().copied().collect();
                evenly(&reversed)
            }
            Colormap::Bwr => evenly(BWR),
            Colormap::Seismic => evenly(SEISMIC),
            Colormap::Viridis => evenly(VIRIDIS),
            Colormap::Magma => evenly(MAGMA),
            Colormap::Inferno => evenly(INFERNO),
            Colormap::Greys => evenly(GREYS),
            Colormap::Gray => evenly(GRAY),
            Colormap::Custom(stops) => stops.clone(),
        }
    }

    /// Color for a normalized position `t` in [0, 1].
    pub fn color_at(&self, t: f32) -> Color {
        let stops: Vec<(f32, Color)> = self
            .stops()
            .iter()
            .filter_map(|s| Color::from_hex(&s.color).map(|c| (s.value, c)))
            .collect();
        color_from_stops(&stops, t)
    }

    /// Precompute the lookup table used for rendering.
    pub fn lut(&self) -> ColorLut {
        let stops: Vec<(f32, Color)> = self
            .stops()
            .iter()
            .filter_map(|s| Color::from_hex(&s.color).map(|c| (s.value, c)))
            .collect();

        let mut colors = [Color::transparent(); LUT_SIZE];
        for (i, slot) in colors.iter_mut().enumerate() {
            *slot = color_from_stops(&stops, i as f32 / (LUT_SIZE - 1) as f32);
        }
        ColorLut { colors }
    }
}

/// Interpolate within stops whose values span an arbitrary range.
fn color_from_stops(stops: &[(f32, Color)], t: f32) -> Color {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Color::transparent(),
    };

    let span = last.0 - first.0;
    let value = if span.abs() < f32::EPSILON {
        first.0
    } else {
        first.0 + t.clamp(0.0, 1.0) * span
    };

    if value <= first.0 {
        return first.1;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if value <= hi.0 {
            let width = hi.0 - lo.0;
            let local = if width.abs() < f32::EPSILON {
                1.0
            } else {
                (value - lo.0) / width
            };
            return interpolate_color(lo.1, hi.1, local);
        }
    }

    last.1
}

/// Position of `value` within `[vmin, vmax]`, 0 at `vmin` and 1 at `vmax`.
///
/// Works on halved values so ranges wider than `f64::MAX` stay finite.
pub fn normalize(value: f64, vmin: f64, vmax: f64) -> f64 {
    (value / 2.0 - vmin / 2.0) / (vmax / 2.0 - vmin / 2.0)
}

/// Precomputed colormap lookup table.
#[derive(Debug, Clone)]
pub struct ColorLut {
    colors: [Color; LUT_SIZE],
}

impl ColorLut {
    /// Color for a value scaled into `[vmin, vmax]`.
    ///
    /// Values outside the range clamp to the end colors; NaN is transparent.
    #[inline]
    pub fn map(&self, value: f64, vmin: f64, vmax: f64) -> Color {
        if value.is_nan() {
            return Color::transparent();
        }
        self.colors[self.index(value, vmin, vmax)]
    }

    /// Premultiplied RGBA for a value, see [`ColorLut::map`].
    #[inline]
    pub fn map_premultiplied(&self, value: f64, vmin: f64, vmax: f64) -> [u8; 4] {
        self.map(value, vmin, vmax).to_premultiplied()
    }

    /// LUT index for a value, see [`ColorLut::map`].
    #[inline]
    pub fn index(&self, value: f64, vmin: f64, vmax: f64) -> usize {
        let normalized = if (vmax - vmin).abs() <= f64::EPSILON {
            // Degenerate range: everything sits at the low end
            0.0
        } else {
            normalize(value, vmin, vmax).clamp(0.0, 1.0)
        };
        self.index_at(normalized)
    }

    /// LUT index for a position `t` in [0, 1].
    #[inline]
    fn index_at(&self, t: f64) -> usize {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        (t * (LUT_SIZE - 1) as f64).round() as usize
    }

    /// Color for a position `t` in [0, 1] along the map.
    pub fn at(&self, t: f64) -> Color {
        self.colors[self.index_at(t)]
    }

    pub fn colors(&self) -> &[Color; LUT_SIZE] {
        &self.colors
    }
}
