//! Render options for the field renderers.
//!
//! Every option can be loaded from JSON; missing keys take their defaults.

use field_common::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};

use crate::colormap::{Color, Colormap};

/// Default transparency of outline contours.
pub const DEFAULT_OUTLINE_ALPHA: f64 = 0.5;

/// Default number of frames in a phase animation.
pub const DEFAULT_FRAMES: usize = 24;

/// Most Chaikin passes allowed; each pass doubles a contour's points.
pub const MAX_SMOOTHING_PASSES: u32 = 6;

fn default_outline_alpha() -> f64 {
    DEFAULT_OUTLINE_ALPHA
}

fn default_frames() -> usize {
    DEFAULT_FRAMES
}

fn diverging() -> Colormap {
    Colormap::RdBu
}

fn sequential() -> Colormap {
    Colormap::Magma
}

/// Layout of a freshly created axes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AxesConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Outer margin on every side
    pub margin: u32,
    /// Space left of and below the plot for ticks and axis labels
    pub label_area: u32,
    /// Space above the plot reserved when a title is set
    pub title_area: u32,
    /// Thickness of the colorbar strip
    pub colorbar_thickness: u32,
    /// Gap between plot and colorbar (holds tick labels)
    pub colorbar_gap: u32,
    /// Font size for labels; the title is drawn 20% larger
    pub font_size: f32,
    /// Approximate number of ticks per axis
    pub tick_count: usize,
    /// Width of contour lines in pixels
    pub line_width: f32,
    /// Chaikin smoothing passes applied to contours
    pub smoothing_passes: u32,
    /// Background color as hex
    pub background: String,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            margin: 12,
            label_area: 44,
            title_area: 30,
            colorbar_thickness: 14,
            colorbar_gap: 40,
            font_size: 13.0,
            tick_count: 5,
            line_width: 1.5,
            smoothing_passes: 0,
            background: "#ffffff".to_string(),
        }
    }
}

impl AxesConfig {
    pub fn from_json(json_str: &str) -> FieldResult<Self> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot: the background color and the
    /// smoothing pass limit.
    pub fn validate(&self) -> FieldResult<()> {
        self.background_color()?;
        if self.smoothing_passes > MAX_SMOOTHING_PASSES {
            return Err(FieldError::invalid(
                "smoothing_passes",
                format!(
                    "at most {} passes allowed, got {}",
                    MAX_SMOOTHING_PASSES, self.smoothing_passes
                ),
            ));
        }
        Ok(())
    }

    /// Parsed background color.
    pub fn background_color(&self) -> FieldResult<Color> {
        Color::from_hex(&self.background).ok_or_else(|| {
            FieldError::Config(format!("invalid background color '{}'", self.background))
        })
    }
}

/// Options for rendering the real part of a field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RealPartOptions {
    /// Color scale maximum; defaults to `max(|val|)`
    #[serde(default)]
    pub vmax: Option<f64>,
    /// Color scale minimum; defaults to `-vmax`
    #[serde(default)]
    pub vmin: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "diverging")]
    pub cmap: Colormap,
    #[serde(default = "default_outline_alpha")]
    pub outline_alpha: f64,
    /// Attach a horizontal colorbar
    #[serde(default)]
    pub cbar: bool,
    /// Layout used when no axes is supplied
    #[serde(default)]
    pub figure: AxesConfig,
}

impl Default for RealPartOptions {
    fn default() -> Self {
        Self {
            vmax: None,
            vmin: None,
            title: None,
            cmap: diverging(),
            outline_alpha: DEFAULT_OUTLINE_ALPHA,
            cbar: false,
            figure: AxesConfig::default(),
        }
    }
}

impl RealPartOptions {
    pub fn from_json(json_str: &str) -> FieldResult<Self> {
        let opts: Self = serde_json::from_str(json_str)?;
        opts.figure.validate()?;
        Ok(opts)
    }
}

/// Options for rendering the magnitude of a field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MagnitudeOptions {
    /// Color scale maximum; defaults to `max(|val|)`. The minimum is always 0.
    #[serde(default)]
    pub vmax: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "sequential")]
    pub cmap: Colormap,
    #[serde(default = "default_outline_alpha")]
    pub outline_alpha: f64,
    /// Outline contour level; defaults to the midpoint of the outline range
    #[serde(default)]
    pub outline_level: Option<f64>,
    #[serde(default)]
    pub cbar: bool,
    #[serde(default)]
    pub figure: AxesConfig,
}

impl Default for MagnitudeOptions {
    fn default() -> Self {
        Self {
            vmax: None,
            title: None,
            cmap: sequential(),
            outline_alpha: DEFAULT_OUTLINE_ALPHA,
            outline_level: None,
            cbar: false,
            figure: AxesConfig::default(),
        }
    }
}

impl MagnitudeOptions {
    pub fn from_json(json_str: &str) -> FieldResult<Self> {
        let opts: Self = serde_json::from_str(json_str)?;
        opts.figure.validate()?;
        Ok(opts)
    }
}

/// Options for phase animations of a time-harmonic field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnimationOptions {
    /// Symmetric color scale bound; defaults to `max(|val|)`
    #[serde(default)]
    pub vmax: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "diverging")]
    pub cmap: Colormap,
    #[serde(default = "default_outline_alpha")]
    pub outline_alpha: f64,
    #[serde(default)]
    pub cbar: bool,
    /// Frames per full phase cycle
    #[serde(default = "default_frames")]
    pub frames: usize,
    /// Delay between frames in the encoded GIF
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u32,
    #[serde(default)]
    pub figure: AxesConfig,
}

fn default_frame_delay_ms() -> u32 {
    100
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            vmax: None,
            title: None,
            cmap: diverging(),
            outline_alpha: DEFAULT_OUTLINE_ALPHA,
            cbar: false,
            frames: DEFAULT_FRAMES,
            frame_delay_ms: default_frame_delay_ms(),
            figure: AxesConfig::default(),
        }
    }
}

impl AnimationOptions {
    pub fn from_json(json_str: &str) -> FieldResult<Self> {
        let opts: Self = serde_json::from_str(json_str)?;
        opts.figure.validate()?;
        Ok(opts)
    }
}
