//! Heatmap rendering for complex 2D fields.
//!
//! Implements:
//! - Real-part rendering on a diverging colormap
//! - Magnitude rendering on a sequential colormap
//! - Contour outlines of a second field (marching squares)
//! - Phase animations encoded as GIF
//! - PNG encoding of rendered axes

pub mod animate;
pub mod axes;
pub mod bounds;
pub mod colormap;
pub mod contour;
pub mod options;
pub mod plot;
pub mod png;
pub mod text;

pub use animate::{animate_gif, encode_gif, phase_frames};
pub use axes::{Axes, ImageId, Orientation, Origin};
pub use bounds::ColorBounds;
pub use colormap::{Color, ColorStop, Colormap};
pub use options::{AnimationOptions, AxesConfig, MagnitudeOptions, RealPartOptions};
pub use plot::{render_magnitude, render_real, AxesHandle};
