//! Color-scale bound resolution.
//!
//! Explicit overrides always win. Defaults are only computed when an
//! override is absent, so an override never touches the data.

use field_common::{max_abs, min_max, FieldResult, FieldValue};
use ndarray::{ArrayBase, ArrayView2, Data, Ix2};

/// Resolved color-scale range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBounds {
    pub vmin: f64,
    pub vmax: f64,
}

/// Bounds for the real-part renderer.
///
/// `vmax` defaults to `max(|val|)`; `vmin` defaults to the negated resolved
/// `vmax`, even when `vmax` itself was overridden.
pub fn real_part_bounds<S, T>(
    val: &ArrayBase<S, Ix2>,
    vmax: Option<f64>,
    vmin: Option<f64>,
) -> FieldResult<ColorBounds>
where
    S: Data<Elem = T>,
    T: FieldValue,
{
    let vmax = match vmax {
        Some(vmax) => vmax,
        None => max_abs(val)?,
    };
    let vmin = vmin.unwrap_or(-vmax);
    Ok(ColorBounds { vmin, vmax })
}

/// Bounds for the magnitude renderer. The minimum is always 0.
pub fn magnitude_bounds<S, T>(val: &ArrayBase<S, Ix2>, vmax: Option<f64>) -> FieldResult<ColorBounds>
where
    S: Data<Elem = T>,
    T: FieldValue,
{
    let vmax = match vmax {
        Some(vmax) => vmax,
        None => max_abs(val)?,
    };
    Ok(ColorBounds { vmin: 0.0, vmax })
}

/// Outline contour level: the override, or the midpoint of the outline's range.
pub fn outline_level(outline: ArrayView2<'_, f64>, level: Option<f64>) -> FieldResult<f64> {
    match level {
        Some(level) => Ok(level),
        None => {
            let (lo, hi) = min_max(&outline)?;
            Ok((lo + hi) / 2.0)
        }
    }
}
