//! Density-to-permittivity parameterization for inverse design regions.
//!
//! A design density `rho` in [0, 1] is merged with a fixed background,
//! smoothed by a disc blur, pushed towards 0 or 1 by a tanh projection and
//! finally scaled into a relative permittivity range. The result is the
//! kind of grid the renderers take as an outline.

use ndarray::{Array2, ArrayBase, Data, Ix2, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};
use crate::field::Shape;

/// Vacuum permittivity (F/m).
pub const EPSILON_0: f64 = 8.85418782e-12;

/// Vacuum permeability (H/m).
pub const MU_0: f64 = 1.25663706e-6;

/// Speed of light in vacuum, `1 / sqrt(EPSILON_0 * MU_0)` (m/s).
pub const C_0: f64 = 299_792_458.130_996;

/// Elementary charge (C).
pub const Q_E: f64 = 1.602176634e-19;

fn check_same_shape(expected: Shape, actual: Shape) -> FieldResult<()> {
    if expected != actual {
        return Err(FieldError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Take `rho` inside the design region and `bg_rho` everywhere else.
///
/// A cell belongs to the design region when its `design_region` entry is
/// non-zero; the entry also scales `rho` there.
pub fn mask_combine_rho<S1, S2, S3>(
    rho: &ArrayBase<S1, Ix2>,
    bg_rho: &ArrayBase<S2, Ix2>,
    design_region: &ArrayBase<S3, Ix2>,
) -> FieldResult<Array2<f64>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    S3: Data<Elem = f64>,
{
    let shape = Shape::of(rho);
    check_same_shape(shape, Shape::of(bg_rho))?;
    check_same_shape(shape, Shape::of(design_region))?;

    Ok(Zip::from(rho)
        .and(bg_rho)
        .and(design_region)
        .map_collect(|&r, &bg, &region| {
            if region == 0.0 {
                bg
            } else {
                r * region
            }
        }))
}

/// Smoothed threshold at `eta` with steepness `beta`, applied `passes` times.
///
/// Maps 0 to 0, 1 to 1 and `eta` to `eta`; larger `beta` approaches a step.
pub fn operator_proj<S>(
    rho: &ArrayBase<S, Ix2>,
    eta: f64,
    beta: f64,
    passes: usize,
) -> FieldResult<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    if !(0.0..=1.0).contains(&eta) {
        return Err(FieldError::invalid("eta", format!("must be in [0, 1], got {}", eta)));
    }
    if !(beta.is_finite() && beta > 0.0) {
        return Err(FieldError::invalid(
            "beta",
            format!("must be finite and positive, got {}", beta),
        ));
    }

    let offset = (beta * eta).tanh();
    let denom = offset + (beta * (1.0 - eta)).tanh();

    let mut out = rho.to_owned();
    for _ in 0..passes {
        out.mapv_inplace(|r| (offset + (beta * (r - eta)).tanh()) / denom);
    }
    Ok(out)
}

/// Normalized disc kernel of size `2 * radius + 1`.
///
/// A cell is inside the disc when its squared distance from the centre is
/// below `(radius + 1)^2`.
pub fn blur_kernel(radius: usize) -> Array2<f64> {
    let size = 2 * radius + 1;
    let limit = ((radius + 1) * (radius + 1)) as f64;
    let centre = radius as f64;

    let mut kernel = Array2::from_shape_fn((size, size), |(r, c)| {
        let (dr, dc) = (r as f64 - centre, c as f64 - centre);
        if dr * dr + dc * dc < limit {
            1.0
        } else {
            0.0
        }
    });
    let total = kernel.sum();
    kernel /= total;
    kernel
}

/// Disc blur with zero padding, applied `passes` times. The output has the
/// shape of the input.
pub fn operator_blur<S>(rho: &ArrayBase<S, Ix2>, radius: usize, passes: usize) -> Array2<f64>
where
    S: Data<Elem = f64>,
{
    let kernel = blur_kernel(radius);
    let mut out = rho.to_owned();
    for _ in 0..passes {
        out = convolve_same(&out, &kernel, radius);
    }
    out
}

fn convolve_same(rho: &Array2<f64>, kernel: &Array2<f64>, radius: usize) -> Array2<f64> {
    let (rows, cols) = rho.dim();
    let r = radius as isize;

    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let mut acc = 0.0;
        for ((a, b), &k) in kernel.indexed_iter() {
            if k == 0.0 {
                continue;
            }
            let si = i as isize + a as isize - r;
            let sj = j as isize + b as isize - r;
            if si < 0 || sj < 0 || si >= rows as isize || sj >= cols as isize {
                continue;
            }
            acc += k * rho[[si as usize, sj as usize]];
        }
        acc
    })
}

fn default_radius() -> usize {
    2
}

fn default_passes() -> usize {
    1
}

fn default_beta() -> f64 {
    100.0
}

fn default_eta() -> f64 {
    0.5
}

/// Settings for turning a design density into relative permittivity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EpsrParameterization {
    pub epsr_min: f64,
    pub epsr_max: f64,
    #[serde(default = "default_radius")]
    pub radius: usize,
    #[serde(default = "default_passes")]
    pub n_blur: usize,
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_eta")]
    pub eta: f64,
    #[serde(default = "default_passes")]
    pub n_proj: usize,
}

impl EpsrParameterization {
    /// Default filter settings between `epsr_min` and `epsr_max`.
    pub fn new(epsr_min: f64, epsr_max: f64) -> Self {
        Self {
            epsr_min,
            epsr_max,
            radius: default_radius(),
            n_blur: default_passes(),
            beta: default_beta(),
            eta: default_eta(),
            n_proj: default_passes(),
        }
    }

    pub fn from_json(json_str: &str) -> FieldResult<Self> {
        let params: Self = serde_json::from_str(json_str)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> FieldResult<()> {
        if !(self.epsr_min.is_finite() && self.epsr_max.is_finite()) {
            return Err(FieldError::invalid(
                "epsr_min/epsr_max",
                "permittivity bounds must be finite",
            ));
        }
        if !(0.0..=1.0).contains(&self.eta) {
            return Err(FieldError::invalid("eta", format!("must be in [0, 1], got {}", self.eta)));
        }
        if !(self.beta.is_finite() && self.beta > 0.0) {
            return Err(FieldError::invalid(
                "beta",
                format!("must be finite and positive, got {}", self.beta),
            ));
        }
        Ok(())
    }

    /// Relative permittivity for `rho` over the design region.
    ///
    /// The mask is applied before blurring and again after projection, so
    /// cells outside the region always map from `bg_rho` unfiltered.
    pub fn apply<S1, S2, S3>(
        &self,
        rho: &ArrayBase<S1, Ix2>,
        bg_rho: &ArrayBase<S2, Ix2>,
        design_region: &ArrayBase<S3, Ix2>,
    ) -> FieldResult<Array2<f64>>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
        S3: Data<Elem = f64>,
    {
        self.validate()?;

        let rho = mask_combine_rho(rho, bg_rho, design_region)?;
        let rho = operator_blur(&rho, self.radius, self.n_blur);
        let rho = operator_proj(&rho, self.eta, self.beta, self.n_proj)?;
        let rho = mask_combine_rho(&rho, bg_rho, design_region)?;

        let span = self.epsr_max - self.epsr_min;
        Ok(rho.mapv(|r| self.epsr_min + span * r))
    }
}
