//! Field values and whole-array reductions.
//!
//! Fields are 2D arrays indexed `[x, y]`. Entries may be real or complex;
//! anything implementing [`FieldValue`] can be rendered.

use std::fmt;

use ndarray::{ArrayBase, Data, Ix2};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};

/// A scalar that can be displayed by its real part or by its magnitude.
pub trait FieldValue: Copy + Send + Sync {
    /// Real part of the value.
    fn real(self) -> f64;

    /// Absolute value (modulus for complex numbers).
    fn magnitude(self) -> f64;

    /// Multiply by the unit phasor `exp(i * phase)` and take the real part.
    fn rotated_real(self, phase: f64) -> f64;
}

impl FieldValue for f64 {
    fn real(self) -> f64 {
        self
    }

    fn magnitude(self) -> f64 {
        self.abs()
    }

    fn rotated_real(self, phase: f64) -> f64 {
        self * phase.cos()
    }
}

impl FieldValue for f32 {
    fn real(self) -> f64 {
        self as f64
    }

    fn magnitude(self) -> f64 {
        (self as f64).abs()
    }

    fn rotated_real(self, phase: f64) -> f64 {
        self as f64 * phase.cos()
    }
}

impl FieldValue for Complex<f64> {
    fn real(self) -> f64 {
        self.re
    }

    fn magnitude(self) -> f64 {
        self.norm()
    }

    fn rotated_real(self, phase: f64) -> f64 {
        // Re((a + ib)(cos p + i sin p)) = a cos p - b sin p
        self.re * phase.cos() - self.im * phase.sin()
    }
}

impl FieldValue for Complex<f32> {
    fn real(self) -> f64 {
        self.re as f64
    }

    fn magnitude(self) -> f64 {
        (self.re as f64).hypot(self.im as f64)
    }

    fn rotated_real(self, phase: f64) -> f64 {
        self.re as f64 * phase.cos() - self.im as f64 * phase.sin()
    }
}

/// Dimensions of a 2D grid as `(rows, cols)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Shape of any 2D ndarray.
    pub fn of<S: Data>(array: &ArrayBase<S, Ix2>) -> Self {
        let (rows, cols) = array.dim();
        Self { rows, cols }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Shape with rows and columns swapped.
    pub fn transposed(&self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}

/// Largest absolute value over all entries of `val`.
///
/// NaN entries are skipped. Fails with [`FieldError::EmptyInput`] when the
/// array has no entries or every entry is NaN.
pub fn max_abs<S, T>(val: &ArrayBase<S, Ix2>) -> FieldResult<f64>
where
    S: Data<Elem = T>,
    T: FieldValue,
{
    val.iter()
        .map(|v| v.magnitude())
        .filter(|m| !m.is_nan())
        .fold(None, |acc: Option<f64>, m| Some(acc.map_or(m, |a| a.max(m))))
        .ok_or_else(|| FieldError::EmptyInput("vmax".to_string()))
}

/// Minimum and maximum of a real-valued array, skipping NaN entries.
pub fn min_max<S>(val: &ArrayBase<S, Ix2>) -> FieldResult<(f64, f64)>
where
    S: Data<Elem = f64>,
{
    val.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<(f64, f64)>, v| {
            Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
        })
        .ok_or_else(|| FieldError::EmptyInput("range".to_string()))
}
