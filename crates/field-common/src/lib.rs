//! Common types shared by the field rendering crates.

pub mod error;
pub mod field;
pub mod parameterization;

pub use error::{FieldError, FieldResult};
pub use field::{max_abs, min_max, FieldValue, Shape};
pub use parameterization::{EpsrParameterization, C_0, EPSILON_0, MU_0, Q_E};
pub use num_complex::{Complex32, Complex64};
