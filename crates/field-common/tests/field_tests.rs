//! Tests for field value reductions.

use field_common::{max_abs, min_max, FieldError, FieldValue, Shape};
use ndarray::{array, Array2};
use num_complex::Complex;
use rand::Rng;

// ============================================================================
// max_abs tests
// ============================================================================

#[test]
fn test_max_abs_real_negative_dominates() {
    let val = array![[1.0, -7.5], [3.0, 2.0]];
    assert_eq!(max_abs(&val).unwrap(), 7.5);
}

#[test]
fn test_max_abs_f32_field() {
    let val: Array2<f32> = array![[0.5, -0.25], [0.125, 0.0]];
    assert!((max_abs(&val).unwrap() - 0.5).abs() < 1e-9);
}

#[test]
fn test_max_abs_view() {
    let val = array![[1.0, 2.0, 3.0], [4.0, 5.0, -9.0]];
    let view = val.t();
    assert_eq!(max_abs(&view).unwrap(), 9.0);
}

#[test]
fn test_max_abs_all_nan_is_empty() {
    let val = array![[f64::NAN, f64::NAN]];
    assert!(matches!(max_abs(&val), Err(FieldError::EmptyInput(_))));
}

#[test]
fn test_max_abs_matches_brute_force_random() {
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let nx = rng.gen_range(1..12);
        let ny = rng.gen_range(1..12);
        let val = Array2::from_shape_fn((nx, ny), |_| {
            Complex::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0))
        });
        let expected = val
            .iter()
            .map(|c: &Complex<f64>| (c.re * c.re + c.im * c.im).sqrt())
            .fold(0.0, f64::max);
        assert!((max_abs(&val).unwrap() - expected).abs() < 1e-12);
    }
}

// ============================================================================
// min_max tests
// ============================================================================

#[test]
fn test_min_max_outline() {
    let outline = array![[0.0, 1.0], [2.0, 3.0]];
    assert_eq!(min_max(&outline).unwrap(), (0.0, 3.0));
}

#[test]
fn test_min_max_empty() {
    let outline: Array2<f64> = Array2::zeros((2, 0));
    let err = min_max(&outline).unwrap_err();
    assert!(err.is_input_error());
    assert_eq!(err.to_string(), "cannot infer range from empty input");
}

// ============================================================================
// FieldValue / Shape tests
// ============================================================================

#[test]
fn test_field_value_real_and_magnitude() {
    let c = Complex::new(3.0f64, -4.0);
    assert_eq!(c.real(), 3.0);
    assert!((c.magnitude() - 5.0).abs() < 1e-12);

    let c32 = Complex::new(3.0f32, 4.0);
    assert!((c32.magnitude() - 5.0).abs() < 1e-6);

    assert_eq!((-2.0f64).magnitude(), 2.0);
    assert_eq!((-2.0f64).real(), -2.0);
}

#[test]
fn test_rotated_real_full_turn_is_identity() {
    let c = Complex::new(0.3f64, -1.7);
    let r = c.rotated_real(2.0 * std::f64::consts::PI);
    assert!((r - 0.3).abs() < 1e-12);
}

#[test]
fn test_shape_display_and_transpose() {
    let shape = Shape::new(3, 5);
    assert_eq!(shape.to_string(), "(3, 5)");
    assert_eq!(shape.transposed(), Shape::new(5, 3));
    assert!(!shape.is_empty());
    assert!(Shape::new(0, 5).is_empty());
}

#[test]
fn test_shape_mismatch_message() {
    let err = FieldError::ShapeMismatch {
        expected: Shape::new(2, 2),
        actual: Shape::new(3, 2),
    };
    assert_eq!(err.to_string(), "Shape mismatch: expected (2, 2), got (3, 2)");
}
