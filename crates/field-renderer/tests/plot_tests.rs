//! Tests for the real-part and magnitude renderers.

use field_common::{FieldError, Shape};
use field_renderer::axes::Orientation;
use field_renderer::png::PNG_SIGNATURE;
use field_renderer::{
    render_magnitude, render_real, Axes, AxesConfig, Color, Colormap, MagnitudeOptions,
    RealPartOptions,
};
use ndarray::{array, Array2};
use num_complex::Complex64;
use rand::Rng;

// ============================================================================
// Helper functions
// ============================================================================

/// `[[1+2j, -3], [4, -1-1j]]`
fn sample_field() -> Array2<Complex64> {
    array![
        [Complex64::new(1.0, 2.0), Complex64::new(-3.0, 0.0)],
        [Complex64::new(4.0, 0.0), Complex64::new(-1.0, -1.0)]
    ]
}

fn small_figure() -> AxesConfig {
    AxesConfig {
        width: 160,
        height: 120,
        ..AxesConfig::default()
    }
}

fn pixel(img: &image::RgbaImage, x: u32, y: u32) -> [u8; 4] {
    img.get_pixel(x, y).0
}

// ============================================================================
// Bound resolution
// ============================================================================

#[test]
fn test_real_default_bounds_are_symmetric() {
    let ax = render_real(&sample_field(), None, None, &RealPartOptions::default()).unwrap();
    let bounds = ax.images()[0].bounds();

    let expected = 20f64.sqrt();
    assert!((bounds.vmax - expected).abs() < 1e-9);
    assert!((bounds.vmin + expected).abs() < 1e-9);
    assert!((bounds.vmax - 4.472).abs() < 1e-3);
}

#[test]
fn test_magnitude_default_bounds_start_at_zero() {
    let ax = render_magnitude(&sample_field(), None, None, &MagnitudeOptions::default()).unwrap();
    let bounds = ax.images()[0].bounds();

    assert_eq!(bounds.vmin, 0.0);
    assert!((bounds.vmax - 20f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_real_overrides_used_exactly() {
    let opts = RealPartOptions {
        vmax: Some(0.25),
        vmin: Some(-0.125),
        ..RealPartOptions::default()
    };
    let ax = render_real(&sample_field(), None, None, &opts).unwrap();
    let bounds = ax.images()[0].bounds();
    assert_eq!(bounds.vmax, 0.25);
    assert_eq!(bounds.vmin, -0.125);
}

#[test]
fn test_real_vmin_derived_from_vmax_override() {
    let opts = RealPartOptions {
        vmax: Some(2.0),
        ..RealPartOptions::default()
    };
    let ax = render_real(&sample_field(), None, None, &opts).unwrap();
    assert_eq!(ax.images()[0].bounds().vmin, -2.0);
}

#[test]
fn test_real_vmin_override_keeps_data_vmax() {
    let opts = RealPartOptions {
        vmin: Some(0.0),
        ..RealPartOptions::default()
    };
    let ax = render_real(&sample_field(), None, None, &opts).unwrap();
    let bounds = ax.images()[0].bounds();
    assert_eq!(bounds.vmin, 0.0);
    assert!((bounds.vmax - 20f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_magnitude_vmax_override() {
    let opts = MagnitudeOptions {
        vmax: Some(100.0),
        ..MagnitudeOptions::default()
    };
    let ax = render_magnitude(&sample_field(), None, None, &opts).unwrap();
    let bounds = ax.images()[0].bounds();
    assert_eq!(bounds.vmax, 100.0);
    assert_eq!(bounds.vmin, 0.0);
}

#[test]
fn test_bounds_random_fields() {
    let mut rng = rand::thread_rng();
    for _ in 0..10 {
        let nx = rng.gen_range(1..8);
        let ny = rng.gen_range(1..8);
        let val = Array2::from_shape_fn((nx, ny), |_| {
            Complex64::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0))
        });
        let max = val.iter().map(|c| c.norm()).fold(0.0, f64::max);

        let real = render_real(&val, None, None, &RealPartOptions::default()).unwrap();
        assert_eq!(real.images()[0].bounds().vmax, max);
        assert_eq!(real.images()[0].bounds().vmin, -max);

        let mag = render_magnitude(&val, None, None, &MagnitudeOptions::default()).unwrap();
        assert_eq!(mag.images()[0].bounds().vmax, max);
        assert_eq!(mag.images()[0].bounds().vmin, 0.0);
    }
}

// ============================================================================
// Image content and orientation
// ============================================================================

#[test]
fn test_real_image_is_transposed_real_part() {
    let val = Array2::from_shape_fn((2, 3), |(x, y)| Complex64::new((10 * x + y) as f64, 7.0));
    let ax = render_real(&val, None, None, &RealPartOptions::default()).unwrap();

    let image = &ax.images()[0];
    assert_eq!(image.shape(), Shape::new(3, 2));
    for x in 0..2 {
        for y in 0..3 {
            assert_eq!(image.data()[[y, x]], val[[x, y]].re);
        }
    }
}

#[test]
fn test_magnitude_image_is_transposed_modulus() {
    let val = array![[Complex64::new(3.0, 4.0), Complex64::new(0.0, -2.0)]];
    let ax = render_magnitude(&val, None, None, &MagnitudeOptions::default()).unwrap();

    let image = &ax.images()[0];
    assert_eq!(image.shape(), Shape::new(2, 1));
    assert!((image.data()[[0, 0]] - 5.0).abs() < 1e-12);
    assert!((image.data()[[1, 0]] - 2.0).abs() < 1e-12);
}

#[test]
fn test_real_field_of_f64() {
    let val = array![[0.5, -1.5], [1.0, 0.0]];
    let ax = render_real(&val, None, None, &RealPartOptions::default()).unwrap();
    assert_eq!(ax.images()[0].bounds().vmax, 1.5);
}

#[test]
fn test_first_index_runs_horizontally() {
    // x = 0 holds the minimum, x = 1 the maximum
    let val = array![[-1.0, -1.0], [1.0, 1.0]];
    let ax = render_real(&val, None, None, &RealPartOptions::default()).unwrap();
    let img = ax.render().unwrap();

    // Default layout: 412x412 plot at (136, 12)
    let low = Color::from_hex("#67001f").unwrap().to_rgba();
    let high = Color::from_hex("#053061").unwrap().to_rgba();
    assert_eq!(pixel(&img, 136 + 103, 12 + 206), low);
    assert_eq!(pixel(&img, 136 + 309, 12 + 206), high);
}

#[test]
fn test_origin_is_lower_left() {
    // y = 0 holds zero, y = 1 the maximum; with Greys, zero is white
    let val = array![[0.0, 1.0], [0.0, 1.0]];
    let opts = MagnitudeOptions {
        cmap: Colormap::Greys,
        ..MagnitudeOptions::default()
    };
    let ax = render_magnitude(&val, None, None, &opts).unwrap();
    let img = ax.render().unwrap();

    assert_eq!(pixel(&img, 136 + 206, 12 + 103), [0, 0, 0, 255]);
    assert_eq!(pixel(&img, 136 + 206, 12 + 309), [255, 255, 255, 255]);
}

// ============================================================================
// Outlines
// ============================================================================

#[test]
fn test_magnitude_default_outline_level_is_midpoint() {
    let val = sample_field();
    let outline = array![[0.0, 1.0], [2.0, 3.0]];
    let ax = render_magnitude(&val, Some(outline.view()), None, &MagnitudeOptions::default())
        .unwrap();

    let layer = &ax.contour_layers()[0];
    assert_eq!(layer.levels(), &[1.5]);
    assert_eq!(layer.color(), Color::WHITE);
    assert_eq!(layer.alpha(), 0.5);
}

#[test]
fn test_magnitude_explicit_outline_level() {
    let outline = array![[0.0, 1.0], [2.0, 3.0]];
    let opts = MagnitudeOptions {
        outline_level: Some(2.5),
        outline_alpha: 0.8,
        ..MagnitudeOptions::default()
    };
    let ax = render_magnitude(&sample_field(), Some(outline.view()), None, &opts).unwrap();

    let layer = &ax.contour_layers()[0];
    assert_eq!(layer.levels(), &[2.5]);
    assert_eq!(layer.alpha(), 0.8);
}

#[test]
fn test_real_outline_is_dark_zero_contour() {
    let val = Array2::from_elem((8, 8), Complex64::new(1.0, 0.0));
    let outline = Array2::from_shape_fn((8, 8), |(x, _)| x as f64 - 3.5);
    let ax = render_real(&val, Some(outline.view()), None, &RealPartOptions::default()).unwrap();

    let layer = &ax.contour_layers()[0];
    assert_eq!(layer.levels(), &[0.0]);
    assert_eq!(layer.color(), Color::BLACK);

    // Outline varies along x; after transposing, the zero crossing is a
    // vertical line at column 3.5
    assert_eq!(layer.contours().len(), 1);
    for point in &layer.contours()[0].points {
        assert!((point.x - 3.5).abs() < 1e-9);
    }
}

#[test]
fn test_outline_shape_mismatch() {
    let outline = Array2::<f64>::zeros((3, 2));
    let opts = MagnitudeOptions {
        outline_level: Some(0.5),
        ..MagnitudeOptions::default()
    };
    let err = render_magnitude(&sample_field(), Some(outline.view()), None, &opts).unwrap_err();

    match err {
        FieldError::ShapeMismatch { expected, actual } => {
            assert_eq!(expected, Shape::new(2, 2));
            assert_eq!(actual, Shape::new(2, 3));
        }
        other => panic!("expected shape mismatch, got {other:?}"),
    }
}

#[test]
fn test_invalid_outline_alpha() {
    let outline = Array2::<f64>::zeros((2, 2));
    let opts = RealPartOptions {
        outline_alpha: 1.5,
        ..RealPartOptions::default()
    };
    let err = render_real(&sample_field(), Some(outline.view()), None, &opts).unwrap_err();
    assert!(matches!(err, FieldError::InvalidParameter { .. }));
}

// ============================================================================
// Empty input
// ============================================================================

#[test]
fn test_empty_field_fails_bound_inference() {
    let val = Array2::<Complex64>::zeros((0, 4));

    let err = render_real(&val, None, None, &RealPartOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "cannot infer vmax from empty input");

    let err = render_magnitude(&val, None, None, &MagnitudeOptions::default()).unwrap_err();
    assert!(matches!(err, FieldError::EmptyInput(_)));
}

#[test]
fn test_empty_field_with_overrides_still_fails() {
    let val = Array2::<f64>::zeros((0, 0));
    let opts = RealPartOptions {
        vmax: Some(1.0),
        vmin: Some(-1.0),
        ..RealPartOptions::default()
    };
    let err = render_real(&val, None, None, &opts).unwrap_err();
    assert!(matches!(err, FieldError::EmptyInput(_)));
}

#[test]
fn test_empty_outline_without_level() {
    let outline = Array2::<f64>::zeros((0, 2));
    let err = render_magnitude(
        &sample_field(),
        Some(outline.view()),
        None,
        &MagnitudeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FieldError::EmptyInput(_)));
}

// ============================================================================
// Labels, title, colorbar
// ============================================================================

#[test]
fn test_labels_and_optional_title() {
    let ax = render_real(&sample_field(), None, None, &RealPartOptions::default()).unwrap();
    assert_eq!(ax.xlabel(), Some("x"));
    assert_eq!(ax.ylabel(), Some("y"));
    assert_eq!(ax.title(), None);
    assert!(ax.colorbar_spec().is_none());

    let opts = MagnitudeOptions {
        title: Some("|Ez|".to_string()),
        cbar: true,
        ..MagnitudeOptions::default()
    };
    let ax = render_magnitude(&sample_field(), None, None, &opts).unwrap();
    assert_eq!(ax.title(), Some("|Ez|"));
    let spec = ax.colorbar_spec().unwrap();
    assert_eq!(spec.orientation, Orientation::Horizontal);
    assert!(ax.image(spec.image).is_some());
}

#[test]
fn test_default_colormaps() {
    let real = render_real(&sample_field(), None, None, &RealPartOptions::default()).unwrap();
    assert_eq!(real.images()[0].cmap(), &Colormap::RdBu);

    let mag = render_magnitude(&sample_field(), None, None, &MagnitudeOptions::default()).unwrap();
    assert_eq!(mag.images()[0].cmap(), &Colormap::Magma);
}

// ============================================================================
// Axes acquisition
// ============================================================================

#[test]
fn test_existing_axes_returned_with_same_identity() {
    let mut ax = Axes::new(small_figure());
    let before: *const Axes = &ax;

    let handle = render_real(&sample_field(), None, Some(&mut ax), &RealPartOptions::default())
        .unwrap();
    assert!(handle.is_borrowed());
    assert!(std::ptr::eq(&*handle, before));
    drop(handle);

    let handle =
        render_magnitude(&sample_field(), None, Some(&mut ax), &MagnitudeOptions::default())
            .unwrap();
    assert!(std::ptr::eq(&*handle, before));
    assert!(handle.into_owned().is_none());

    // Both renders landed in the caller's axes
    assert_eq!(ax.images().len(), 2);
    assert_eq!(ax.config().width, 160);
}

#[test]
fn test_new_axes_uses_figure_config() {
    let opts = RealPartOptions {
        figure: small_figure(),
        ..RealPartOptions::default()
    };
    let handle = render_real(&sample_field(), None, None, &opts).unwrap();
    assert!(!handle.is_borrowed());

    let ax = handle.into_owned().unwrap();
    let img = ax.render().unwrap();
    assert_eq!(img.dimensions(), (160, 120));
}

#[test]
fn test_rendered_png() {
    let opts = RealPartOptions {
        title: Some("Re(Ez)".to_string()),
        cbar: true,
        ..RealPartOptions::default()
    };
    let outline = array![[0.0, 1.0], [2.0, 3.0]];
    let ax = render_real(&sample_field(), Some(outline.view()), None, &opts).unwrap();

    let png = ax.to_png().unwrap();
    assert_eq!(&png[..8], &PNG_SIGNATURE);

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (640, 480));
}
