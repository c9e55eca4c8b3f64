//! Real-part and magnitude renderers for 2D fields.
//!
//! Fields are indexed `[x, y]`. Both renderers transpose before drawing so
//! the first index runs horizontally and the second vertically, with the
//! origin in the lower-left corner.

use std::ops::{Deref, DerefMut};

use field_common::{FieldResult, FieldValue, Shape};
use ndarray::{Array2, ArrayBase, ArrayView2, Data, Ix2};

use crate::axes::{Axes, ImageId, Orientation, Origin};
use crate::bounds::{magnitude_bounds, outline_level, real_part_bounds};
use crate::colormap::Color;
use crate::options::{AxesConfig, MagnitudeOptions, RealPartOptions};

/// Contour level of the real-part outline.
pub const REAL_OUTLINE_LEVEL: f64 = 0.0;

/// Outline color over diverging maps.
pub const DARK_OUTLINE: Color = Color::BLACK;

/// Outline color over sequential maps.
pub const LIGHT_OUTLINE: Color = Color::WHITE;

/// The axes a renderer drew into: either freshly created or the caller's.
#[derive(Debug)]
pub enum AxesHandle<'a> {
    Owned(Axes),
    Borrowed(&'a mut Axes),
}

impl<'a> AxesHandle<'a> {
    /// Use `ax` when given, otherwise create a new axes from `config`.
    pub fn acquire(ax: Option<&'a mut Axes>, config: &AxesConfig) -> Self {
        match ax {
            Some(ax) => AxesHandle::Borrowed(ax),
            None => AxesHandle::Owned(Axes::new(config.clone())),
        }
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, AxesHandle::Borrowed(_))
    }

    /// The created axes, or `None` when the caller supplied one.
    pub fn into_owned(self) -> Option<Axes> {
        match self {
            AxesHandle::Owned(ax) => Some(ax),
            AxesHandle::Borrowed(_) => None,
        }
    }
}

impl Deref for AxesHandle<'_> {
    type Target = Axes;

    fn deref(&self) -> &Axes {
        match self {
            AxesHandle::Owned(ax) => ax,
            AxesHandle::Borrowed(ax) => &**ax,
        }
    }
}

impl DerefMut for AxesHandle<'_> {
    fn deref_mut(&mut self) -> &mut Axes {
        match self {
            AxesHandle::Owned(ax) => ax,
            AxesHandle::Borrowed(ax) => &mut **ax,
        }
    }
}

/// Render `Re(val)` as a diverging heatmap.
///
/// `vmax` defaults to `max(|val|)` and `vmin` to `-vmax`. When `outline`
/// is given, its zero contour is drawn in a dark color.
pub fn render_real<'a, S, T>(
    val: &ArrayBase<S, Ix2>,
    outline: Option<ArrayView2<'_, f64>>,
    ax: Option<&'a mut Axes>,
    opts: &RealPartOptions,
) -> FieldResult<AxesHandle<'a>>
where
    S: Data<Elem = T>,
    T: FieldValue,
{
    let mut handle = AxesHandle::acquire(ax, &opts.figure);

    let bounds = real_part_bounds(val, opts.vmax, opts.vmin)?;
    tracing::debug!(
        shape = %Shape::of(val),
        vmin = bounds.vmin,
        vmax = bounds.vmax,
        "Rendering real part"
    );

    let image = val.t().mapv(|v| v.real());
    let id = handle.imshow(image, bounds, &opts.cmap, Origin::Lower)?;

    if let Some(outline) = outline {
        handle.contour(
            outline.t(),
            &[REAL_OUTLINE_LEVEL],
            DARK_OUTLINE,
            opts.outline_alpha,
            Origin::Lower,
        )?;
    }

    finish(&mut handle, id, opts.title.as_deref(), opts.cbar)?;
    Ok(handle)
}

/// Render `|val|` as a sequential heatmap over `[0, vmax]`.
///
/// `vmax` defaults to `max(|val|)`. When `outline` is given, a light contour
/// is drawn at `opts.outline_level`, or at the midpoint of the outline's
/// range when no level is set.
pub fn render_magnitude<'a, S, T>(
    val: &ArrayBase<S, Ix2>,
    outline: Option<ArrayView2<'_, f64>>,
    ax: Option<&'a mut Axes>,
    opts: &MagnitudeOptions,
) -> FieldResult<AxesHandle<'a>>
where
    S: Data<Elem = T>,
    T: FieldValue,
{
    let mut handle = AxesHandle::acquire(ax, &opts.figure);

    let bounds = magnitude_bounds(val, opts.vmax)?;
    tracing::debug!(
        shape = %Shape::of(val),
        vmax = bounds.vmax,
        "Rendering magnitude"
    );

    let image = val.t().mapv(|v| v.magnitude());
    let id = handle.imshow(image, bounds, &opts.cmap, Origin::Lower)?;

    if let Some(outline) = outline {
        let level = outline_level(outline, opts.outline_level)?;
        tracing::debug!(level, explicit = opts.outline_level.is_some(), "Outline level");
        handle.contour(
            outline.t(),
            &[level],
            LIGHT_OUTLINE,
            opts.outline_alpha,
            Origin::Lower,
        )?;
    }

    finish(&mut handle, id, opts.title.as_deref(), opts.cbar)?;
    Ok(handle)
}

/// Shared tail of both renderers: labels, title and colorbar.
pub(crate) fn finish(
    ax: &mut Axes,
    image: ImageId,
    title: Option<&str>,
    cbar: bool,
) -> FieldResult<()> {
    ax.set_xlabel("x");
    ax.set_ylabel("y");
    if let Some(title) = title {
        ax.set_title(title);
    }
    if cbar {
        ax.colorbar(image, Orientation::Horizontal)?;
    }
    Ok(())
}

/// Real part of `val` multiplied by `exp(i * phase)`, transposed for display.
pub(crate) fn rotated_real_image<S, T>(val: &ArrayBase<S, Ix2>, phase: f64) -> Array2<f64>
where
    S: Data<Elem = T>,
    T: FieldValue,
{
    val.t().mapv(|v| v.rotated_real(phase))
}
