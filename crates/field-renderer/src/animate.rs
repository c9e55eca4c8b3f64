//! Phase animation of time-harmonic fields.
//!
//! A complex field `val` describes the real signal `Re(val * exp(i*wt))`.
//! Frame `k` of `n` shows that signal at phase `2*pi*k/n`. The color scale
//! is fixed across frames at `[-vmax, vmax]`.

use std::f64::consts::TAU;

use field_common::{FieldError, FieldResult, FieldValue};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use ndarray::{ArrayBase, ArrayView2, Data, Ix2};

use crate::axes::{Axes, Origin};
use crate::bounds::real_part_bounds;
use crate::options::AnimationOptions;
use crate::plot::{finish, rotated_real_image, DARK_OUTLINE, REAL_OUTLINE_LEVEL};

/// Phase of frame `k` out of `n`.
pub fn frame_phase(k: usize, n: usize) -> f64 {
    TAU * k as f64 / n as f64
}

/// Render one full phase cycle as `opts.frames` axes.
///
/// Each frame starts as a clone of `template` when given (keeping its layout
/// and font), otherwise as a new axes built from `opts.figure`.
pub fn phase_frames<S, T>(
    val: &ArrayBase<S, Ix2>,
    outline: Option<ArrayView2<'_, f64>>,
    template: Option<&Axes>,
    opts: &AnimationOptions,
) -> FieldResult<Vec<Axes>>
where
    S: Data<Elem = T>,
    T: FieldValue,
{
    if opts.frames == 0 {
        return Err(FieldError::invalid("frames", "must be at least 1"));
    }

    let bounds = real_part_bounds(val, opts.vmax, None)?;
    tracing::info!(
        frames = opts.frames,
        vmax = bounds.vmax,
        "Rendering phase animation"
    );

    (0..opts.frames)
        .map(|k| -> FieldResult<Axes> {
            let mut ax = match template {
                Some(template) => template.clone(),
                None => Axes::new(opts.figure.clone()),
            };

            let image = rotated_real_image(val, frame_phase(k, opts.frames));
            let id = ax.imshow(image, bounds, &opts.cmap, Origin::Lower)?;

            if let Some(outline) = outline {
                ax.contour(
                    outline.t(),
                    &[REAL_OUTLINE_LEVEL],
                    DARK_OUTLINE,
                    opts.outline_alpha,
                    Origin::Lower,
                )?;
            }

            finish(&mut ax, id, opts.title.as_deref(), opts.cbar)?;
            Ok(ax)
        })
        .collect()
}

/// Encode rendered frames as a looping GIF held in memory.
pub fn encode_gif(frames: &[Axes], frame_delay_ms: u32) -> FieldResult<Vec<u8>> {
    if frames.is_empty() {
        return Err(FieldError::invalid("frames", "cannot encode an empty animation"));
    }

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| FieldError::Encode(format!("GIF: {}", e)))?;

        for (k, ax) in frames.iter().enumerate() {
            let img = ax.render()?;
            let frame = Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(frame_delay_ms, 1));
            encoder
                .encode_frame(frame)
                .map_err(|e| FieldError::Encode(format!("GIF frame {}: {}", k, e)))?;
        }
    }

    tracing::debug!(frames = frames.len(), bytes = buf.len(), "Encoded GIF");
    Ok(buf)
}

/// Render and encode a phase animation in one step.
pub fn animate_gif<S, T>(
    val: &ArrayBase<S, Ix2>,
    outline: Option<ArrayView2<'_, f64>>,
    template: Option<&Axes>,
    opts: &AnimationOptions,
) -> FieldResult<Vec<u8>>
where
    S: Data<Elem = T>,
    T: FieldValue,
{
    let frames = phase_frames(val, outline, template, opts)?;
    encode_gif(&frames, opts.frame_delay_ms)
}
