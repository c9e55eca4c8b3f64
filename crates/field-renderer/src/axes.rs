//! Raster plotting axes.
//!
//! `Axes` is the draw target the field renderers write into. It records
//! image layers, contour overlays, labels and an optional colorbar, and
//! rasterizes them on demand with tiny-skia (geometry) and imageproc (text).
//!
//! Image layers keep equal aspect: every data cell is drawn as a square and
//! the plot area shrinks to fit the grid.

use std::fmt;

use field_common::{FieldError, FieldResult, Shape};
use image::{Rgba, RgbaImage};
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use rusttype::Font;
use tiny_skia::{
    IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

use crate::bounds::ColorBounds;
use crate::colormap::{normalize, Color, ColorLut, Colormap};
use crate::contour::{generate_contours, generate_levels, Contour};
use crate::options::AxesConfig;
use crate::png;
use crate::text::{self, format_tick, HAlign, VAlign};

/// Length of tick marks in pixels.
const TICK_LENGTH: f32 = 5.0;

/// Padding between a tick mark and its label.
const TICK_PAD: i32 = 3;

/// Gap between the plot and a vertical colorbar.
const VERTICAL_CBAR_PAD: f32 = 10.0;

/// Where row 0 of an image is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Row 0 at the bottom; rows grow upward.
    Lower,
    /// Row 0 at the top; rows grow downward.
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Handle to an image layer of an [`Axes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageId(usize);

/// A scalar grid drawn through a colormap.
#[derive(Debug, Clone)]
pub struct ImageLayer {
    data: Array2<f64>,
    bounds: ColorBounds,
    cmap: Colormap,
    lut: ColorLut,
    origin: Origin,
}

impl ImageLayer {
    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn shape(&self) -> Shape {
        Shape::of(&self.data)
    }

    pub fn bounds(&self) -> ColorBounds {
        self.bounds
    }

    pub fn cmap(&self) -> &Colormap {
        &self.cmap
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }
}

/// Contour lines of a scalar grid.
#[derive(Debug, Clone)]
pub struct ContourLayer {
    shape: Shape,
    levels: Vec<f64>,
    contours: Vec<Contour>,
    color: Color,
    alpha: f64,
    origin: Origin,
}

impl ContourLayer {
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// A colorbar attached to an image layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorbarSpec {
    pub image: ImageId,
    pub orientation: Orientation,
}

/// A single plot panel.
#[derive(Clone)]
pub struct Axes {
    config: AxesConfig,
    images: Vec<ImageLayer>,
    contours: Vec<ContourLayer>,
    xlabel: Option<String>,
    ylabel: Option<String>,
    title: Option<String>,
    colorbar: Option<ColorbarSpec>,
    font: Option<Font<'static>>,
}

impl fmt::Debug for Axes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Axes")
            .field("config", &self.config)
            .field("images", &self.images.len())
            .field("contours", &self.contours.len())
            .field("xlabel", &self.xlabel)
            .field("ylabel", &self.ylabel)
            .field("title", &self.title)
            .field("colorbar", &self.colorbar)
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl Default for Axes {
    fn default() -> Self {
        Self::new(AxesConfig::default())
    }
}

impl Axes {
    pub fn new(config: AxesConfig) -> Self {
        Self {
            config,
            images: Vec::new(),
            contours: Vec::new(),
            xlabel: None,
            ylabel: None,
            title: None,
            colorbar: None,
            font: None,
        }
    }

    pub fn config(&self) -> &AxesConfig {
        &self.config
    }

    /// Use the given TrueType font for all text.
    pub fn set_font(&mut self, bytes: Vec<u8>) -> FieldResult<()> {
        self.font = Some(text::load_font(bytes)?);
        Ok(())
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Add an image layer. `data` is drawn with rows vertical and columns
    /// horizontal, row 0 placed according to `origin`.
    pub fn imshow(
        &mut self,
        data: Array2<f64>,
        bounds: ColorBounds,
        cmap: &Colormap,
        origin: Origin,
    ) -> FieldResult<ImageId> {
        if data.is_empty() {
            return Err(FieldError::EmptyInput("image extent".to_string()));
        }
        if !bounds.vmin.is_finite() || !bounds.vmax.is_finite() {
            return Err(FieldError::invalid(
                "bounds",
                format!("color bounds must be finite, got [{}, {}]", bounds.vmin, bounds.vmax),
            ));
        }

        tracing::debug!(
            shape = %Shape::of(&data),
            vmin = bounds.vmin,
            vmax = bounds.vmax,
            cmap = %cmap,
            "imshow"
        );

        self.images.push(ImageLayer {
            data,
            bounds,
            cmap: cmap.clone(),
            lut: cmap.lut(),
            origin,
        });
        Ok(ImageId(self.images.len() - 1))
    }

    /// Add contour lines of `data` at `levels`.
    ///
    /// When the axes already holds an image, `data` must have the same shape
    /// as the most recent one.
    pub fn contour(
        &mut self,
        data: ArrayView2<'_, f64>,
        levels: &[f64],
        color: Color,
        alpha: f64,
        origin: Origin,
    ) -> FieldResult<()> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(FieldError::invalid(
                "alpha",
                format!("must be within [0, 1], got {}", alpha),
            ));
        }
        let shape = Shape::of(&data);
        if shape.is_empty() {
            return Err(FieldError::EmptyInput("contour".to_string()));
        }
        if let Some(image) = self.images.last() {
            if image.shape() != shape {
                return Err(FieldError::ShapeMismatch {
                    expected: image.shape(),
                    actual: shape,
                });
            }
        }

        self.config.validate()?;

        let contours = generate_contours(data, levels, self.config.smoothing_passes);
        self.contours.push(ContourLayer {
            shape,
            levels: levels.to_vec(),
            contours,
            color,
            alpha,
            origin,
        });
        Ok(())
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.xlabel = Some(label.into());
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.ylabel = Some(label.into());
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Attach a colorbar for `image`, replacing any previous colorbar.
    pub fn colorbar(&mut self, image: ImageId, orientation: Orientation) -> FieldResult<()> {
        if image.0 >= self.images.len() {
            return Err(FieldError::invalid("image", "no such image layer"));
        }
        self.colorbar = Some(ColorbarSpec { image, orientation });
        Ok(())
    }

    pub fn images(&self) -> &[ImageLayer] {
        &self.images
    }

    pub fn image(&self, id: ImageId) -> Option<&ImageLayer> {
        self.images.get(id.0)
    }

    pub fn contour_layers(&self) -> &[ContourLayer] {
        &self.contours
    }

    pub fn xlabel(&self) -> Option<&str> {
        self.xlabel.as_deref()
    }

    pub fn ylabel(&self) -> Option<&str> {
        self.ylabel.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn colorbar_spec(&self) -> Option<&ColorbarSpec> {
        self.colorbar.as_ref()
    }

    /// Rasterize the axes into an RGBA image of the configured size.
    pub fn render(&self) -> FieldResult<RgbaImage> {
        let (width, height) = (self.config.width, self.config.height);
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            FieldError::Render(format!("cannot allocate {}x{} canvas", width, height))
        })?;

        let bg = self.config.background_color()?;
        pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

        let layout = self.layout()?;
        let mut labels: Vec<Label> = Vec::new();

        for image in &self.images {
            blit_image(&mut pixmap, image, &layout.plot)?;
        }
        for layer in &self.contours {
            self.stroke_contours(&mut pixmap, layer, &layout.plot);
        }

        self.draw_frame(&mut pixmap, &layout.plot);
        self.draw_axis_ticks(&mut pixmap, &layout.plot, &mut labels);

        if let (Some(spec), Some(strip)) = (self.colorbar, layout.colorbar) {
            if let Some(image) = self.images.get(spec.image.0) {
                self.draw_colorbar(&mut pixmap, image, spec.orientation, &strip, &mut labels)?;
            }
        }

        self.collect_labels(&layout.plot, &mut labels);

        let mut img = RgbaImage::new(width, height);
        for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }

        match &self.font {
            Some(font) => {
                for label in &labels {
                    text::draw_label(
                        &mut img,
                        font,
                        &label.text,
                        label.x,
                        label.y,
                        label.size,
                        Rgba([0, 0, 0, 255]),
                        label.align,
                    );
                }
            }
            None if !labels.is_empty() => {
                tracing::debug!(count = labels.len(), "No font set, skipping text");
            }
            None => {}
        }

        Ok(img)
    }

    /// Render and encode as PNG.
    pub fn to_png(&self) -> FieldResult<Vec<u8>> {
        let img = self.render()?;
        png::encode_png(img.as_raw(), img.width() as usize, img.height() as usize)
    }

    /// Grid shape that determines the plot extent.
    fn data_shape(&self) -> Option<Shape> {
        self.images
            .first()
            .map(ImageLayer::shape)
            .or_else(|| self.contours.first().map(|c| c.shape))
    }

    fn layout(&self) -> FieldResult<Layout> {
        let c = &self.config;
        let (w, h) = (c.width as f32, c.height as f32);
        let margin = c.margin as f32;
        let label_area = c.label_area as f32;
        let cbar_space = (c.colorbar_thickness + c.colorbar_gap) as f32;

        let mut left = margin + label_area;
        let mut right = w - margin;
        let mut top = margin;
        let mut bottom = h - margin - label_area;
        if self.title.is_some() {
            top += c.title_area as f32;
        }
        match self.colorbar.map(|spec| spec.orientation) {
            Some(Orientation::Horizontal) => bottom -= cbar_space,
            Some(Orientation::Vertical) => right -= cbar_space + VERTICAL_CBAR_PAD,
            None => {}
        }

        let (avail_w, avail_h) = (right - left, bottom - top);
        if avail_w < 1.0 || avail_h < 1.0 {
            return Err(FieldError::Render(format!(
                "{}x{} figure leaves no room for the plot",
                c.width, c.height
            )));
        }

        // Equal aspect: square cells, centred in the available area
        if let Some(shape) = self.data_shape() {
            let cell = (avail_w / shape.cols as f32).min(avail_h / shape.rows as f32);
            let ext_w = (cell * shape.cols as f32).round().max(1.0);
            let ext_h = (cell * shape.rows as f32).round().max(1.0);
            left = (left + (avail_w - ext_w) / 2.0).round();
            top = (top + (avail_h - ext_h) / 2.0).round();
            right = left + ext_w;
            bottom = top + ext_h;
        }

        let plot = Extent {
            left,
            top,
            width: right - left,
            height: bottom - top,
        };

        let colorbar = self.colorbar.map(|spec| match spec.orientation {
            Orientation::Horizontal => Extent {
                left: plot.left,
                top: plot.bottom() + label_area,
                width: plot.width,
                height: c.colorbar_thickness as f32,
            },
            Orientation::Vertical => Extent {
                left: plot.right() + VERTICAL_CBAR_PAD,
                top: plot.top,
                width: c.colorbar_thickness as f32,
                height: plot.height,
            },
        });

        Ok(Layout { plot, colorbar })
    }

    fn stroke_contours(&self, pixmap: &mut Pixmap, layer: &ContourLayer, plot: &Extent) {
        let cell_w = plot.width / layer.shape.cols as f32;
        let cell_h = plot.height / layer.shape.rows as f32;
        let to_screen = |x: f64, y: f64| -> (f32, f32) {
            let sx = plot.left + (x as f32 + 0.5) * cell_w;
            let sy = match layer.origin {
                Origin::Lower => plot.bottom() - (y as f32 + 0.5) * cell_h,
                Origin::Upper => plot.top + (y as f32 + 0.5) * cell_h,
            };
            (sx, sy)
        };

        let paint = solid_paint(layer.color.with_alpha(layer.alpha));
        let stroke = Stroke {
            width: self.config.line_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        for contour in &layer.contours {
            let Some((first, rest)) = contour.points.split_first() else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }

            let mut pb = PathBuilder::new();
            let (x0, y0) = to_screen(first.x, first.y);
            pb.move_to(x0, y0);
            for p in rest {
                let (x, y) = to_screen(p.x, p.y);
                pb.line_to(x, y);
            }
            if contour.closed {
                pb.close();
            }
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
    }

    fn draw_frame(&self, pixmap: &mut Pixmap, plot: &Extent) {
        stroke_rect(pixmap, plot);
    }

    fn draw_axis_ticks(&self, pixmap: &mut Pixmap, plot: &Extent, labels: &mut Vec<Label>) {
        let Some(shape) = self.data_shape() else {
            return;
        };
        let size = self.config.font_size;
        let cell_w = plot.width / shape.cols as f32;
        let cell_h = plot.height / shape.rows as f32;
        let origin = self
            .images
            .first()
            .map(|i| i.origin)
            .or_else(|| self.contours.first().map(|c| c.origin))
            .unwrap_or(Origin::Lower);

        let (xticks, xstep) = index_ticks(shape.cols, self.config.tick_count);
        for x in xticks {
            let sx = plot.left + (x as f32 + 0.5) * cell_w;
            stroke_line(pixmap, (sx, plot.bottom()), (sx, plot.bottom() + TICK_LENGTH));
            labels.push(Label {
                text: format_tick(x, xstep),
                x: sx.round() as i32,
                y: (plot.bottom() + TICK_LENGTH) as i32 + TICK_PAD,
                size,
                align: (HAlign::Center, VAlign::Top),
            });
        }

        let (yticks, ystep) = index_ticks(shape.rows, self.config.tick_count);
        for y in yticks {
            let sy = match origin {
                Origin::Lower => plot.bottom() - (y as f32 + 0.5) * cell_h,
                Origin::Upper => plot.top + (y as f32 + 0.5) * cell_h,
            };
            stroke_line(pixmap, (plot.left - TICK_LENGTH, sy), (plot.left, sy));
            labels.push(Label {
                text: format_tick(y, ystep),
                x: (plot.left - TICK_LENGTH) as i32 - TICK_PAD,
                y: sy.round() as i32,
                size,
                align: (HAlign::Right, VAlign::Middle),
            });
        }
    }

    fn draw_colorbar(
        &self,
        pixmap: &mut Pixmap,
        image: &ImageLayer,
        orientation: Orientation,
        strip: &Extent,
        labels: &mut Vec<Label>,
    ) -> FieldResult<()> {
        let ColorBounds { vmin, vmax } = image.bounds;
        let (w, h) = (strip.width.round() as u32, strip.height.round() as u32);
        if w == 0 || h == 0 {
            return Ok(());
        }

        // Colors vary along the long axis only
        let steps = match orientation {
            Orientation::Horizontal => w,
            Orientation::Vertical => h,
        };
        let ramp: Vec<[u8; 4]> = (0..steps)
            .map(|i| {
                let t = if steps > 1 { i as f64 / (steps - 1) as f64 } else { 0.0 };
                let t = match orientation {
                    Orientation::Horizontal => t,
                    Orientation::Vertical => 1.0 - t,
                };
                let t = if vmax > vmin { t } else { 0.0 };
                image.lut.at(t).to_premultiplied()
            })
            .collect();

        let mut buf = Vec::with_capacity((w * h * 4) as usize);
        for row in 0..h {
            for col in 0..w {
                let i = match orientation {
                    Orientation::Horizontal => col,
                    Orientation::Vertical => row,
                };
                buf.extend_from_slice(&ramp[i as usize]);
            }
        }
        draw_buffer(pixmap, buf, w, h, strip.left, strip.top)?;
        stroke_rect(pixmap, strip);

        if !(vmax > vmin) {
            return Ok(());
        }
        let size = self.config.font_size;
        let (ticks, step) = nice_ticks(vmin, vmax, self.config.tick_count);
        for v in ticks {
            let t = normalize(v, vmin, vmax) as f32;
            match orientation {
                Orientation::Horizontal => {
                    let sx = strip.left + t * strip.width;
                    stroke_line(pixmap, (sx, strip.bottom()), (sx, strip.bottom() + TICK_LENGTH));
                    labels.push(Label {
                        text: format_tick(v, step),
                        x: sx.round() as i32,
                        y: (strip.bottom() + TICK_LENGTH) as i32 + TICK_PAD,
                        size,
                        align: (HAlign::Center, VAlign::Top),
                    });
                }
                Orientation::Vertical => {
                    let sy = strip.bottom() - t * strip.height;
                    stroke_line(pixmap, (strip.right(), sy), (strip.right() + TICK_LENGTH, sy));
                    labels.push(Label {
                        text: format_tick(v, step),
                        x: (strip.right() + TICK_LENGTH) as i32 + TICK_PAD,
                        y: sy.round() as i32,
                        size,
                        align: (HAlign::Left, VAlign::Middle),
                    });
                }
            }
        }
        Ok(())
    }

    fn collect_labels(&self, plot: &Extent, labels: &mut Vec<Label>) {
        let size = self.config.font_size;
        let centre_x = (plot.left + plot.width / 2.0).round() as i32;

        if let Some(xlabel) = &self.xlabel {
            labels.push(Label {
                text: xlabel.clone(),
                x: centre_x,
                y: (plot.bottom() + TICK_LENGTH + size) as i32 + 2 * TICK_PAD,
                size,
                align: (HAlign::Center, VAlign::Top),
            });
        }
        if let Some(ylabel) = &self.ylabel {
            labels.push(Label {
                text: ylabel.clone(),
                x: self.config.margin as i32,
                y: (plot.top + plot.height / 2.0).round() as i32,
                size,
                align: (HAlign::Left, VAlign::Middle),
            });
        }
        if let Some(title) = &self.title {
            labels.push(Label {
                text: title.clone(),
                x: centre_x,
                y: plot.top as i32 - 2 * TICK_PAD,
                size: size * 1.2,
                align: (HAlign::Center, VAlign::Bottom),
            });
        }
    }
}

/// Pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy)]
struct Extent {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl Extent {
    fn right(&self) -> f32 {
        self.left + self.width
    }

    fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

struct Layout {
    plot: Extent,
    colorbar: Option<Extent>,
}

struct Label {
    text: String,
    x: i32,
    y: i32,
    size: f32,
    align: (HAlign, VAlign),
}

/// Tick values covering `[lo, hi]` at a "nice" step, and that step.
///
/// When the span itself overflows, the step is computed from the halved
/// bounds so it stays finite.
pub fn nice_ticks(lo: f64, hi: f64, count: usize) -> (Vec<f64>, f64) {
    if !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
        return (vec![lo], 1.0);
    }
    let intervals = count.saturating_sub(1).max(1) as f64;
    let span = hi - lo;
    let step = if span.is_finite() {
        nice_step(span / intervals)
    } else {
        nice_step((hi / 2.0 - lo / 2.0) / intervals * 2.0)
    };
    (generate_levels(lo, hi, step), step)
}

/// Ticks along a grid index axis of `len` cells; steps are whole cells.
fn index_ticks(len: usize, count: usize) -> (Vec<f64>, f64) {
    let last = len.saturating_sub(1) as f64;
    let (ticks, step) = nice_ticks(0.0, last, count);
    if step < 1.0 {
        (generate_levels(0.0, last, 1.0), 1.0)
    } else {
        (ticks, step)
    }
}

/// Round `raw` up to 1, 2, 2.5 or 5 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if !(raw > 0.0) || !raw.is_finite() {
        return 1.0;
    }
    let exp = raw.log10().floor();
    let base = 10f64.powf(exp);
    let fraction = raw / base;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 2.5 {
        2.5
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn stroke_line(pixmap: &mut Pixmap, from: (f32, f32), to: (f32, f32)) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &solid_paint(Color::BLACK), &stroke, Transform::identity(), None);
    }
}

fn stroke_rect(pixmap: &mut Pixmap, extent: &Extent) {
    if let Some(rect) = Rect::from_xywh(extent.left, extent.top, extent.width, extent.height) {
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &solid_paint(Color::BLACK), &stroke, Transform::identity(), None);
    }
}

/// Copy premultiplied RGBA `buf` onto the canvas at `(left, top)`.
fn draw_buffer(
    pixmap: &mut Pixmap,
    buf: Vec<u8>,
    width: u32,
    height: u32,
    left: f32,
    top: f32,
) -> FieldResult<()> {
    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| FieldError::Render(format!("invalid layer size {}x{}", width, height)))?;
    let layer = Pixmap::from_vec(buf, size)
        .ok_or_else(|| FieldError::Render("layer buffer does not match its size".into()))?;
    pixmap.draw_pixmap(
        left.round() as i32,
        top.round() as i32,
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(())
}

/// Nearest-neighbour resample of an image layer onto the plot extent.
fn blit_image(pixmap: &mut Pixmap, image: &ImageLayer, plot: &Extent) -> FieldResult<()> {
    let (w, h) = (plot.width.round() as u32, plot.height.round() as u32);
    if w == 0 || h == 0 {
        return Ok(());
    }
    let (rows, cols) = image.data.dim();
    let ColorBounds { vmin, vmax } = image.bounds;

    let mut buf = vec![0u8; (w * h * 4) as usize];
    buf.par_chunks_mut(w as usize * 4)
        .enumerate()
        .for_each(|(py, line)| {
            let from_top = ((py as f32 + 0.5) / h as f32 * rows as f32) as usize;
            let from_top = from_top.min(rows - 1);
            let row = match image.origin {
                Origin::Lower => rows - 1 - from_top,
                Origin::Upper => from_top,
            };
            for (px, pixel) in line.chunks_exact_mut(4).enumerate() {
                let col = (((px as f32 + 0.5) / w as f32 * cols as f32) as usize).min(cols - 1);
                let value = image.data[[row, col]];
                pixel.copy_from_slice(&image.lut.map_premultiplied(value, vmin, vmax));
            }
        });

    draw_buffer(pixmap, buf, w, h, plot.left, plot.top)
}
