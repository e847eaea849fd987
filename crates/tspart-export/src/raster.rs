//! Raster rendering with `tiny-skia`.
//!
//! The canvas keeps the source aspect ratio and is normalised so that
//! `width + height == canvas_extent`. Points are scaled from image
//! pixels to canvas pixels; `tiny-skia` handles sub-pixel positioning
//! and anti-aliasing.

use std::io::Cursor;

use image::buffer::ConvertBuffer;
use image::{ImageFormat, Rgba, RgbImage, RgbaImage};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};
use tspart_pipeline::{Dimensions, Point, Polyline};

use crate::ExportError;

/// Options for raster rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Sum of output width and height in pixels.
    pub canvas_extent: u32,
    /// Stroke width of the tour line in canvas pixels.
    pub line_width: f64,
    /// Dot radius for scatter plots in canvas pixels.
    pub point_radius: f64,
}

impl RenderOptions {
    /// Default canvas extent (a 500x500 canvas for a square image).
    pub const DEFAULT_CANVAS_EXTENT: u32 = 1000;

    /// Default tour stroke width.
    pub const DEFAULT_LINE_WIDTH: f64 = 1.0;

    /// Default scatter dot radius.
    pub const DEFAULT_POINT_RADIUS: f64 = 0.5;

    fn validate(&self) -> Result<(), ExportError> {
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(ExportError::Options(format!(
                "line width must be positive, got {}",
                self.line_width
            )));
        }
        if !(self.point_radius.is_finite() && self.point_radius > 0.0) {
            return Err(ExportError::Options(format!(
                "point radius must be positive, got {}",
                self.point_radius
            )));
        }
        Ok(())
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            canvas_extent: Self::DEFAULT_CANVAS_EXTENT,
            line_width: Self::DEFAULT_LINE_WIDTH,
            point_radius: Self::DEFAULT_POINT_RADIUS,
        }
    }
}

/// Output canvas size and the scale from image to canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Horizontal scale from image pixels to canvas pixels.
    pub scale_x: f64,
    /// Vertical scale from image pixels to canvas pixels.
    pub scale_y: f64,
}

impl Canvas {
    /// Fit a canvas of `extent` total pixels to `dimensions`.
    ///
    /// Each side is rounded to the nearest pixel and is at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Canvas`] if the source has zero area or
    /// `extent` is below 2.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn fit(dimensions: Dimensions, extent: u32) -> Result<Self, ExportError> {
        if dimensions.width == 0 || dimensions.height == 0 {
            return Err(ExportError::Canvas(format!(
                "source image is {}x{}",
                dimensions.width, dimensions.height
            )));
        }
        if extent < 2 {
            return Err(ExportError::Canvas(format!(
                "canvas extent must be at least 2, got {extent}"
            )));
        }

        let w = f64::from(dimensions.width);
        let h = f64::from(dimensions.height);
        let total = w + h;
        let extent = f64::from(extent);
        let width = (extent * w / total).round().max(1.0) as u32;
        let height = (extent * h / total).round().max(1.0) as u32;

        Ok(Self {
            width,
            height,
            scale_x: f64::from(width) / w,
            scale_y: f64::from(height) / h,
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn project(&self, p: Point) -> (f32, f32) {
        ((p.x * self.scale_x) as f32, (p.y * self.scale_y) as f32)
    }

    fn blank_pixmap(&self) -> Result<Pixmap, ExportError> {
        let mut pixmap = Pixmap::new(self.width, self.height).ok_or_else(|| {
            ExportError::Canvas(format!("cannot allocate {}x{}", self.width, self.height))
        })?;
        pixmap.fill(Color::WHITE);
        Ok(pixmap)
    }
}

/// Black, fully opaque, anti-aliased paint.
fn ink() -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = true;
    paint
}

/// Render the tour as a black line on a white canvas.
///
/// A polyline with fewer than two points yields a blank canvas.
///
/// # Errors
///
/// Returns [`ExportError::Canvas`] if the canvas cannot be created and
/// [`ExportError::Options`] if `options` are out of range.
#[allow(clippy::cast_possible_truncation)]
pub fn render_line(
    polyline: &Polyline,
    dimensions: Dimensions,
    options: &RenderOptions,
) -> Result<RgbaImage, ExportError> {
    options.validate()?;
    let canvas = Canvas::fit(dimensions, options.canvas_extent)?;
    let mut pixmap = canvas.blank_pixmap()?;

    let points = polyline.points();
    let mut pb = PathBuilder::new();
    if let Some(&first) = points.first() {
        let (x, y) = canvas.project(first);
        pb.move_to(x, y);
        for &p in &points[1..] {
            let (x, y) = canvas.project(p);
            pb.line_to(x, y);
        }
    }

    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: options.line_width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &ink(), &stroke, Transform::identity(), None);
    }

    log::debug!(
        "render.line: canvas={}x{} points={}",
        canvas.width,
        canvas.height,
        points.len()
    );
    Ok(pixmap_to_rgba(&pixmap))
}

/// Render each point as a black dot on a white canvas.
///
/// # Errors
///
/// Returns [`ExportError::Canvas`] if the canvas cannot be created and
/// [`ExportError::Options`] if `options` are out of range.
#[allow(clippy::cast_possible_truncation)]
pub fn render_scatter(
    points: &[Point],
    dimensions: Dimensions,
    options: &RenderOptions,
) -> Result<RgbaImage, ExportError> {
    options.validate()?;
    let canvas = Canvas::fit(dimensions, options.canvas_extent)?;
    let mut pixmap = canvas.blank_pixmap()?;

    let radius = options.point_radius as f32;
    let mut pb = PathBuilder::new();
    for &p in points {
        let (x, y) = canvas.project(p);
        pb.push_circle(x, y, radius);
    }

    if let Some(path) = pb.finish() {
        pixmap.fill_path(
            &path,
            &ink(),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    log::debug!(
        "render.scatter: canvas={}x{} points={}",
        canvas.width,
        canvas.height,
        points.len()
    );
    Ok(pixmap_to_rgba(&pixmap))
}

/// Convert a pixmap (premultiplied RGBA) to an `RgbaImage` (straight RGBA).
#[allow(clippy::cast_possible_truncation)]
fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let data = pixmap.data();
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (i, pixel) in img.pixels_mut().enumerate() {
        let off = i * 4;
        let a = data[off + 3];
        if a == 0 {
            *pixel = Rgba([0, 0, 0, 0]);
        } else {
            let r = u16::from(data[off]) * 255 / u16::from(a);
            let g = u16::from(data[off + 1]) * 255 / u16::from(a);
            let b = u16::from(data[off + 2]) * 255 / u16::from(a);
            *pixel = Rgba([r as u8, g as u8, b as u8, a]);
        }
    }
    img
}

/// Encode a rendered image in `format`.
///
/// The alpha channel is dropped first; rendered canvases are opaque and
/// formats such as JPEG cannot store it.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the format is unsupported or
/// encoding fails.
pub fn encode(img: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, ExportError> {
    let rgb: RgbImage = img.convert();
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), format)?;
    Ok(buf)
}
