//! Black/white conversion and ink pixel extraction.

use image::GrayImage;
use imageproc::contrast::ThresholdType;
use tspart_tour::Point;

/// Luma value of an ink pixel in a thresholded image.
pub const INK: u8 = 0;

/// Luma value of a paper pixel in a thresholded image.
pub const PAPER: u8 = 255;

/// Reduce a grayscale image to pure black and white.
///
/// Pixels with luma strictly greater than `level` become [`PAPER`]; the
/// rest become [`INK`]. No dithering is applied.
#[must_use]
pub fn threshold(gray: &GrayImage, level: u8) -> GrayImage {
    imageproc::contrast::threshold(gray, level, ThresholdType::Binary)
}

/// Collect every ink pixel as a point, in row-major order.
///
/// A pixel at column `c`, row `r` becomes `Point { x: c, y: r }`.
#[must_use]
pub fn foreground_points(binary: &GrayImage) -> Vec<Point> {
    let points: Vec<Point> = binary
        .enumerate_pixels()
        .filter(|(_, _, pixel)| pixel.0[0] == INK)
        .map(|(col, row, _)| Point::new(f64::from(col), f64::from(row)))
        .collect();
    log::debug!(
        "foreground: ink={} total={}",
        points.len(),
        u64::from(binary.width()) * u64::from(binary.height())
    );
    points
}
