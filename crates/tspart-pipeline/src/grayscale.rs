//! Image decoding and grayscale conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces a
//! single-channel 8-bit luma image for thresholding.

use image::{GrayImage, Luma};

use crate::types::PipelineError;

/// Decode raw image bytes and convert to grayscale.
///
/// Supports whatever formats the `image` crate was built with. Color
/// images are reduced with the ITU-R 601-2 weights (see [`luma`]); alpha
/// is discarded.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_and_grayscale(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    log::debug!(
        "decode: bytes={} width={} height={}",
        bytes.len(),
        img.width(),
        img.height()
    );
    let rgb = img.to_rgb8();
    Ok(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([luma(r, g, b)])
    }))
}

/// ITU-R 601-2 luma in 16-bit fixed point, rounded to nearest.
///
/// `L = 0.299 R + 0.587 G + 0.114 B`. The weights sum to `1 << 16`, so
/// gray input maps to itself. `image`'s own `to_luma8` uses Rec. 709
/// weights, which classify saturated greens and reds differently near
/// the threshold.
#[must_use]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub const fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = r as u32 * 19_595 + g as u32 * 38_470 + b as u32 * 7_471 + 0x8000;
    (weighted >> 16) as u8
}
