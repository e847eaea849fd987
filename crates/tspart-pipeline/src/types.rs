//! Configuration, result, and error types for the pipeline.

use serde::{Deserialize, Serialize};
use tspart_tour::{CandidateSet, Point, Polyline, Tour, TourConfig, TourError};

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total pixel count.
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Configuration for [`process`](crate::process).
///
/// All fields have defaults; a JSON document may set any subset of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Luma level separating ink from paper. Pixels brighter than this
    /// are paper; the rest are ink.
    pub threshold: u8,

    /// Maximum number of ink pixels sampled as tour points.
    ///
    /// Must be at least 1. Images with fewer ink pixels keep all of them.
    pub sample_size: usize,

    /// Seed for point sampling. The same seed and image always yield the
    /// same samples.
    pub seed: u64,

    /// Tour construction options.
    pub tour: TourConfig,
}

impl PipelineConfig {
    /// Default luma threshold.
    pub const DEFAULT_THRESHOLD: u8 = 127;

    /// Default number of sampled points.
    pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

    /// Default sampling seed.
    pub const DEFAULT_SEED: u64 = 0;

    /// Check that the configuration can be run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `sample_size` is zero
    /// or the tour uses nearest-neighbour candidates with `k == 0`.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.sample_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "sample_size must be at least 1".to_string(),
            ));
        }
        if let CandidateSet::Nearest { k: 0 } = self.tour.candidates {
            return Err(PipelineError::InvalidConfig(
                "nearest-neighbour candidates need k >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            sample_size: Self::DEFAULT_SAMPLE_SIZE,
            seed: Self::DEFAULT_SEED,
            tour: TourConfig::default(),
        }
    }
}

/// Result of running the full pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Dimensions of the source image in pixels.
    ///
    /// Export serializers use this to set coordinate spaces (SVG
    /// `viewBox`, raster canvas aspect ratio).
    pub dimensions: Dimensions,

    /// Sampled ink pixels, in image coordinates.
    pub samples: Vec<Point>,

    /// Visiting order over `samples`.
    pub tour: Tour,

    /// `samples` in tour order. Closed tours repeat the first point.
    pub polyline: Polyline,
}

/// Errors that can occur while running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// Thresholding left no ink pixels to sample.
    #[error("no foreground pixels at threshold {threshold}")]
    NoForeground {
        /// Threshold that was applied.
        threshold: u8,
    },

    /// Tour construction failed.
    #[error(transparent)]
    Tour(#[from] TourError),
}
