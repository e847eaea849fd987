//! tspart-pipeline: Raster image to TSP line art (sans-IO).
//!
//! Converts a raster image into a single tour through its dark pixels:
//! decode -> grayscale -> threshold -> ink pixels -> seeded sample ->
//! greedy tour.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory byte
//! slices and returns structured data. Rendering lives in
//! `tspart-export` and filesystem access in the `tspart` binary.

pub mod diagnostics;
pub mod grayscale;
pub mod sample;
pub mod threshold;
pub mod types;

pub use diagnostics::{Clock, PipelineDiagnostics, process_with_diagnostics};
pub use tspart_tour::{Point, Polyline, Tour, TourConfig};
pub use types::{Dimensions, PipelineConfig, PipelineError, ProcessResult};

/// Run the full pipeline.
///
/// # Pipeline steps
///
/// 1. Decode image and convert to grayscale
/// 2. Threshold to black and white
/// 3. Collect ink pixels as points
/// 4. Draw a seeded sample of at most `sample_size` points
/// 5. Build a tour with the greedy edge heuristic
/// 6. Lay the samples out in tour order
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::NoForeground`] if no pixel is dark enough.
/// Returns [`PipelineError::Tour`] if tour construction fails.
pub fn process(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    config.validate()?;

    let gray = grayscale::decode_and_grayscale(image_bytes)?;
    let dimensions = Dimensions {
        width: gray.width(),
        height: gray.height(),
    };

    let binary = threshold::threshold(&gray, config.threshold);
    let foreground = threshold::foreground_points(&binary);
    if foreground.is_empty() {
        return Err(PipelineError::NoForeground {
            threshold: config.threshold,
        });
    }

    let samples = sample::sample(&foreground, config.sample_size, config.seed);
    let tour = tspart_tour::build_tour_with(&samples, &config.tour)?;
    let polyline = tour.to_polyline(&samples);

    log::info!(
        "process: width={} height={} ink={} samples={} length={:.1}",
        dimensions.width,
        dimensions.height,
        foreground.len(),
        samples.len(),
        tour.length(&samples)
    );

    Ok(ProcessResult {
        dimensions,
        samples,
        tour,
        polyline,
    })
}
