//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! Every call to [`process_with_diagnostics`] collects diagnostics
//! alongside the pipeline result. Time is read through the injected
//! [`Clock`], so this module stays free of platform timers.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tspart_tour::{
    DistanceKind, DistanceMatrix, DistanceProvider, Point, PointDistances, Tour, TourConfig,
};

use crate::threshold::INK;
use crate::types::{Dimensions, PipelineConfig, PipelineError, ProcessResult};

/// Source of monotonic time for stage measurements.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// Current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Image decoding and grayscale conversion.
    pub decode: StageDiagnostics,
    /// Black/white thresholding.
    pub threshold: StageDiagnostics,
    /// Ink pixel extraction.
    pub foreground: StageDiagnostics,
    /// Seeded point sampling.
    pub sample: StageDiagnostics,
    /// Candidate edge generation (includes building a distance matrix).
    pub candidates: StageDiagnostics,
    /// Greedy edge selection.
    pub greedy: StageDiagnostics,
    /// Walking accepted edges into a visiting order.
    pub materialize: StageDiagnostics,
    /// 2-opt refinement (only when `refine_passes > 0`).
    pub refine: Option<StageDiagnostics>,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Thresholding metrics.
    Threshold {
        /// Luma level applied.
        level: u8,
        /// Pixels classified as ink.
        ink_pixel_count: u64,
        /// Total pixel count for computing ink density.
        total_pixel_count: u64,
    },
    /// Foreground extraction metrics.
    Foreground {
        /// Number of ink points extracted.
        point_count: usize,
    },
    /// Sampling metrics.
    Sample {
        /// Requested sample size.
        requested: usize,
        /// Points actually drawn.
        drawn: usize,
        /// Seed used for the draw.
        seed: u64,
    },
    /// Candidate generation metrics.
    Candidates {
        /// Candidate strategy, e.g. `Complete` or `Nearest { k: 8 }`.
        strategy: String,
        /// Distance provider used.
        distances: String,
        /// Number of candidate edges produced.
        edge_count: usize,
    },
    /// Greedy selection metrics.
    Greedy {
        /// Edges accepted (including a closing edge).
        accepted_edges: usize,
        /// Sum of accepted edge lengths.
        total_length: f64,
        /// Whether a closing edge was added.
        closed: bool,
    },
    /// Path walk metrics.
    Materialize {
        /// Points in the finished visiting order.
        tour_points: usize,
    },
    /// 2-opt refinement metrics.
    Refine {
        /// Passes executed.
        passes: usize,
        /// Moves applied.
        improvements: usize,
        /// Tour length before refinement.
        length_before: f64,
        /// Tour length after refinement.
        length_after: f64,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Number of ink pixels before sampling.
    pub foreground_count: usize,
    /// Number of points in the tour.
    pub sample_count: usize,
    /// Final tour length in pixels.
    pub tour_length: f64,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages: Vec<(&str, &StageDiagnostics)> = vec![
            ("Decode", &self.decode),
            ("Threshold", &self.threshold),
            ("Foreground", &self.foreground),
            ("Sample", &self.sample),
            ("Candidates", &self.candidates),
            ("Greedy", &self.greedy),
            ("Materialize", &self.materialize),
        ];
        if let Some(ref refine) = self.refine {
            stages.push(("Refine", refine));
        }

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Ink pixels: {}  |  Tour points: {}  |  Tour length: {:.1}px",
            self.summary.foreground_count, self.summary.sample_count, self.summary.tour_length,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Threshold {
            level,
            ink_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *ink_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!("level={level} ink={ink_pixel_count} ({density:.1}%)")
        }
        StageMetrics::Foreground { point_count } => format!("{point_count} pts"),
        StageMetrics::Sample {
            requested,
            drawn,
            seed,
        } => format!("requested={requested} drawn={drawn} seed={seed}"),
        StageMetrics::Candidates {
            strategy,
            distances,
            edge_count,
        } => format!("{strategy} ({distances}) {edge_count} edges"),
        StageMetrics::Greedy {
            accepted_edges,
            total_length,
            closed,
        } => {
            let shape = if *closed { "closed" } else { "open" };
            format!("{accepted_edges} edges, {shape}, length={total_length:.1}")
        }
        StageMetrics::Materialize { tour_points } => format!("{tour_points} pts"),
        StageMetrics::Refine {
            passes,
            improvements,
            length_before,
            length_after,
        } => format!(
            "{passes} passes, {improvements} moves, {length_before:.1}->{length_after:.1}"
        ),
    }
}

/// Count ink pixels in a thresholded image.
fn count_ink_pixels(image: &GrayImage) -> u64 {
    image
        .pixels()
        .map(|p| u64::from(u8::from(p.0[0] == INK)))
        .sum()
}

/// Run `f` and measure how long it took.
fn timed<C: Clock, T>(clock: &C, f: impl FnOnce() -> T) -> (T, Duration) {
    let start = clock.now();
    let value = f();
    (value, clock.elapsed(&start))
}

/// Tour stages measured individually.
struct TourStages {
    tour: Tour,
    candidates: StageDiagnostics,
    greedy: StageDiagnostics,
    materialize: StageDiagnostics,
    refine: Option<StageDiagnostics>,
}

fn tour_stages<C, D>(
    points: &[Point],
    distances: &D,
    config: &TourConfig,
    clock: &C,
) -> Result<TourStages, PipelineError>
where
    C: Clock,
    D: DistanceProvider,
{
    let n = points.len();

    let (candidates, duration) = timed(clock, || {
        tspart_tour::candidate_edges(points, distances, config.candidates)
    });
    let candidates_diag = StageDiagnostics {
        duration,
        metrics: StageMetrics::Candidates {
            strategy: format!("{:?}", config.candidates),
            distances: format!("{:?}", config.distances),
            edge_count: candidates.len(),
        },
    };

    let (accepted, duration) = timed(clock, || {
        tspart_tour::select_edges(n, candidates, config.shape, distances)
    });
    let accepted = accepted?;
    let greedy_diag = StageDiagnostics {
        duration,
        metrics: StageMetrics::Greedy {
            accepted_edges: accepted.len(),
            total_length: accepted.total_length(),
            closed: accepted.is_closed(),
        },
    };

    let (tour, duration) = timed(clock, || tspart_tour::materialize(n, &accepted));
    let tour = tour?;
    let materialize_diag = StageDiagnostics {
        duration,
        metrics: StageMetrics::Materialize {
            tour_points: tour.len(),
        },
    };

    let (tour, refine_diag) = if config.refine_passes > 0 {
        let closed = tour.is_closed();
        let mut order = tour.into_order();
        let (stats, duration) = timed(clock, || {
            tspart_tour::two_opt(points, &mut order, closed, config.refine_passes)
        });
        let diag = StageDiagnostics {
            duration,
            metrics: StageMetrics::Refine {
                passes: stats.passes,
                improvements: stats.improvements,
                length_before: stats.length_before,
                length_after: stats.length_after,
            },
        };
        (Tour::new(order, closed), Some(diag))
    } else {
        (tour, None)
    };

    Ok(TourStages {
        tour,
        candidates: candidates_diag,
        greedy: greedy_diag,
        materialize: materialize_diag,
        refine: refine_diag,
    })
}

/// Run the full pipeline, timing each stage with `clock`.
///
/// Produces the same [`ProcessResult`] as [`process`](crate::process),
/// plus per-stage diagnostics.
///
/// # Errors
///
/// Returns the same errors as [`process`](crate::process).
pub fn process_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(ProcessResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let pipeline_start = clock.now();

    let (gray, duration) = timed(clock, || crate::grayscale::decode_and_grayscale(image_bytes));
    let gray = gray?;
    let dimensions = Dimensions {
        width: gray.width(),
        height: gray.height(),
    };
    let decode = StageDiagnostics {
        duration,
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: dimensions.width,
            height: dimensions.height,
            pixel_count: dimensions.pixel_count(),
        },
    };

    let (binary, duration) = timed(clock, || {
        crate::threshold::threshold(&gray, config.threshold)
    });
    let threshold = StageDiagnostics {
        duration,
        metrics: StageMetrics::Threshold {
            level: config.threshold,
            ink_pixel_count: count_ink_pixels(&binary),
            total_pixel_count: dimensions.pixel_count(),
        },
    };

    let (foreground_points, duration) =
        timed(clock, || crate::threshold::foreground_points(&binary));
    if foreground_points.is_empty() {
        return Err(PipelineError::NoForeground {
            threshold: config.threshold,
        });
    }
    let foreground = StageDiagnostics {
        duration,
        metrics: StageMetrics::Foreground {
            point_count: foreground_points.len(),
        },
    };

    let (samples, duration) = timed(clock, || {
        crate::sample::sample(&foreground_points, config.sample_size, config.seed)
    });
    let sample = StageDiagnostics {
        duration,
        metrics: StageMetrics::Sample {
            requested: config.sample_size,
            drawn: samples.len(),
            seed: config.seed,
        },
    };

    let stages = match config.tour.distances {
        DistanceKind::OnDemand => {
            tour_stages(&samples, &PointDistances::new(&samples), &config.tour, clock)?
        }
        DistanceKind::Matrix => {
            let (matrix, build) = timed(clock, || DistanceMatrix::from_points(&samples));
            let mut stages = tour_stages(&samples, &matrix, &config.tour, clock)?;
            stages.candidates.duration += build;
            stages
        }
    };

    let polyline = stages.tour.to_polyline(&samples);
    let total_duration = clock.elapsed(&pipeline_start);

    let summary = PipelineSummary {
        image_width: dimensions.width,
        image_height: dimensions.height,
        pixel_count: dimensions.pixel_count(),
        foreground_count: foreground_points.len(),
        sample_count: samples.len(),
        tour_length: stages.tour.length(&samples),
    };

    let diagnostics = PipelineDiagnostics {
        decode,
        threshold,
        foreground,
        sample,
        candidates: stages.candidates,
        greedy: stages.greedy,
        materialize: stages.materialize,
        refine: stages.refine,
        total_duration,
        summary,
    };

    let result = ProcessResult {
        dimensions,
        samples,
        tour: stages.tour,
        polyline,
    };

    Ok((result, diagnostics))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Clock that advances one millisecond per reading.
    struct StepClock {
        ticks: Cell<u64>,
    }

    impl StepClock {
        const fn new() -> Self {
            Self {
                ticks: Cell::new(0),
            }
        }
    }

    impl Clock for StepClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now() - since)
        }
    }

    fn checker_png() -> Vec<u8> {
        let img = image::GrayImage::from_fn(8, 8, |x, y| {
            if (x + y) % 2 == 0 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let ms = duration_ms(Duration::from_millis(1234));
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn count_ink_pixels_works() {
        let mut img = image::GrayImage::from_pixel(10, 10, image::Luma([255]));
        for i in 0..5 {
            img.put_pixel(i, 0, image::Luma([INK]));
        }
        assert_eq!(count_ink_pixels(&img), 5);
    }

    #[test]
    fn diagnostics_match_plain_process() {
        let png = checker_png();
        let config = PipelineConfig {
            sample_size: 20,
            ..PipelineConfig::default()
        };
        let plain = crate::process(&png, &config).unwrap();
        let (result, diag) = process_with_diagnostics(&png, &config, &StepClock::new()).unwrap();
        assert_eq!(plain, result);
        assert_eq!(diag.summary.foreground_count, 32);
        assert_eq!(diag.summary.sample_count, 20);
        assert!(diag.refine.is_none());
        assert!(diag.total_duration >= diag.decode.duration);
    }

    #[test]
    fn refine_stage_reported_when_enabled() {
        let png = checker_png();
        let config = PipelineConfig {
            tour: TourConfig {
                refine_passes: 3,
                distances: DistanceKind::Matrix,
                ..TourConfig::default()
            },
            ..PipelineConfig::default()
        };
        let (_, diag) = process_with_diagnostics(&png, &config, &StepClock::new()).unwrap();
        let refine = diag.refine.as_ref().unwrap();
        assert!(matches!(refine.metrics, StageMetrics::Refine { .. }));
        assert!(diag.report().contains("Refine"));
    }

    #[test]
    fn blank_image_reports_no_foreground() {
        let img = image::GrayImage::from_pixel(4, 4, image::Luma([255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 4, 4, image::ExtendedColorType::L8)
            .unwrap();
        let err = process_with_diagnostics(&buf, &PipelineConfig::default(), &StepClock::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoForeground { threshold: 127 }));
    }

    #[test]
    fn diagnostics_serialize_durations_as_seconds() {
        let png = checker_png();
        let (_, diag) =
            process_with_diagnostics(&png, &PipelineConfig::default(), &StepClock::new()).unwrap();
        let json = serde_json::to_value(&diag).unwrap();
        assert!((json["decode"]["duration"].as_f64().unwrap() - 0.001).abs() < 1e-9);
        let back: PipelineDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back.summary.sample_count, diag.summary.sample_count);
    }

    #[test]
    fn report_lists_every_stage() {
        let png = checker_png();
        let (_, diag) =
            process_with_diagnostics(&png, &PipelineConfig::default(), &StepClock::new()).unwrap();
        let report = diag.report();
        for stage in [
            "Decode",
            "Threshold",
            "Foreground",
            "Sample",
            "Candidates",
            "Greedy",
            "Materialize",
        ] {
            assert!(report.contains(stage), "missing {stage}");
        }
        assert!(!report.contains("Refine"));
    }
}
