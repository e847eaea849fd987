//! tspart: draw a raster image as one continuous travelling salesperson line.
//!
//! Thresholds the input image, samples its dark pixels, connects them with
//! the greedy edge heuristic, and writes the tour as SVG or as a raster
//! image (format chosen from the output extension).
//!
//! # Usage
//!
//! ```text
//! tspart [OPTIONS] <INPUT> <OUTPUT>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser, ValueEnum};
use image::ImageFormat;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use tspart_export::{RenderOptions, SvgMetadata};
use tspart_pipeline::diagnostics::Clock;
use tspart_pipeline::{PipelineConfig, ProcessResult};
use tspart_tour::{CandidateSet, DistanceKind, TourConfig, TourShape};

/// Draw an image as a single travelling salesperson line.
///
/// Dark pixels (luma at or below the threshold) are sampled and joined
/// into one path with the greedy edge heuristic.
#[derive(Parser)]
#[command(name = "tspart", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    input: PathBuf,

    /// Output path. `.svg` writes vector output; any other supported
    /// image extension writes a raster.
    output: PathBuf,

    /// Luma threshold; pixels brighter than this are background.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Number of dark pixels to sample.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SAMPLE_SIZE, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    samples: usize,

    /// Seed for sampling.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SEED)]
    seed: u64,

    /// Which point pairs the greedy builder considers.
    #[arg(long, value_enum, default_value_t = Candidates::Complete)]
    candidates: Candidates,

    /// Neighbours per point when `--candidates nearest`.
    #[arg(long, default_value_t = CandidateSet::DEFAULT_NEAREST_K, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    k: usize,

    /// How pairwise distances are obtained.
    #[arg(long, value_enum, default_value_t = Distances::OnDemand)]
    distances: Distances,

    /// Close the tour into a loop.
    #[arg(long)]
    closed: bool,

    /// Maximum 2-opt passes after greedy construction (0 disables).
    #[arg(long, default_value_t = TourConfig::DEFAULT_REFINE_PASSES)]
    refine_passes: usize,

    /// What to draw into OUTPUT.
    #[arg(long, value_enum, default_value_t = Plot::Line)]
    plot: Plot,

    /// Also write a scatter plot of the sampled points to this path.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Raster output width + height in pixels.
    #[arg(long, default_value_t = RenderOptions::DEFAULT_CANVAS_EXTENT)]
    canvas_extent: u32,

    /// Line width (canvas pixels for raster, image pixels for SVG).
    #[arg(long, default_value_t = RenderOptions::DEFAULT_LINE_WIDTH)]
    line_width: f64,

    /// Scatter dot radius (canvas pixels for raster, image pixels for SVG).
    #[arg(long, default_value_t = RenderOptions::DEFAULT_POINT_RADIUS)]
    point_radius: f64,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization; missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print per-stage timing and count diagnostics to stdout.
    #[arg(long)]
    diagnostics: bool,

    /// Print diagnostics as JSON instead of a human-readable report.
    #[arg(long, requires = "diagnostics")]
    json: bool,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Candidate edge set selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Candidates {
    /// Every pair of points.
    Complete,
    /// Each point's `k` nearest neighbours.
    Nearest,
}

/// Distance provider selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Distances {
    /// Compute each distance when needed.
    OnDemand,
    /// Precompute an N x N matrix.
    Matrix,
}

/// Drawing style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Plot {
    /// The tour as one continuous line.
    Line,
    /// The sampled points as dots.
    Scatter,
}

/// Where rendered output goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputKind {
    Svg,
    Raster(ImageFormat),
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PipelineConfig {
        threshold: cli.threshold,
        sample_size: cli.samples,
        seed: cli.seed,
        tour: TourConfig {
            candidates: match cli.candidates {
                Candidates::Complete => CandidateSet::Complete,
                Candidates::Nearest => CandidateSet::Nearest { k: cli.k },
            },
            distances: match cli.distances {
                Distances::OnDemand => DistanceKind::OnDemand,
                Distances::Matrix => DistanceKind::Matrix,
            },
            shape: if cli.closed {
                TourShape::Closed
            } else {
                TourShape::Open
            },
            refine_passes: cli.refine_passes,
        },
    })
}

/// Map `-v`/`-q` to a log level.
const fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(level: LevelFilter) {
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Logging unavailable: {e}");
    }
}

/// Decide the output kind from the file extension.
fn output_kind(path: &Path) -> Result<OutputKind, String> {
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        return Ok(OutputKind::Svg);
    }
    ImageFormat::from_path(path)
        .map(OutputKind::Raster)
        .map_err(|e| format!("Unsupported output format for {}: {e}", path.display()))
}

/// Human-readable summary of the settings, embedded in SVG `<desc>`.
fn describe(config: &PipelineConfig) -> String {
    format!(
        "threshold={} samples={} seed={} candidates={:?} distances={:?} shape={:?} refine_passes={}",
        config.threshold,
        config.sample_size,
        config.seed,
        config.tour.candidates,
        config.tour.distances,
        config.tour.shape,
        config.tour.refine_passes,
    )
}

/// Render `result` as `plot` in the format of `kind`.
fn render(
    kind: OutputKind,
    plot: Plot,
    result: &ProcessResult,
    options: &RenderOptions,
    metadata: &SvgMetadata<'_>,
) -> Result<Vec<u8>, String> {
    match kind {
        OutputKind::Svg => {
            let svg = match plot {
                Plot::Line => tspart_export::to_svg(
                    &result.polyline,
                    result.dimensions,
                    metadata,
                    options.line_width,
                ),
                Plot::Scatter => tspart_export::to_scatter_svg(
                    &result.samples,
                    result.dimensions,
                    metadata,
                    options.point_radius,
                ),
            };
            Ok(svg.into_bytes())
        }
        OutputKind::Raster(format) => {
            let img = match plot {
                Plot::Line => {
                    tspart_export::render_line(&result.polyline, result.dimensions, options)
                }
                Plot::Scatter => {
                    tspart_export::render_scatter(&result.samples, result.dimensions, options)
                }
            }
            .map_err(|e| format!("Error rendering: {e}"))?;
            tspart_export::encode(&img, format).map_err(|e| format!("Error encoding: {e}"))
        }
    }
}

/// Render and write one output file.
fn write_output(
    path: &Path,
    plot: Plot,
    result: &ProcessResult,
    options: &RenderOptions,
    metadata: &SvgMetadata<'_>,
) -> Result<(), String> {
    let kind = output_kind(path)?;
    let bytes = render(kind, plot, result, options, metadata)?;
    std::fs::write(path, &bytes)
        .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    log::info!(
        "output: path={} plot={plot:?} bytes={}",
        path.display(),
        bytes.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(log_level(cli.verbose, cli.quiet));

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "input: path={} bytes={}",
        cli.input.display(),
        image_bytes.len()
    );
    log::debug!("config: {config:?}");

    let result = if cli.diagnostics {
        match tspart_pipeline::process_with_diagnostics(&image_bytes, &config, &StdClock) {
            Ok((result, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }
                result
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        match tspart_pipeline::process(&image_bytes, &config) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    let options = RenderOptions {
        canvas_extent: cli.canvas_extent,
        line_width: cli.line_width,
        point_radius: cli.point_radius,
    };
    let title = cli.input.file_stem().and_then(|s| s.to_str());
    let description = describe(&config);
    let metadata = SvgMetadata {
        title,
        description: Some(description.as_str()),
    };

    if let Err(msg) = write_output(&cli.output, cli.plot, &result, &options, &metadata) {
        eprintln!("{msg}");
        return ExitCode::FAILURE;
    }

    if let Some(ref preview) = cli.preview
        && let Err(msg) = write_output(preview, Plot::Scatter, &result, &options, &metadata)
    {
        eprintln!("{msg}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["tspart", "in.png", "out.png"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn default_flags_match_library_defaults() {
        let config = config_from_cli(&parse(&[])).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn tour_flags_are_mapped() {
        let cli = parse(&[
            "--candidates",
            "nearest",
            "--k",
            "6",
            "--distances",
            "matrix",
            "--closed",
            "--refine-passes",
            "3",
        ]);
        let tour = config_from_cli(&cli).unwrap().tour;
        assert_eq!(tour.candidates, CandidateSet::Nearest { k: 6 });
        assert_eq!(tour.distances, DistanceKind::Matrix);
        assert_eq!(tour.shape, TourShape::Closed);
        assert_eq!(tour.refine_passes, 3);
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = parse(&["--samples", "5", "--config-json", r#"{"sample_size": 77}"#]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.sample_size, 77);
        assert_eq!(config.threshold, PipelineConfig::DEFAULT_THRESHOLD);
    }

    #[test]
    fn bad_config_json_is_reported() {
        let cli = parse(&["--config-json", "{not json"]);
        assert!(config_from_cli(&cli).unwrap_err().contains("--config-json"));
    }

    #[test]
    fn zero_samples_rejected_by_parser() {
        assert!(Cli::try_parse_from(["tspart", "a.png", "b.png", "--samples", "0"]).is_err());
    }

    #[test]
    fn json_requires_diagnostics() {
        assert!(Cli::try_parse_from(["tspart", "a.png", "b.png", "--json"]).is_err());
    }

    #[test]
    fn output_kind_from_extension() {
        assert_eq!(output_kind(Path::new("a.SVG")).unwrap(), OutputKind::Svg);
        assert_eq!(
            output_kind(Path::new("a.png")).unwrap(),
            OutputKind::Raster(ImageFormat::Png)
        );
        assert_eq!(
            output_kind(Path::new("a.jpg")).unwrap(),
            OutputKind::Raster(ImageFormat::Jpeg)
        );
        assert!(output_kind(Path::new("a.nope")).is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(log_level(0, false), LevelFilter::Warn);
        assert_eq!(log_level(1, false), LevelFilter::Info);
        assert_eq!(log_level(2, false), LevelFilter::Debug);
        assert_eq!(log_level(5, false), LevelFilter::Trace);
        assert_eq!(log_level(0, true), LevelFilter::Error);
    }

    #[test]
    fn describe_lists_settings() {
        let text = describe(&PipelineConfig::default());
        assert!(text.contains("threshold=127"));
        assert!(text.contains("samples=1000"));
        assert!(text.contains("candidates=Complete"));
    }
}
