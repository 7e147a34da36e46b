//! tourline-bench: CLI tool for tolerance tuning and simplification
//! diagnostics.
//!
//! Segments a recorded sample series (JSON) with configurable parameters
//! and prints run diagnostics. Useful for:
//!
//! - Comparing the plain, merged and marker segmenters
//! - Picking a tolerance for a given sensor and sampling rate
//! - Measuring how tour boundaries change the retained samples
//!
//! The input file holds a serialized `SampleSeries`:
//!
//! ```text
//! { "x": [0.0, 12.5, ...], "y": [301.2, 301.9, ...], "tour_starts": [0], "markers": [312] }
//! ```
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin tourline-bench -- [OPTIONS] <SERIES_JSON>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use tourline_simplify::diagnostics::{Clock, SimplifyDiagnostics};
use tourline_simplify::{SampleSeries, SegmenterKind, SimplifyConfig};

/// Tolerance tuning and diagnostics for tour sample series.
///
/// Runs Douglas-Peucker segmentation on a series file and prints point
/// counts, search counters, and timing.
#[derive(Parser)]
#[command(name = "tourline-bench", version)]
struct Cli {
    /// Path to the input series (JSON).
    series_path: PathBuf,

    /// Simplification tolerance in `y` units.
    #[arg(long, default_value_t = SimplifyConfig::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Segmenter.
    #[arg(long, value_enum, default_value_t = Segmenter::Dp)]
    segmenter: Segmenter,

    /// Ignore tour starts in the input file.
    #[arg(long)]
    no_tour_split: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full simplify config as a JSON string.
    ///
    /// When provided, `--tolerance`, `--segmenter` and `--no-tour-split`
    /// are ignored. The JSON must be a valid `SimplifyConfig`
    /// serialization; missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Write the segment indices of the first run to this file (JSON array).
    #[arg(long)]
    indices_out: Option<PathBuf>,
}

/// Segmenter selection.
#[derive(Clone, Copy, ValueEnum)]
enum Segmenter {
    /// Plain Douglas-Peucker.
    Dp,
    /// Douglas-Peucker, then merge consecutive same-direction segments.
    Merged,
    /// Segments between markers and tour boundaries.
    Marker,
}

/// Build a [`SimplifyConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<SimplifyConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(SimplifyConfig {
        tolerance: cli.tolerance,
        segmenter: match cli.segmenter {
            Segmenter::Dp => SegmenterKind::DouglasPeucker,
            Segmenter::Merged => SegmenterKind::DouglasPeuckerMerged,
            Segmenter::Marker => SegmenterKind::DouglasPeuckerMarker,
        },
        split_tours: !cli.no_tour_split,
    })
}

/// Read and parse the series file.
fn read_series(path: &Path) -> Result<SampleSeries, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let series = match read_series(&cli.series_path) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Series: {} ({} samples, {} tours)",
        cli.series_path.display(),
        series.len(),
        series.tour_starts.len().max(1),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match tourline_simplify::diagnostics::process_with_diagnostics(&series, &config, &StdClock)
        {
            Ok((result, diagnostics)) => {
                log::debug!("run {} took {:?}", run + 1, diagnostics.duration);
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
                    println!(
                        "Gain/loss: +{:.1} / -{:.1}",
                        result.gain_loss.gain, result.gain_loss.loss,
                    );
                    if !result.secondary_indices.is_empty() {
                        println!("Points inside segments: {}", result.secondary_indices.len());
                    }
                }

                // Write indices on the first run only.
                if run == 0
                    && let Some(ref out) = cli.indices_out
                {
                    let written = serde_json::to_string(&result.segment_indices)
                        .map_err(|e| e.to_string())
                        .and_then(|json| std::fs::write(out, json).map_err(|e| e.to_string()));
                    match written {
                        Ok(()) => eprintln!(
                            "Indices written to {} ({} entries)",
                            out.display(),
                            result.segment_indices.len(),
                        ),
                        Err(e) => {
                            eprintln!("Error writing indices to {}: {e}", out.display());
                            return ExitCode::FAILURE;
                        }
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                log::error!("run {} failed: {e}", run + 1);
                eprintln!("Simplification error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
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

/// Print aggregated timing across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[SimplifyDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Counts are deterministic; any run will do.
    if let Some(last) = all_diagnostics.last() {
        println!(
            "Points: {} -> {} ({:.1}% reduction)",
            last.points_before,
            last.points_after,
            last.reduction_ratio * 100.0,
        );
    }
}
