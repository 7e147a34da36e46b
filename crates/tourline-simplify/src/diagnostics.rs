//! Diagnostics for one segmentation run: timing, point counts, and the
//! engine's search counters.
//!
//! Intended for tolerance tuning. Timestamps come from a caller-supplied
//! [`Clock`] so the library itself stays free of platform time sources.
//!
//! Durations are serialized as fractional seconds (`f64`) since
//! `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::simplify::SimplifyStats;
use crate::types::{ProcessResult, SampleSeries, SegmenterKind, SimplifyConfig, SimplifyError};

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

/// Monotonic time source used to measure a run.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// Current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single segmentation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifyDiagnostics {
    /// Wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Tolerance used.
    pub tolerance: f64,
    /// Segmenter used.
    pub segmenter: SegmenterKind,
    /// Samples in the input series.
    pub points_before: usize,
    /// Points retained by the Douglas-Peucker engine.
    pub points_simplified: usize,
    /// Segment boundaries in the result (after merging, if any).
    pub points_after: usize,
    /// `1.0 - (points_after / points_before)`.
    pub reduction_ratio: f64,
    /// Distinct forced indices (tour boundaries).
    pub forced_count: usize,
    /// Engine search counters.
    pub stats: SimplifyStats,
}

impl SimplifyDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Simplification Diagnostics\n{}", "=".repeat(60)));
        lines.push(format!(
            "Segmenter: {:?}  tolerance={:.3}",
            self.segmenter, self.tolerance,
        ));
        lines.push(format!("Duration: {:.3}ms", duration_ms(self.duration)));
        lines.push(String::new());
        lines.push(format!("{:<24} {:>10}", "Metric", "Value"));
        lines.push("-".repeat(40));

        let rows = [
            ("Input samples", self.points_before),
            ("Forced indices", self.forced_count),
            ("Retained by DP", self.points_simplified),
            ("Segment boundaries", self.points_after),
            ("Ranges evaluated", self.stats.ranges_evaluated),
            ("Distance evaluations", self.stats.distance_evaluations),
            ("Max depth", self.stats.max_depth),
        ];
        for (name, value) in rows {
            lines.push(format!("{name:<24} {value:>10}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Reduction: {} -> {} ({:.1}%)",
            self.points_before,
            self.points_after,
            self.reduction_ratio * 100.0,
        ));

        lines.join("\n")
    }
}

/// Run [`process`](crate::process) and collect diagnostics alongside the
/// result.
///
/// # Errors
///
/// Same as [`process`](crate::process).
pub fn process_with_diagnostics<C: Clock>(
    series: &SampleSeries,
    config: &SimplifyConfig,
    clock: &C,
) -> Result<(ProcessResult, SimplifyDiagnostics), SimplifyError> {
    let start = clock.now();
    let (result, segmentation) = crate::run(series, config)?;
    let duration = clock.elapsed(&start);

    let diagnostics = SimplifyDiagnostics {
        duration,
        tolerance: config.tolerance,
        segmenter: config.segmenter,
        points_before: result.points_before,
        points_simplified: segmentation.simplified_count,
        points_after: result.segment_indices.len(),
        reduction_ratio: reduction_ratio(result.points_before, result.segment_indices.len()),
        forced_count: segmentation.forced_count,
        stats: segmentation.stats,
    };

    Ok((result, diagnostics))
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// `1.0 - after / before`, or `0.0` for an empty input.
#[allow(clippy::cast_precision_loss)]
fn reduction_ratio(before: usize, after: usize) -> f64 {
    if before == 0 {
        0.0
    } else {
        1.0 - after as f64 / before as f64
    }
}
