//! Shared types for tour series simplification.

use geo::CoordFloat;
use serde::{Deserialize, Serialize};

/// A 2D sample of a tour series, tagged with its position in the
/// original (un-simplified) sequence.
///
/// `x` is usually the ordered domain (distance or time) and `y` the
/// measured value (elevation, power, pulse). The engine itself is
/// unit-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point<T = f64> {
    /// Horizontal position (distance, time, ...).
    pub x: T,
    /// Vertical position (elevation, power, ...).
    pub y: T,
    /// Position of this sample in the original series.
    pub series_index: usize,
}

impl<T> Point<T> {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: T, y: T, series_index: usize) -> Self {
        Self { x, y, series_index }
    }
}

impl<T: CoordFloat> From<Point<T>> for geo::Coord<T> {
    fn from(p: Point<T>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Difference of two points.
///
/// Unlike [`Point`] a vector carries no series index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector<T = f64> {
    /// Horizontal component.
    pub x: T,
    /// Vertical component.
    pub y: T,
}

impl<T> Vector<T> {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

/// Which segmenter [`process`](crate::process) runs over a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmenterKind {
    /// Every point retained by the Douglas-Peucker engine starts a segment.
    #[default]
    DouglasPeucker,
    /// Douglas-Peucker points, with consecutive segments of the same
    /// vertical direction merged into one.
    DouglasPeuckerMerged,
    /// Segments run from marker to marker (and tour boundary to tour
    /// boundary). The direction-merged Douglas-Peucker points inside them
    /// are reported as a secondary series.
    DouglasPeuckerMarker,
}

/// Configuration for segmenting a sample series.
///
/// Fields are public; call [`SimplifyConfig::validate`] (or go through
/// [`process`](crate::process), which does) before trusting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Maximum allowed deviation of a dropped sample from its chord, in
    /// the units of the `y` series (metres for elevation).
    pub tolerance: f64,

    /// Which segmenter to run.
    pub segmenter: SegmenterKind,

    /// Force a segment boundary at every tour start of a multi-tour
    /// series so that no segment covers more than one tour.
    pub split_tours: bool,
}

impl SimplifyConfig {
    /// Default tolerance (elevation metres).
    pub const DEFAULT_TOLERANCE: f64 = 5.0;

    /// Default segmenter.
    pub const DEFAULT_SEGMENTER: SegmenterKind = SegmenterKind::DouglasPeucker;

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SimplifyError::InvalidConfig`] if `tolerance` is negative,
    /// NaN, or infinite.
    pub fn validate(&self) -> Result<(), SimplifyError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SimplifyError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::DEFAULT_TOLERANCE,
            segmenter: Self::DEFAULT_SEGMENTER,
            split_tours: true,
        }
    }
}

/// A recorded sample series: one `(x, y)` pair per sample.
///
/// `tour_starts` lists the sample index at which each tour of a
/// multi-tour series begins (`[0, ...]`); empty or a single entry means
/// one tour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    /// Ordered domain, e.g. cumulative distance.
    pub x: Vec<f64>,
    /// Measured values, e.g. elevation.
    pub y: Vec<f64>,
    /// First sample index of each tour.
    #[serde(default)]
    pub tour_starts: Vec<usize>,
    /// Sample indices of the visible markers, in any order.
    #[serde(default)]
    pub markers: Vec<usize>,
}

impl SampleSeries {
    /// Number of samples (length of the `x` series).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns `true` if the series has no samples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Total ascent and descent along a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GainLoss {
    /// Sum of all rises, always `>= 0`.
    pub gain: f64,
    /// Sum of all drops as a positive number.
    pub loss: f64,
}

/// Result of segmenting a sample series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Series indices of the segment boundaries, ascending.
    pub segment_indices: Vec<usize>,

    /// Ascent and descent measured between the segment boundaries.
    pub gain_loss: GainLoss,

    /// Number of samples in the input series.
    pub points_before: usize,

    /// Direction-merged Douglas-Peucker boundaries inside the marker
    /// segments. Only filled by [`SegmenterKind::DouglasPeuckerMarker`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_indices: Vec<usize>,
}

/// Precondition violations reported by the engine and the series adapter.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum SimplifyError {
    /// At least two points are needed to form a chord.
    #[error("at least 2 points are required, got {len}")]
    TooFewPoints {
        /// Number of points supplied.
        len: usize,
    },

    /// The tolerance is negative or NaN.
    #[error("tolerance must be non-negative, got {0}")]
    InvalidTolerance(f64),

    /// A forced index does not address an input point.
    #[error("forced index {index} is out of range for {len} points")]
    ForcedIndexOutOfRange {
        /// The offending position.
        index: usize,
        /// Number of points supplied.
        len: usize,
    },

    /// The `x` and `y` series have different lengths.
    #[error("series length mismatch: x has {x} samples, y has {y}")]
    SeriesLengthMismatch {
        /// Length of the `x` series.
        x: usize,
        /// Length of the `y` series.
        y: usize,
    },

    /// The configuration is invalid.
    #[error("invalid simplify configuration: {0}")]
    InvalidConfig(String),
}
