//! tourline-simplify: Douglas-Peucker simplification of tour sample
//! series (sans-IO).
//!
//! Reduces recorded series such as elevation over distance, or power and
//! pulse over time, to the samples that carry their shape:
//!
//! - [`geometry`]: point/vector arithmetic and segment distances
//! - [`simplify`](mod@simplify): the [`DouglasPeuckerSimplifier`] engine
//! - [`series`]: adapter from parallel `x`/`y` sample arrays to sample
//!   indices, tour boundaries, merged segments and elevation gain/loss
//! - [`diagnostics`]: timing and counters for tolerance tuning
//!
//! This crate does no I/O. Reading series from files lives in
//! `tourline-bench`.

pub mod diagnostics;
pub mod geometry;
pub mod series;
pub mod simplify;
pub mod types;

pub use simplify::{DouglasPeuckerSimplifier, SimplifyStats, simplify};
pub use types::{
    GainLoss, Point, ProcessResult, SampleSeries, SegmenterKind, SimplifyConfig, SimplifyError,
    Vector,
};

/// Segment a sample series according to `config`.
///
/// # Steps
///
/// 1. Validate the configuration
/// 2. Derive forced indices from the tour starts (when `split_tours`) and,
///    for the marker segmenter, from the markers
/// 3. Douglas-Peucker simplification of the `(x, y)` series
/// 4. Optional merging of same-direction segments
/// 5. Elevation gain/loss between the segment boundaries
///
/// # Errors
///
/// Returns [`SimplifyError::InvalidConfig`] for a bad tolerance,
/// [`SimplifyError::SeriesLengthMismatch`] if `x` and `y` differ in length,
/// [`SimplifyError::TooFewPoints`] for fewer than two samples, and
/// [`SimplifyError::ForcedIndexOutOfRange`] if a tour start lies past the
/// end of the series.
pub fn process(
    series: &SampleSeries,
    config: &SimplifyConfig,
) -> Result<ProcessResult, SimplifyError> {
    run(series, config).map(|(result, _)| result)
}

/// Shared body of [`process`] and
/// [`diagnostics::process_with_diagnostics`].
pub(crate) fn run(
    series: &SampleSeries,
    config: &SimplifyConfig,
) -> Result<(ProcessResult, series::Segmentation), SimplifyError> {
    config.validate()?;

    let tour_starts: &[usize] = if config.split_tours {
        &series.tour_starts
    } else {
        &[]
    };
    let forced = match config.segmenter {
        SegmenterKind::DouglasPeuckerMarker => {
            series::tour_and_marker_indices(tour_starts, &series.markers, series.len())
        }
        SegmenterKind::DouglasPeucker | SegmenterKind::DouglasPeuckerMerged => {
            series::tour_boundary_indices(tour_starts)
        }
    };

    let segmentation = series::segment(
        &series.x,
        &series.y,
        config.tolerance,
        &forced,
        config.segmenter,
    )
    .inspect_err(|e| log::warn!("cannot segment series of {} samples: {e}", series.len()))?;

    // Marker segments are too coarse for gain/loss; use the points inside.
    let profile = if segmentation.secondary.is_empty() {
        &segmentation.indices
    } else {
        &segmentation.secondary
    };
    let gain_loss = series::gain_loss_at(&series.y, profile);

    let result = ProcessResult {
        segment_indices: segmentation.indices.clone(),
        gain_loss,
        points_before: series.len(),
        secondary_indices: segmentation.secondary.clone(),
    };
    Ok((result, segmentation))
}
