//! Adapter between recorded sample series and the simplification engine.
//!
//! Tour data arrives as parallel `x`/`y` arrays (distance and elevation,
//! time and power, time and pulse). This module turns them into indexed
//! [`Point`]s, runs [`DouglasPeuckerSimplifier`], and maps the result back
//! to sample indices that a chart or a segment table can use.

use geo::CoordFloat;

use crate::simplify::{DouglasPeuckerSimplifier, SimplifyStats};
use crate::types::{GainLoss, Point, SegmenterKind, SimplifyError};

/// Build indexed points from parallel `x` and `y` series.
///
/// The series index of each point is its sample position.
///
/// # Errors
///
/// Returns [`SimplifyError::SeriesLengthMismatch`] if the series differ
/// in length.
pub fn series_points<X, Y>(x: &[X], y: &[Y]) -> Result<Vec<Point>, SimplifyError>
where
    X: Copy + Into<f64>,
    Y: Copy + Into<f64>,
{
    if x.len() != y.len() {
        return Err(SimplifyError::SeriesLengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }

    Ok(x.iter()
        .zip(y)
        .enumerate()
        .map(|(i, (&xv, &yv))| Point::<f64>::new(xv.into(), yv.into(), i))
        .collect())
}

/// Build indexed points from `geo` coordinates, numbered from zero.
#[must_use]
pub fn points_from_coords<T, I>(coords: I) -> Vec<Point<T>>
where
    T: CoordFloat,
    I: IntoIterator<Item = geo::Coord<T>>,
{
    coords
        .into_iter()
        .enumerate()
        .map(|(i, c)| Point::new(c.x, c.y, i))
        .collect()
}

/// Convert a (simplified) point sequence into a `geo` line string.
#[must_use]
pub fn to_line_string<T: CoordFloat>(points: &[Point<T>]) -> geo::LineString<T> {
    points.iter().map(|&p| geo::Coord::from(p)).collect()
}

/// Forced indices that keep every segment inside a single tour.
///
/// `tour_starts` holds the first sample index of each tour of a merged
/// multi-tour series. Every start after the first contributes the last
/// sample of the previous tour and its own first sample, so the gap
/// between two tours becomes a segment of its own. A single tour needs no
/// forced indices.
///
/// ```
/// use tourline_simplify::series::tour_boundary_indices;
///
/// assert_eq!(tour_boundary_indices(&[0, 10, 25]), vec![0, 9, 10, 24, 25]);
/// assert!(tour_boundary_indices(&[0]).is_empty());
/// ```
#[must_use]
pub fn tour_boundary_indices(tour_starts: &[usize]) -> Vec<usize> {
    if tour_starts.len() < 2 {
        return Vec::new();
    }

    let mut forced = Vec::with_capacity(tour_starts.len() * 2 - 1);
    for &start in tour_starts {
        if start == 0 {
            forced.push(0);
        } else {
            forced.push(start - 1);
            forced.push(start);
        }
    }
    forced
}

/// Forced indices that start a segment at every visible marker and every
/// tour boundary.
///
/// `markers` may be unsorted. The result always begins with `0` and ends
/// with `len - 1`; a marker that falls on a tour boundary, or on another
/// marker, yields a single index. Markers at or past the last sample are
/// ignored.
///
/// ```
/// use tourline_simplify::series::tour_and_marker_indices;
///
/// assert_eq!(tour_and_marker_indices(&[], &[6, 3], 10), vec![0, 3, 6, 9]);
/// assert_eq!(tour_and_marker_indices(&[0, 5], &[5, 7], 10), vec![0, 4, 5, 7, 9]);
/// ```
#[must_use]
pub fn tour_and_marker_indices(
    tour_starts: &[usize],
    markers: &[usize],
    len: usize,
) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }

    let mut tour_indices = tour_boundary_indices(tour_starts);
    if tour_indices.is_empty() {
        tour_indices.push(0);
    }
    tour_indices.push(len - 1);

    let mut sorted_markers = markers.to_vec();
    sorted_markers.sort_unstable();
    let mut pending = sorted_markers.into_iter().peekable();

    let mut forced = vec![0];
    let mut prev = 0;
    for tour_index in tour_indices {
        while let Some(marker) = pending.next_if(|&m| m < tour_index) {
            if marker != prev {
                forced.push(marker);
            }
            prev = marker;
        }
        if tour_index != prev {
            forced.push(tour_index);
        }
        prev = tour_index;
    }
    forced
}

/// Sample indices of the segment boundaries found by Douglas-Peucker.
///
/// `forced` holds sample indices that must become boundaries, e.g. from
/// [`tour_boundary_indices`].
///
/// # Errors
///
/// Returns the preconditions of [`series_points`] and
/// [`DouglasPeuckerSimplifier`].
pub fn segment_indices<X, Y>(
    x: &[X],
    y: &[Y],
    tolerance: f64,
    forced: &[usize],
) -> Result<Vec<usize>, SimplifyError>
where
    X: Copy + Into<f64>,
    Y: Copy + Into<f64>,
{
    segment(x, y, tolerance, forced, SegmenterKind::DouglasPeucker).map(|s| s.indices)
}

/// Like [`segment_indices`], but consecutive segments that go in the same
/// vertical direction are merged.
///
/// A zero change in `y` counts as rising. Forced indices, the first sample
/// and the last sample always stay boundaries.
///
/// # Errors
///
/// Same as [`segment_indices`].
pub fn merged_segment_indices<X, Y>(
    x: &[X],
    y: &[Y],
    tolerance: f64,
    forced: &[usize],
) -> Result<Vec<usize>, SimplifyError>
where
    X: Copy + Into<f64>,
    Y: Copy + Into<f64>,
{
    segment(x, y, tolerance, forced, SegmenterKind::DouglasPeuckerMerged).map(|s| s.indices)
}

/// Total ascent and descent of `y`, measured only between the samples
/// kept by Douglas-Peucker.
///
/// Small oscillations within `tolerance` are ignored, which makes this a
/// far more stable elevation gain than summing every sample difference.
///
/// # Errors
///
/// Same as [`segment_indices`].
pub fn elevation_gain_loss<X, Y>(
    x: &[X],
    y: &[Y],
    tolerance: f64,
    forced: &[usize],
) -> Result<GainLoss, SimplifyError>
where
    X: Copy + Into<f64>,
    Y: Copy + Into<f64>,
{
    let indices = segment_indices(x, y, tolerance, forced)?;
    Ok(gain_loss_at(y, &indices))
}

/// Ascent and descent of `y` walking through `indices` in order.
///
/// Indices past the end of `y` are skipped.
#[must_use]
pub fn gain_loss_at<Y: Copy + Into<f64>>(y: &[Y], indices: &[usize]) -> GainLoss {
    let mut result = GainLoss::default();

    let mut values = indices.iter().filter_map(|&i| y.get(i)).map(|&v| Into::<f64>::into(v));
    let Some(mut prev) = values.next() else {
        return result;
    };

    for current in values {
        let diff = current - prev;
        if diff > 0.0 {
            result.gain += diff;
        } else {
            result.loss -= diff;
        }
        prev = current;
    }

    result
}

/// Output of one segmentation run, with the engine's counters.
pub(crate) struct Segmentation {
    /// Sample indices of the segment boundaries.
    pub indices: Vec<usize>,
    /// Merged Douglas-Peucker boundaries inside marker segments.
    pub secondary: Vec<usize>,
    /// Points retained by the engine before any merging.
    pub simplified_count: usize,
    /// Distinct forced indices.
    pub forced_count: usize,
    pub stats: SimplifyStats,
}

/// Run the selected segmenter over a sample series.
pub(crate) fn segment<X, Y>(
    x: &[X],
    y: &[Y],
    tolerance: f64,
    forced: &[usize],
    kind: SegmenterKind,
) -> Result<Segmentation, SimplifyError>
where
    X: Copy + Into<f64>,
    Y: Copy + Into<f64>,
{
    let points = series_points(x, y)?;
    let engine = DouglasPeuckerSimplifier::new(tolerance, &points)?.with_forced_indices(forced)?;
    let (simplified, stats) = engine.simplify_with_stats();

    let (indices, secondary) = match kind {
        SegmenterKind::DouglasPeucker => (
            simplified.iter().map(|p| p.series_index).collect(),
            Vec::new(),
        ),
        SegmenterKind::DouglasPeuckerMerged => (
            merge_by_direction(&simplified, engine.forced_indices()),
            Vec::new(),
        ),
        SegmenterKind::DouglasPeuckerMarker => {
            let mut boundaries = Vec::with_capacity(engine.forced_indices().len() + 2);
            boundaries.push(0);
            boundaries.extend_from_slice(engine.forced_indices());
            boundaries.push(points.len() - 1);
            boundaries.dedup();
            (boundaries, merge_by_direction(&simplified, engine.forced_indices()))
        }
    };

    Ok(Segmentation {
        indices,
        secondary,
        simplified_count: simplified.len(),
        forced_count: engine.forced_indices().len(),
        stats,
    })
}

/// Keep only the simplified points where the vertical direction turns,
/// plus forced points and both ends. `forced` must be sorted.
fn merge_by_direction(simplified: &[Point], forced: &[usize]) -> Vec<usize> {
    let (Some(first), Some(last)) = (simplified.first(), simplified.last()) else {
        return Vec::new();
    };

    let mut indices = vec![first.series_index];
    let mut rising: Option<bool> = None;

    for pair in simplified.windows(2) {
        let (prev, current) = (pair[0], pair[1]);
        let is_rising = current.y - prev.y >= 0.0;

        let turned = rising.is_some_and(|r| r != is_rising);
        let is_forced = prev.series_index != first.series_index
            && forced.binary_search(&prev.series_index).is_ok();

        if turned || is_forced {
            indices.push(prev.series_index);
        }
        rising = Some(is_rising);
    }

    if last.series_index != first.series_index {
        indices.push(last.series_index);
    }
    indices
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const X5: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];
    /// Up, up, down, down; every point deviates more than 0.5.
    const PEAK: [f64; 5] = [0.0, 5.0, 30.0, 25.0, 0.0];

    // --- series_points ---

    #[test]
    fn series_points_numbers_samples() {
        let points = series_points(&[0.0_f32, 10.0, 20.0], &[100.0_f32, 101.5, 99.0]).unwrap();
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 100.0, 0),
                Point::new(10.0, 101.5, 1),
                Point::new(20.0, 99.0, 2),
            ]
        );
    }

    #[test]
    fn series_points_accepts_integer_time() {
        let points = series_points(&[0_i32, 5, 10], &[120.0_f32, 130.0, 125.0]).unwrap();
        assert!((points[2].x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn series_points_length_mismatch() {
        let result = series_points(&[0.0, 1.0, 2.0], &[0.0, 1.0]);
        assert_eq!(
            result,
            Err(SimplifyError::SeriesLengthMismatch { x: 3, y: 2 })
        );
    }

    // --- geo interop ---

    #[test]
    fn coords_round_trip_through_line_string() {
        let coords = vec![
            geo::Coord { x: 0.0, y: 0.0 },
            geo::Coord { x: 1.0, y: 0.0 },
            geo::Coord { x: 2.0, y: 0.0 },
        ];
        let points = points_from_coords(coords.clone());
        assert_eq!(points[2].series_index, 2);

        let line = to_line_string(&points);
        assert_eq!(line.0, coords);
    }

    #[test]
    fn simplified_line_string_keeps_ends() {
        let points = points_from_coords((0..10).map(|i| geo::Coord {
            x: f64::from(i),
            y: 0.0,
        }));
        let simplified = crate::simplify(&points, 0.1).unwrap();
        let line = to_line_string(&simplified);
        assert_eq!(
            line.0,
            vec![geo::Coord { x: 0.0, y: 0.0 }, geo::Coord { x: 9.0, y: 0.0 }]
        );
    }

    // --- tour_boundary_indices ---

    #[test]
    fn tour_boundaries_single_tour() {
        assert!(tour_boundary_indices(&[]).is_empty());
        assert!(tour_boundary_indices(&[0]).is_empty());
    }

    #[test]
    fn tour_boundaries_two_tours() {
        assert_eq!(tour_boundary_indices(&[0, 50]), vec![0, 49, 50]);
    }

    #[test]
    fn tour_boundaries_three_tours() {
        assert_eq!(tour_boundary_indices(&[0, 10, 25]), vec![0, 9, 10, 24, 25]);
    }

    // --- tour_and_marker_indices ---

    #[test]
    fn markers_single_tour_sorted_and_deduplicated() {
        assert_eq!(tour_and_marker_indices(&[], &[6, 3, 3], 10), vec![0, 3, 6, 9]);
    }

    #[test]
    fn markers_without_markers_span_the_tour() {
        assert_eq!(tour_and_marker_indices(&[], &[], 10), vec![0, 9]);
        assert_eq!(tour_and_marker_indices(&[0, 5], &[], 10), vec![0, 4, 5, 9]);
    }

    #[test]
    fn marker_on_tour_boundary_is_not_repeated() {
        assert_eq!(
            tour_and_marker_indices(&[0, 5], &[2, 5, 7], 10),
            vec![0, 2, 4, 5, 7, 9]
        );
        // End of the first tour.
        assert_eq!(tour_and_marker_indices(&[0, 5], &[4], 10), vec![0, 4, 5, 9]);
    }

    #[test]
    fn markers_on_series_ends_are_not_repeated() {
        assert_eq!(tour_and_marker_indices(&[], &[0, 9, 12], 10), vec![0, 9]);
    }

    #[test]
    fn markers_on_empty_series() {
        assert!(tour_and_marker_indices(&[], &[3], 0).is_empty());
    }

    #[test]
    fn marker_segmentation_reports_merged_points_inside() {
        let forced = tour_and_marker_indices(&[], &[1], 5);
        let segmentation =
            segment(&X5, &PEAK, 0.5, &forced, SegmenterKind::DouglasPeuckerMarker).unwrap();
        assert_eq!(segmentation.indices, vec![0, 1, 4]);
        assert_eq!(segmentation.secondary, vec![0, 1, 2, 4]);
        assert_eq!(segmentation.simplified_count, 5);
    }

    // --- segment_indices ---

    #[test]
    fn segment_indices_straight_climb() {
        let y = [100.0, 110.0, 120.0, 130.0, 140.0];
        assert_eq!(segment_indices(&X5, &y, 1.0, &[]).unwrap(), vec![0, 4]);
    }

    #[test]
    fn segment_indices_keeps_peak() {
        assert_eq!(
            segment_indices(&X5, &PEAK, 0.5, &[]).unwrap(),
            vec![0, 1, 2, 3, 4]
        );
        assert_eq!(segment_indices(&X5, &PEAK, 40.0, &[]).unwrap(), vec![0, 4]);
    }

    #[test]
    fn segment_indices_honours_forced() {
        let y = [100.0, 110.0, 120.0, 130.0, 140.0];
        assert_eq!(segment_indices(&X5, &y, 1.0, &[2]).unwrap(), vec![0, 2, 4]);
    }

    #[test]
    fn segment_indices_rejects_short_series() {
        let result = segment_indices(&[0.0], &[1.0], 1.0, &[]);
        assert_eq!(result, Err(SimplifyError::TooFewPoints { len: 1 }));
    }

    #[test]
    fn segment_indices_rejects_forced_past_end() {
        let result = segment_indices(&X5, &PEAK, 1.0, &[5]);
        assert_eq!(
            result,
            Err(SimplifyError::ForcedIndexOutOfRange { index: 5, len: 5 })
        );
    }

    // --- merged_segment_indices ---

    #[test]
    fn merged_keeps_only_turns() {
        assert_eq!(
            merged_segment_indices(&X5, &PEAK, 0.5, &[]).unwrap(),
            vec![0, 2, 4]
        );
    }

    #[test]
    fn merged_keeps_forced_points() {
        assert_eq!(
            merged_segment_indices(&X5, &PEAK, 0.5, &[3]).unwrap(),
            vec![0, 2, 3, 4]
        );
    }

    #[test]
    fn merged_forced_start_is_not_duplicated() {
        assert_eq!(
            merged_segment_indices(&X5, &PEAK, 0.5, &[0]).unwrap(),
            vec![0, 2, 4]
        );
    }

    #[test]
    fn merged_flat_counts_as_rising() {
        // 0 -> 0 is "rising", so 0 -> 0 -> 5 has no turn.
        let y = [0.0, 0.0, 5.0, 0.0];
        let x = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(segment_indices(&x, &y, 0.0, &[]).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(
            merged_segment_indices(&x, &y, 0.0, &[]).unwrap(),
            vec![0, 2, 3]
        );
    }

    #[test]
    fn merged_two_points() {
        assert_eq!(
            merged_segment_indices(&[0.0, 1.0], &[5.0, 1.0], 1.0, &[]).unwrap(),
            vec![0, 1]
        );
    }

    // --- gain / loss ---

    #[test]
    fn gain_loss_ignores_noise_within_tolerance() {
        let x = [0.0, 100.0, 200.0, 300.0, 400.0, 500.0];
        let y = [100.0, 101.0, 100.0, 101.0, 100.0, 110.0];

        let raw = gain_loss_at(&y, &[0, 1, 2, 3, 4, 5]);
        assert!((raw.gain - 12.0).abs() < 1e-9);
        assert!((raw.loss - 2.0).abs() < 1e-9);

        let simplified = elevation_gain_loss(&x, &y, 2.0, &[]).unwrap();
        assert!((simplified.gain - 10.0).abs() < 1e-9, "got {simplified:?}");
        assert!(simplified.loss.abs() < 1e-9, "got {simplified:?}");
    }

    #[test]
    fn gain_loss_peak() {
        let gl = elevation_gain_loss(&X5, &PEAK, 0.5, &[]).unwrap();
        assert!((gl.gain - 30.0).abs() < 1e-9);
        assert!((gl.loss - 30.0).abs() < 1e-9);
    }

    #[test]
    fn gain_loss_at_skips_out_of_range() {
        let gl = gain_loss_at(&[1.0, 4.0], &[0, 1, 7]);
        assert!((gl.gain - 3.0).abs() < 1e-9);
        assert!(gl.loss.abs() < 1e-9);
    }

    #[test]
    fn gain_loss_at_empty() {
        assert_eq!(gain_loss_at::<f64>(&[], &[]), GainLoss::default());
    }
}
