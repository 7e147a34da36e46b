//! Douglas-Peucker simplification of an indexed point sequence.
//!
//! Reduces the number of samples in a series by dropping every point that
//! lies within `tolerance` of the chord spanning its range. Distances are
//! measured to the chord *segment*, not the infinite line through it, so
//! points beyond either end of a chord are measured to that end.
//!
//! The output is always an order-preserving subsequence of the input that
//! keeps the first and last point (and every forced index). Worst case is
//! O(n^2) for a nearly straight series with one spike at the end, typical
//! case O(n log n).

use geo::CoordFloat;
use serde::{Deserialize, Serialize};

use crate::geometry::{difference, dot, segment_distance_squared_with_chord};
use crate::types::{Point, SimplifyError};

/// Counters collected while simplifying one sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifyStats {
    /// Ranges with at least one interior point that were searched for
    /// their farthest point.
    pub ranges_evaluated: usize,
    /// Point-to-chord distance computations.
    pub distance_evaluations: usize,
    /// Deepest subdivision level reached (1 = the anchor ranges).
    pub max_depth: usize,
}

/// An index range `[start, end]` still to be searched.
#[derive(Debug, Clone, Copy)]
struct Range {
    start: usize,
    end: usize,
    depth: usize,
}

/// Douglas-Peucker engine over a borrowed point sequence.
///
/// Construction validates the preconditions; [`simplify`](Self::simplify)
/// can then never fail. The engine holds no state between calls, so one
/// instance can be simplified repeatedly (and shared across threads) with
/// identical results.
///
/// # Examples
///
/// ```
/// use tourline_simplify::{DouglasPeuckerSimplifier, Point};
///
/// let points = [
///     Point::new(0.0, 0.0, 0),
///     Point::new(1.0, 1.0, 1),
///     Point::new(2.0, 2.0, 2),
///     Point::new(3.0, 3.0, 3),
/// ];
/// let simplified = DouglasPeuckerSimplifier::new(0.0, &points)?.simplify();
/// assert_eq!(simplified, vec![points[0], points[3]]);
/// # Ok::<(), tourline_simplify::SimplifyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DouglasPeuckerSimplifier<'a, T = f64> {
    tolerance: T,
    points: &'a [Point<T>],
    forced: Vec<usize>,
}

impl<'a, T: CoordFloat> DouglasPeuckerSimplifier<'a, T> {
    /// Create an engine for `points` with the given `tolerance`.
    ///
    /// A tolerance of zero keeps every point that deviates at all from its
    /// chord and drops exactly collinear ones.
    ///
    /// # Errors
    ///
    /// Returns [`SimplifyError::InvalidTolerance`] if `tolerance` is
    /// negative or NaN, and [`SimplifyError::TooFewPoints`] if fewer than
    /// two points are supplied.
    pub fn new(tolerance: T, points: &'a [Point<T>]) -> Result<Self, SimplifyError> {
        if tolerance.is_nan() || tolerance < T::zero() {
            return Err(SimplifyError::InvalidTolerance(
                tolerance.to_f64().unwrap_or(f64::NAN),
            ));
        }
        if points.len() < 2 {
            return Err(SimplifyError::TooFewPoints { len: points.len() });
        }

        Ok(Self {
            tolerance,
            points,
            forced: Vec::new(),
        })
    }

    /// Always retain the points at the given positions in the input slice.
    ///
    /// The sequence is split at every forced position and each part is
    /// simplified on its own, so no chord ever spans a forced point.
    /// Duplicates and the two endpoints are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SimplifyError::ForcedIndexOutOfRange`] for a position
    /// past the end of the input.
    pub fn with_forced_indices(mut self, indices: &[usize]) -> Result<Self, SimplifyError> {
        let len = self.points.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(SimplifyError::ForcedIndexOutOfRange { index, len });
        }

        self.forced.extend_from_slice(indices);
        self.forced.sort_unstable();
        self.forced.dedup();
        Ok(self)
    }

    /// The tolerance this engine was built with.
    #[must_use]
    pub const fn tolerance(&self) -> T {
        self.tolerance
    }

    /// The input sequence.
    #[must_use]
    pub const fn points(&self) -> &'a [Point<T>] {
        self.points
    }

    /// Forced positions, sorted and deduplicated.
    #[must_use]
    pub fn forced_indices(&self) -> &[usize] {
        &self.forced
    }

    /// Run the simplification and return the retained points in input
    /// order.
    #[must_use = "returns the simplified sequence"]
    pub fn simplify(&self) -> Vec<Point<T>> {
        self.simplify_with_stats().0
    }

    /// Series indices of the retained points, in input order.
    #[must_use]
    pub fn retained_indices(&self) -> Vec<usize> {
        let (kept, _) = self.retention();
        self.points
            .iter()
            .zip(&kept)
            .filter(|&(_, k)| *k)
            .map(|(p, _)| p.series_index)
            .collect()
    }

    /// Like [`simplify`](Self::simplify), also returning search counters.
    #[must_use = "returns the simplified sequence"]
    pub fn simplify_with_stats(&self) -> (Vec<Point<T>>, SimplifyStats) {
        let (kept, stats) = self.retention();

        let simplified: Vec<Point<T>> = self
            .points
            .iter()
            .zip(&kept)
            .filter(|&(_, k)| *k)
            .map(|(&p, _)| p)
            .collect();

        log::debug!(
            "simplified {} points to {} (tolerance {:?}, {} forced, {} ranges, depth {})",
            self.points.len(),
            simplified.len(),
            self.tolerance,
            self.forced.len(),
            stats.ranges_evaluated,
            stats.max_depth,
        );

        (simplified, stats)
    }

    /// Build the retention set: one flag per input point.
    fn retention(&self) -> (Vec<bool>, SimplifyStats) {
        let points = self.points;
        let last = points.len() - 1;
        let tolerance_sq = self.tolerance * self.tolerance;

        let mut kept = vec![false; points.len()];
        kept[0] = true;
        kept[last] = true;
        for &i in &self.forced {
            kept[i] = true;
        }

        // Anchor ranges between consecutive retained points.
        let mut work: Vec<Range> = Vec::new();
        let mut start = 0;
        for (end, &anchor) in kept.iter().enumerate().skip(1) {
            if anchor {
                work.push(Range {
                    start,
                    end,
                    depth: 1,
                });
                start = end;
            }
        }

        let mut stats = SimplifyStats::default();

        while let Some(range) = work.pop() {
            if range.end <= range.start + 1 {
                continue;
            }
            stats.ranges_evaluated += 1;
            stats.max_depth = stats.max_depth.max(range.depth);
            stats.distance_evaluations += range.end - range.start - 1;

            let (max_i, max_d2) = self.farthest(range.start, range.end);
            if max_d2 > tolerance_sq {
                kept[max_i] = true;
                work.push(Range {
                    start: max_i,
                    end: range.end,
                    depth: range.depth + 1,
                });
                work.push(Range {
                    start: range.start,
                    end: max_i,
                    depth: range.depth + 1,
                });
            }
        }

        (kept, stats)
    }

    /// Interior point of `(start, end)` farthest from the chord segment,
    /// with its squared distance. Ties keep the earliest index.
    fn farthest(&self, start: usize, end: usize) -> (usize, T) {
        let a = self.points[start];
        let b = self.points[end];
        let u = difference(b, a);
        let cu = dot(u, u);

        let mut max_i = start;
        let mut max_d2 = T::zero();

        for i in (start + 1)..end {
            let d2 = segment_distance_squared_with_chord(self.points[i], a, b, u, cu);
            if d2 > max_d2 {
                max_d2 = d2;
                max_i = i;
            }
        }

        (max_i, max_d2)
    }
}

/// Simplify `points` with `tolerance` in one call.
///
/// # Errors
///
/// Same preconditions as [`DouglasPeuckerSimplifier::new`].
pub fn simplify<T: CoordFloat>(
    points: &[Point<T>],
    tolerance: T,
) -> Result<Vec<Point<T>>, SimplifyError> {
    Ok(DouglasPeuckerSimplifier::new(tolerance, points)?.simplify())
}
