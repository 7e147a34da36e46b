//! Invariants of the simplification engine checked on synthetic tour
//! profiles.

#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use tourline_simplify::geometry::segment_distance_squared;
use tourline_simplify::series::{segment_indices, series_points, tour_boundary_indices};
use tourline_simplify::{DouglasPeuckerSimplifier, Point, simplify};

const TOLERANCES: [f64; 8] = [0.0, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 50.0];

/// Rolling elevation profile: a long climb with medium hills and sensor
/// jitter, one sample every 12.5 m.
fn rolling_profile(n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            let y = 300.0
                + 40.0 * (t * 0.03).sin()
                + 6.0 * (t * 0.37).sin()
                + 1.5 * (t * 2.1).sin();
            Point::new(t * 12.5, y, i)
        })
        .collect()
}

fn indices(points: &[Point]) -> Vec<usize> {
    points.iter().map(|p| p.series_index).collect()
}

fn is_subsequence(needle: &[usize], haystack: &[usize]) -> bool {
    let mut it = haystack.iter();
    needle.iter().all(|n| it.any(|h| h == n))
}

#[test]
fn endpoints_are_always_retained() {
    let input = rolling_profile(400);
    for tolerance in TOLERANCES {
        let output = simplify(&input, tolerance).unwrap();
        assert_eq!(output.first(), input.first(), "tolerance {tolerance}");
        assert_eq!(output.last(), input.last(), "tolerance {tolerance}");
    }
}

#[test]
fn output_is_unaltered_ordered_subsequence() {
    let input = rolling_profile(400);
    for tolerance in TOLERANCES {
        let output = simplify(&input, tolerance).unwrap();
        assert!(output.len() >= 2 && output.len() <= input.len());
        assert!(
            output.windows(2).all(|w| w[0].series_index < w[1].series_index),
            "tolerance {tolerance}: output not strictly ordered",
        );
        for p in &output {
            assert_eq!(*p, input[p.series_index], "point was altered");
        }
    }
}

#[test]
fn larger_tolerance_never_retains_more() {
    let input = rolling_profile(400);
    let outputs: Vec<Vec<usize>> = TOLERANCES
        .iter()
        .map(|&t| indices(&simplify(&input, t).unwrap()))
        .collect();

    for (pair, tolerances) in outputs.windows(2).zip(TOLERANCES.windows(2)) {
        assert!(
            is_subsequence(&pair[1], &pair[0]),
            "output at {} is not a subsequence of output at {}",
            tolerances[1],
            tolerances[0],
        );
    }

    // The profile is rough enough that the extremes differ.
    assert!(outputs[0].len() > outputs[TOLERANCES.len() - 1].len());
}

#[test]
fn simplifying_twice_changes_nothing() {
    let input = rolling_profile(400);
    for tolerance in TOLERANCES {
        let once = simplify(&input, tolerance).unwrap();
        let twice = simplify(&once, tolerance).unwrap();
        assert_eq!(once, twice, "tolerance {tolerance}");
    }
}

#[test]
fn zero_tolerance_drops_only_points_on_their_chord() {
    // Flat run to x=16, then a slope-4 ramp to x=24. Chords of these
    // lengths project the collinear samples without rounding.
    let input: Vec<Point> = (0..=24_usize)
        .map(|i| {
            let x = i as f64;
            let y = if i <= 16 { 0.0 } else { (x - 16.0) * 4.0 };
            Point::new(x, y, i)
        })
        .collect();

    let output = simplify(&input, 0.0).unwrap();
    let kept = indices(&output);
    assert_eq!(kept, vec![0, 16, 24]);

    for pair in kept.windows(2) {
        let (a, b) = (input[pair[0]], input[pair[1]]);
        for p in &input[pair[0] + 1..pair[1]] {
            assert!(
                segment_distance_squared(*p, a, b) == 0.0,
                "point {} dropped at zero tolerance but deviates",
                p.series_index,
            );
        }
    }
}

#[test]
fn strictly_convex_profile_keeps_everything_at_zero_tolerance() {
    let input: Vec<Point> = (0..200_usize)
        .map(|i| {
            let t = i as f64;
            Point::new(t, 0.01 * t * t, i)
        })
        .collect();
    let output = simplify(&input, 0.0).unwrap();
    assert_eq!(output.len(), input.len());
}

#[test]
fn huge_tolerance_keeps_only_endpoints() {
    let input = rolling_profile(1000);
    let output = simplify(&input, 1e6).unwrap();
    assert_eq!(indices(&output), vec![0, 999]);
}

#[test]
fn engine_can_be_shared_between_threads() {
    let input = rolling_profile(2000);
    let engine = DouglasPeuckerSimplifier::new(2.0, &input).unwrap();
    let expected = engine.retained_indices();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.retained_indices()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn long_series_with_forced_tour_boundaries() {
    let profile = rolling_profile(20_000);
    let x: Vec<f64> = profile.iter().map(|p| p.x).collect();
    let y: Vec<f64> = profile.iter().map(|p| p.y).collect();

    let forced = tour_boundary_indices(&[0, 5_000, 12_000]);
    let kept = segment_indices(&x, &y, 1.0, &forced).unwrap();

    for f in &forced {
        assert!(kept.contains(f), "forced index {f} missing");
    }
    assert_eq!(kept.first(), Some(&0));
    assert_eq!(kept.last(), Some(&19_999));
    assert!(kept.len() < 20_000);

    // Matches the engine run directly on the same points.
    let points = series_points(&x, &y).unwrap();
    let direct = DouglasPeuckerSimplifier::new(1.0, &points)
        .unwrap()
        .with_forced_indices(&forced)
        .unwrap()
        .retained_indices();
    assert_eq!(kept, direct);
}
