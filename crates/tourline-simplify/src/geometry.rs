//! Vector arithmetic and distance primitives over [`Point`] and [`Vector`].
//!
//! All functions are pure. Non-finite coordinates propagate through
//! IEEE-754 arithmetic and are not checked.
//!
//! Products are written as plain multiply-then-add. Retention decisions
//! compare these values exactly, so they must not depend on whether the
//! target fuses multiply-add.
#![allow(clippy::suboptimal_flops)]

use geo::CoordFloat;

use crate::types::{Point, Vector};

/// Vector from `b` to `a`.
#[must_use]
pub fn difference<T: CoordFloat>(a: Point<T>, b: Point<T>) -> Vector<T> {
    Vector::new(a.x - b.x, a.y - b.y)
}

/// Dot product.
#[must_use]
pub fn dot<T: CoordFloat>(v1: Vector<T>, v2: Vector<T>) -> T {
    v1.x * v2.x + v1.y * v2.y
}

/// `v` scaled by `t`.
#[must_use]
pub fn scale<T: CoordFloat>(v: Vector<T>, t: T) -> Vector<T> {
    Vector::new(t * v.x, t * v.y)
}

/// `p` moved by `v`. Keeps the series index of `p`.
#[must_use]
pub fn translate<T: CoordFloat>(p: Point<T>, v: Vector<T>) -> Point<T> {
    Point::new(p.x + v.x, p.y + v.y, p.series_index)
}

/// Squared Euclidean distance between two points.
#[must_use]
pub fn squared_distance<T: CoordFloat>(a: Point<T>, b: Point<T>) -> T {
    let d = difference(a, b);
    dot(d, d)
}

/// Squared distance from `p` to the segment `[a, b]`.
///
/// The projection of `p` onto the line through `a` and `b` is clamped to
/// the segment. The branch order matters: when `a == b` the chord length
/// is zero and `p - a` projects to zero, so the first branch is taken and
/// no division happens.
#[must_use]
pub fn segment_distance_squared<T: CoordFloat>(p: Point<T>, a: Point<T>, b: Point<T>) -> T {
    let u = difference(b, a);
    segment_distance_squared_with_chord(p, a, b, u, dot(u, u))
}

/// [`segment_distance_squared`] with the chord `u = b - a` and its squared
/// length `cu` precomputed, for callers measuring many points against
/// one chord.
#[must_use]
pub(crate) fn segment_distance_squared_with_chord<T: CoordFloat>(
    p: Point<T>,
    a: Point<T>,
    b: Point<T>,
    u: Vector<T>,
    cu: T,
) -> T {
    let w = difference(p, a);
    let cw = dot(w, u);

    if cw <= T::zero() {
        return squared_distance(p, a);
    }
    if cu <= cw {
        return squared_distance(p, b);
    }

    let t = cw / cu;
    let pb = translate(a, scale(u, t));
    squared_distance(p, pb)
}
