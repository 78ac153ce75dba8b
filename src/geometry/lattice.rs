//! Regular lattice coordinates.

use crate::geometry::point::{Axis, BoundingBox, Point};

/// Evenly spaced values spanning `[lo, hi]` inclusive; a single value sits at
/// the midpoint.
fn linspace(lo: f64, hi: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (hi - lo) / (n - 1) as f64 } else { 0.0 };
    let start = if n > 1 { lo } else { 0.5 * (lo + hi) };
    (0..n).map(move |i| start + step * i as f64)
}

/// `nx * ny` lattice coordinates spanning `bbox` inclusive of both ends.
///
/// Ordering is row-major: slot `j * nx + i` holds column `i` of row `j`, with
/// rows ordered by increasing y.
pub fn regular_grid_coordinates(nx: usize, ny: usize, bbox: &BoundingBox) -> Vec<Point> {
    let xs: Vec<f64> = linspace(bbox.min.coord(Axis::X), bbox.max.coord(Axis::X), nx).collect();
    let mut out = Vec::with_capacity(nx * ny);
    for y in linspace(bbox.min.coord(Axis::Y), bbox.max.coord(Axis::Y), ny) {
        out.extend(xs.iter().map(|&x| Point::new(x, y)));
    }
    out
}

/// Row-major lattice slot of column `i`, row `j`.
#[inline]
pub const fn lattice_slot(nx: usize, i: usize, j: usize) -> usize {
    j * nx + i
}
