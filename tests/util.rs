#![allow(dead_code)]
use std::f64::consts::PI;

use mesh_graphs::geometry::Point;

/// `nx * ny` points on `linspace(0, nx, nx) x linspace(0, ny, ny)`, row-major.
pub fn fake_xy(nx: usize, ny: usize) -> Vec<Point> {
    let axis = |n: usize| -> Vec<f64> {
        let step = n as f64 / (n - 1) as f64;
        (0..n).map(|i| i as f64 * step).collect()
    };
    let (xs, ys) = (axis(nx), axis(ny));
    ys.iter()
        .flat_map(|&y| xs.iter().map(move |&x| Point::new(x, y)))
        .collect()
}

/// `n` points on a circle, first and last coinciding.
pub fn circle(n: usize, radius: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / (n - 1) as f64;
            Point::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// Integer lattice `0..n` on both axes as `(f64, f64)` tuples.
pub fn integer_square(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .flat_map(|j| (0..n).map(move |i| (i as f64, j as f64)))
        .collect()
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Clone + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort();
    let mut b = want.to_vec();
    b.sort();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}
