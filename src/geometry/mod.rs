//! Geometry utilities for mesh-graphs.
//!
//! Pure functions over planar coordinates with no graph awareness: points and
//! bounding boxes, convex hulls, lattice coordinates, edge attributes and a
//! spatial index for proximity queries.

pub mod hull;
pub mod lattice;
pub mod point;
pub mod spatial_index;

pub use hull::{ConvexHull, convex_hull, convex_hull_contains};
pub use lattice::regular_grid_coordinates;
pub use point::{Axis, BoundingBox, Point, ToPoint, points_from};
pub use spatial_index::PointIndex;

/// Length and displacement of the directed pair `a -> b`.
///
/// `length = |a - b|` and `vdiff = a - b`; the displacement is never
/// normalized.
#[inline]
pub fn pairwise_edge_attributes(pos_a: Point, pos_b: Point) -> (f64, [f64; 2]) {
    let vdiff = pos_a.sub(pos_b);
    (vdiff[0].hypot(vdiff[1]), vdiff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_attributes_keep_raw_displacement() {
        let (len, vdiff) = pairwise_edge_attributes(Point::new(4.0, 5.0), Point::new(1.0, 1.0));
        assert_eq!(len, 5.0);
        assert_eq!(vdiff, [3.0, 4.0]);
        let (back_len, back) = pairwise_edge_attributes(Point::new(1.0, 1.0), Point::new(4.0, 5.0));
        assert_eq!(back_len, len);
        assert_eq!(back, [-3.0, -4.0]);
    }
}
