//! Planar convex hulls and point-in-hull tests.
//!
//! The hull is built with Andrew's monotone chain and stored counter-clockwise
//! without collinear vertices. Membership is inclusive: points on the hull
//! boundary (within a tolerance scaled to the hull size) count as inside.

use itertools::Itertools;

use crate::geometry::point::{BoundingBox, Point};
use crate::mesh_error::MeshGraphError;

/// Relative boundary tolerance, scaled by the hull diagonal.
const REL_TOL: f64 = 1e-9;

#[inline]
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x() - o.x()) * (b.y() - o.y()) - (a.y() - o.y()) * (b.x() - o.x())
}

/// A non-degenerate convex polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<Point>,
    tol: f64,
}

impl ConvexHull {
    /// Hull vertices in counter-clockwise order.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// True iff `p` lies inside or on the boundary.
    pub fn contains(&self, p: Point) -> bool {
        let n = self.vertices.len();
        (0..n).all(|i| {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            // signed distance from edge a->b, positive on the inner side
            cross(a, b, p) / a.distance(b) >= -self.tol
        })
    }
}

/// Compute the convex hull of `points`.
///
/// Fails with [`MeshGraphError::DegenerateGeometry`] when fewer than three
/// non-collinear points are available.
pub fn convex_hull(points: &[Point]) -> Result<ConvexHull, MeshGraphError> {
    let sorted: Vec<Point> = points
        .iter()
        .copied()
        .sorted_by(|a, b| a.x().total_cmp(&b.x()).then(a.y().total_cmp(&b.y())))
        .dedup()
        .collect();
    let distinct = sorted.len();
    if distinct < 3 {
        return Err(MeshGraphError::DegenerateGeometry { distinct });
    }

    let mut lower: Vec<Point> = Vec::with_capacity(distinct);
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point> = Vec::with_capacity(distinct);
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < 3 {
        return Err(MeshGraphError::DegenerateGeometry { distinct });
    }
    let diag = BoundingBox::from_points(&lower)?.diagonal();
    Ok(ConvexHull {
        vertices: lower,
        tol: REL_TOL * diag.max(f64::MIN_POSITIVE),
    })
}

/// For each of `points`, whether it lies within (or on) the convex hull of
/// `hull_points`.
///
/// Degenerate hulls (collinear or fewer than three distinct points) fall back
/// to an inclusive bounding-box test. An empty `hull_points` contains nothing.
pub fn convex_hull_contains(points: &[Point], hull_points: &[Point]) -> Vec<bool> {
    match convex_hull(hull_points) {
        Ok(hull) => points.iter().map(|&p| hull.contains(p)).collect(),
        Err(err) => {
            let Ok(bbox) = BoundingBox::from_points(hull_points) else {
                return vec![false; points.len()];
            };
            log::warn!("{err}; falling back to bounding-box containment");
            let tol = REL_TOL * bbox.diagonal().max(f64::MIN_POSITIVE);
            points.iter().map(|&p| bbox.contains(p, tol)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&p| Point::from(p)).collect()
    }

    #[test]
    fn square_hull_drops_interior_and_collinear_points() {
        let hull = convex_hull(&pts(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (0.0, 2.0),
            (1.0, 1.0),
        ]))
        .unwrap();
        assert_eq!(hull.vertices().len(), 4);
        assert_eq!(hull.vertices()[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn boundary_points_are_inside() {
        let hull = convex_hull(&pts(&[(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)])).unwrap();
        assert!(hull.contains(Point::new(1.0, 1.0)));
        assert!(hull.contains(Point::new(0.0, 0.0)));
        assert!(hull.contains(Point::new(0.5, 0.5)));
        assert!(!hull.contains(Point::new(1.5, 1.5)));
        assert!(!hull.contains(Point::new(-0.1, 0.5)));
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let err = convex_hull(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)])).unwrap_err();
        assert_eq!(err, MeshGraphError::DegenerateGeometry { distinct: 3 });
        let err = convex_hull(&pts(&[(0.0, 0.0), (0.0, 0.0)])).unwrap_err();
        assert_eq!(err, MeshGraphError::DegenerateGeometry { distinct: 1 });
    }

    #[test]
    fn degenerate_hull_falls_back_to_bounding_box() {
        let line = pts(&[(0.0, 0.0), (2.0, 2.0)]);
        let inside = convex_hull_contains(&pts(&[(1.0, 0.5), (3.0, 1.0)]), &line);
        assert_eq!(inside, vec![true, false]);
        assert_eq!(convex_hull_contains(&line, &[]), vec![false, false]);
    }
}
