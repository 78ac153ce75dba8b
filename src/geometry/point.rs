//! `Point`: an immutable planar coordinate, plus the bounding box and axis
//! helpers the builders use to size lattices.
//!
//! Input coordinates reach the crate in many shapes (tuples, fixed arrays,
//! vectors, slices of any primitive numeric type). [`ToPoint`] funnels them all
//! into the same `f64` representation so identical numbers always produce
//! identical nodes and edge attributes.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshGraphError;

/// A 2D coordinate. Immutable once constructed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn x(self) -> f64 {
        self.x
    }

    #[inline]
    pub const fn y(self) -> f64 {
        self.y
    }

    /// Coordinate along `axis`.
    #[inline]
    pub const fn coord(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Componentwise `self - other`.
    #[inline]
    pub fn sub(self, other: Point) -> [f64; 2] {
        [self.x - other.x, self.y - other.y]
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    #[inline]
    pub fn distance_squared(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        p.to_array()
    }
}

/// Anything that can be read as a 2D coordinate.
pub trait ToPoint {
    /// Convert to a [`Point`], or describe why the value is not a 2D coordinate.
    fn to_point(&self) -> Result<Point, String>;
}

fn component<T: ToPrimitive>(value: &T, name: &str) -> Result<f64, String> {
    value
        .to_f64()
        .ok_or_else(|| format!("{name} component is not representable as f64"))
}

fn from_components<T: ToPrimitive>(values: &[T]) -> Result<Point, String> {
    match values {
        [x, y] => Ok(Point::new(component(x, "x")?, component(y, "y")?)),
        _ => Err(format!("expected 2 components, got {}", values.len())),
    }
}

impl ToPoint for Point {
    fn to_point(&self) -> Result<Point, String> {
        Ok(*self)
    }
}

impl<T: ToPrimitive> ToPoint for (T, T) {
    fn to_point(&self) -> Result<Point, String> {
        Ok(Point::new(component(&self.0, "x")?, component(&self.1, "y")?))
    }
}

impl<T: ToPrimitive> ToPoint for [T; 2] {
    fn to_point(&self) -> Result<Point, String> {
        from_components(self.as_slice())
    }
}

impl<T: ToPrimitive> ToPoint for [T] {
    fn to_point(&self) -> Result<Point, String> {
        from_components(self)
    }
}

impl<T: ToPrimitive> ToPoint for Vec<T> {
    fn to_point(&self) -> Result<Point, String> {
        from_components(self.as_slice())
    }
}

impl<P: ToPoint + ?Sized> ToPoint for &P {
    fn to_point(&self) -> Result<Point, String> {
        (**self).to_point()
    }
}

/// Read a coordinate set of any supported shape into finite points.
///
/// Fails with [`MeshGraphError::InvalidCoordinate`] naming the first bad
/// index; an empty input is allowed here and rejected by the builders.
pub fn points_from<I>(items: I) -> Result<Vec<Point>, MeshGraphError>
where
    I: IntoIterator,
    I::Item: ToPoint,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let p = item
                .to_point()
                .map_err(|reason| MeshGraphError::InvalidCoordinate { index, reason })?;
            if !p.is_finite() {
                return Err(MeshGraphError::InvalidCoordinate {
                    index,
                    reason: format!("non-finite value {p}"),
                });
            }
            Ok(p)
        })
        .collect()
}

/// Coordinate axis, used in sizing diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Axis-aligned bounding box, inclusive on both ends.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// Tight box around `points`.
    pub fn from_points(points: &[Point]) -> Result<Self, MeshGraphError> {
        let first = *points.first().ok_or(MeshGraphError::EmptyCoordinates)?;
        let (mut lo, mut hi) = (first.to_array(), first.to_array());
        for p in &points[1..] {
            lo[0] = lo[0].min(p.x());
            lo[1] = lo[1].min(p.y());
            hi[0] = hi[0].max(p.x());
            hi[1] = hi[1].max(p.y());
        }
        Ok(Self {
            min: lo.into(),
            max: hi.into(),
        })
    }

    /// `max - min` along `axis`.
    #[inline]
    pub fn extent(&self, axis: Axis) -> f64 {
        self.max.coord(axis) - self.min.coord(axis)
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        self.min.distance(self.max)
    }

    /// Shrink (positive) or grow (negative) each side by the given margins.
    pub fn inset(&self, dx: f64, dy: f64) -> Self {
        Self {
            min: Point::new(self.min.x() + dx, self.min.y() + dy),
            max: Point::new(self.max.x() - dx, self.max.y() - dy),
        }
    }

    /// Grow every side by `pad`.
    pub fn padded(&self, pad: f64) -> Self {
        self.inset(-pad, -pad)
    }

    /// Inclusive containment with absolute tolerance `tol`.
    pub fn contains(&self, p: Point, tol: f64) -> bool {
        p.x() >= self.min.x() - tol
            && p.x() <= self.max.x() + tol
            && p.y() >= self.min.y() - tol
            && p.y() <= self.max.y() + tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_input_shape_gives_the_same_point() {
        let expected = Point::new(1.5, -2.0);
        assert_eq!((1.5f64, -2.0f64).to_point().unwrap(), expected);
        assert_eq!([1.5f32, -2.0f32].to_point().unwrap(), expected);
        assert_eq!(vec![1.5f64, -2.0].to_point().unwrap(), expected);
        let slice: &[f64] = &[1.5, -2.0];
        assert_eq!(slice.to_point().unwrap(), expected);
    }

    #[test]
    fn wrong_arity_and_nan_are_rejected() {
        let err = points_from(vec![vec![0.0, 1.0], vec![1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, MeshGraphError::InvalidCoordinate { index: 1, .. }));
        let err = points_from([(0.0, f64::NAN)]).unwrap_err();
        assert!(matches!(err, MeshGraphError::InvalidCoordinate { index: 0, .. }));
    }

    #[test]
    fn bounding_box_extent_and_inset() {
        let pts = points_from([(0.0, 1.0), (4.0, -1.0), (2.0, 3.0)]).unwrap();
        let bb = BoundingBox::from_points(&pts).unwrap();
        assert_eq!(bb.extent(Axis::X), 4.0);
        assert_eq!(bb.extent(Axis::Y), 4.0);
        let inner = bb.inset(1.0, 0.5);
        assert_eq!(inner.min, Point::new(1.0, -0.5));
        assert_eq!(inner.max, Point::new(3.0, 2.5));
        assert!(bb.contains(Point::new(4.0, 3.0), 0.0));
        assert!(!bb.contains(Point::new(4.1, 3.0), 0.0));
    }

    #[test]
    fn empty_box_is_an_error() {
        assert_eq!(
            BoundingBox::from_points(&[]),
            Err(MeshGraphError::EmptyCoordinates)
        );
    }
}
