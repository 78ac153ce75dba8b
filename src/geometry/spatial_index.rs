//! Bucket-grid spatial index over a fixed point set.
//!
//! Points are hashed into square cells; radius queries scan the covering cell
//! range and nearest-neighbour queries expand ring by ring until no unseen
//! cell can hold a closer point. Results are ordered by distance and then by
//! point index, so ties resolve identically on every run.

use std::cmp::Ordering;

use hashbrown::HashMap;

use crate::geometry::point::{Axis, BoundingBox, Point};

/// Grid cell key.
type CellKey = (i64, i64);

/// A `(point index, distance)` query hit.
pub type Hit = (usize, f64);

fn by_distance_then_index(a: &Hit, b: &Hit) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

/// Spatial index over `points`, queried by position.
#[derive(Clone, Debug)]
pub struct PointIndex {
    points: Vec<Point>,
    origin: Point,
    cell_size: f64,
    cells: HashMap<CellKey, Vec<usize>>,
    lo: CellKey,
    hi: CellKey,
}

impl PointIndex {
    /// Index `points`; the cell size targets about one point per cell.
    pub fn new(points: &[Point]) -> Self {
        let points = points.to_vec();
        let (origin, cell_size) = match BoundingBox::from_points(&points) {
            Ok(bbox) => {
                let (ex, ey) = (bbox.extent(Axis::X), bbox.extent(Axis::Y));
                let n = points.len() as f64;
                let size = if ex > 0.0 && ey > 0.0 {
                    (ex * ey / n).sqrt()
                } else {
                    ex.max(ey) / n
                };
                (bbox.min, if size > 0.0 { size } else { 1.0 })
            }
            Err(_) => (Point::default(), 1.0),
        };
        let mut index = Self {
            points: Vec::new(),
            origin,
            cell_size,
            cells: HashMap::new(),
            lo: (0, 0),
            hi: (0, 0),
        };
        for (i, &p) in points.iter().enumerate() {
            let key = index.cell_of(p);
            if i == 0 {
                index.lo = key;
                index.hi = key;
            }
            index.lo = (index.lo.0.min(key.0), index.lo.1.min(key.1));
            index.hi = (index.hi.0.max(key.0), index.hi.1.max(key.1));
            index.cells.entry(key).or_default().push(i);
        }
        index.points = points;
        index
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, i: usize) -> Point {
        self.points[i]
    }

    fn cell_of(&self, p: Point) -> CellKey {
        (
            ((p.x() - self.origin.x()) / self.cell_size).floor() as i64,
            ((p.y() - self.origin.y()) / self.cell_size).floor() as i64,
        )
    }

    fn scan_cell(&self, key: CellKey, center: Point, out: &mut Vec<Hit>) {
        if let Some(ids) = self.cells.get(&key) {
            out.extend(ids.iter().map(|&i| (i, center.distance(self.points[i]))));
        }
    }

    /// All points within `radius` (inclusive) of `center`.
    pub fn within_radius(&self, center: Point, radius: f64) -> Vec<Hit> {
        if self.is_empty() || !(radius >= 0.0) {
            return Vec::new();
        }
        let lo = self.cell_of(Point::new(center.x() - radius, center.y() - radius));
        let hi = self.cell_of(Point::new(center.x() + radius, center.y() + radius));
        let mut hits = Vec::new();
        for cx in lo.0.max(self.lo.0)..=hi.0.min(self.hi.0) {
            for cy in lo.1.max(self.lo.1)..=hi.1.min(self.hi.1) {
                self.scan_cell((cx, cy), center, &mut hits);
            }
        }
        hits.retain(|&(_, d)| d <= radius);
        hits.sort_by(by_distance_then_index);
        hits
    }

    /// The `k` points closest to `center` (fewer if the index is smaller).
    pub fn nearest_k(&self, center: Point, k: usize) -> Vec<Hit> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }
        let c = self.cell_of(center);
        // Chebyshev ring radius after which every occupied cell has been visited.
        let last_ring = [
            (c.0 - self.lo.0).abs(),
            (self.hi.0 - c.0).abs(),
            (c.1 - self.lo.1).abs(),
            (self.hi.1 - c.1).abs(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);

        let mut hits: Vec<Hit> = Vec::new();
        for ring in 0..=last_ring {
            if ring == 0 {
                self.scan_cell(c, center, &mut hits);
            } else {
                for d in -ring..=ring {
                    self.scan_cell((c.0 + d, c.1 - ring), center, &mut hits);
                    self.scan_cell((c.0 + d, c.1 + ring), center, &mut hits);
                }
                for d in (-ring + 1)..ring {
                    self.scan_cell((c.0 - ring, c.1 + d), center, &mut hits);
                    self.scan_cell((c.0 + ring, c.1 + d), center, &mut hits);
                }
            }
            if hits.len() >= k {
                hits.sort_by(by_distance_then_index);
                // unseen points lie at least `ring` whole cells away
                if hits[k - 1].1 < ring as f64 * self.cell_size {
                    break;
                }
            }
        }
        hits.sort_by(by_distance_then_index);
        hits.truncate(k);
        hits
    }

    /// The single closest point to `center`.
    pub fn nearest(&self, center: Point) -> Option<Hit> {
        self.nearest_k(center, 1).into_iter().next()
    }
}
