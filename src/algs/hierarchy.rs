//! Hierarchical multiscale mesh construction.
//!
//! The builder is a small state machine:
//!
//! ```text
//! Accumulate --(plan exhausted)--> WireInterLevel --> Done
//! ```
//!
//! The level plan (node counts per level and the reason the level loop
//! stops) is computed up front by [`plan_levels`], so the stopping policy can
//! be audited and tested on its own. Each level is built independently with
//! local node ids `0..k`; only when every level exists are ids shifted into
//! one shared space and the up/down edges between neighbouring levels wired.

use serde::{Deserialize, Serialize};

use crate::algs::grid::{
    GridOptions, LatticeMesh, build_grid, grid_dims_for_spacing, validate_node_distance,
};
use crate::algs::proximity::{Connectivity, wire_lattice};
use crate::debug_invariants::DebugInvariants;
use crate::geometry::{Axis, BoundingBox, Point, PointIndex};
use crate::mesh_error::MeshGraphError;
use crate::topology::graph_set::{M2M, down_name, level_name, up_name};
use crate::topology::{EdgeKind, Graph, GraphSet, MeshEdge, MeshNode};

/// How node counts shrink from one level to the next.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSizing {
    /// Level `k` uses spacing `mesh_node_distance * factor^k`.
    #[default]
    Geometric,
    /// Node counts are exact multiples of the coarsest level's counts, so with
    /// an odd integer factor every coarse node coincides with a finer node.
    Nested,
}

/// Options for hierarchical mesh building.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyOptions {
    /// Node spacing of level 0.
    pub mesh_node_distance: f64,
    /// Spacing ratio between consecutive levels, `> 1`.
    pub level_refinement_factor: f64,
    /// Upper bound on the number of levels; `None` builds as many as fit.
    pub max_num_levels: Option<usize>,
    pub crop_to_convex_hull: bool,
    /// Same-level wiring pattern.
    pub connectivity: Connectivity,
    pub sizing: LevelSizing,
}

impl Default for HierarchyOptions {
    fn default() -> Self {
        Self {
            mesh_node_distance: 3.0,
            level_refinement_factor: 3.0,
            max_num_levels: None,
            crop_to_convex_hull: false,
            connectivity: Connectivity::default(),
            sizing: LevelSizing::default(),
        }
    }
}

impl HierarchyOptions {
    pub fn validate(&self) -> Result<(), MeshGraphError> {
        validate_node_distance(self.mesh_node_distance)?;
        let r = self.level_refinement_factor;
        if !(r.is_finite() && r > 1.0) {
            return Err(MeshGraphError::RefinementFactor(r));
        }
        if self.sizing == LevelSizing::Nested && !(r >= 3.0 && r.fract() == 0.0 && r % 2.0 == 1.0) {
            return Err(MeshGraphError::NestedRefinementFactor(r));
        }
        if let Some(0) = self.max_num_levels {
            return Err(MeshGraphError::LevelCount(0));
        }
        self.connectivity.validate()
    }
}

/// Node counts of one level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDims {
    pub level: usize,
    pub nx: usize,
    pub ny: usize,
}

/// Why no further level was built.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelStop {
    /// `max_num_levels` levels exist.
    MaxLevels,
    /// The next level would have fewer than two nodes along an axis.
    BelowMinimumNodes { level: usize, nx: usize, ny: usize },
    /// Convex hull cropping left fewer than two nodes on a coarse level.
    CroppedAway { level: usize, nodes: usize },
}

/// A cropped coarse level needs this many nodes to be kept.
const MIN_CROPPED_NODES: usize = 2;

/// Compute the per-level node counts and the stop reason.
///
/// Level 0 must fit at least 2x2 nodes; that failure is a configuration
/// error. Running out of room for coarser levels is not.
pub fn plan_levels(
    bbox: &BoundingBox,
    opts: &HierarchyOptions,
) -> Result<(Vec<LevelDims>, LevelStop), MeshGraphError> {
    opts.validate()?;
    let (nx0, ny0) = grid_dims_for_spacing(bbox, opts.mesh_node_distance)?;
    let max_reached = |levels: usize| opts.max_num_levels.is_some_and(|m| levels >= m);

    match opts.sizing {
        LevelSizing::Geometric => {
            let mut plan = vec![LevelDims {
                level: 0,
                nx: nx0,
                ny: ny0,
            }];
            loop {
                let level = plan.len();
                if max_reached(level) {
                    return Ok((plan, LevelStop::MaxLevels));
                }
                let spacing =
                    opts.mesh_node_distance * opts.level_refinement_factor.powi(level as i32);
                let nx = (bbox.extent(Axis::X) / spacing).floor() as usize;
                let ny = (bbox.extent(Axis::Y) / spacing).floor() as usize;
                if nx < 2 || ny < 2 {
                    return Ok((plan, LevelStop::BelowMinimumNodes { level, nx, ny }));
                }
                plan.push(LevelDims { level, nx, ny });
            }
        }
        LevelSizing::Nested => {
            let r = opts.level_refinement_factor as usize;
            let shrink = |n: usize, k: usize| r.checked_pow(k as u32).map_or(0, |f| n / f);
            let mut possible = 1;
            while shrink(nx0, possible) >= 2 && shrink(ny0, possible) >= 2 {
                possible += 1;
            }
            let count = opts.max_num_levels.map_or(possible, |m| m.min(possible));
            let (cx, cy) = (shrink(nx0, count - 1), shrink(ny0, count - 1));
            let plan = (0..count)
                .map(|level| {
                    let f = r.pow((count - 1 - level) as u32);
                    LevelDims {
                        level,
                        nx: cx * f,
                        ny: cy * f,
                    }
                })
                .collect();
            let stop = if max_reached(possible) {
                LevelStop::MaxLevels
            } else {
                LevelStop::BelowMinimumNodes {
                    level: possible,
                    nx: shrink(nx0, possible),
                    ny: shrink(ny0, possible),
                }
            };
            Ok((plan, stop))
        }
    }
}

/// Build the lattice of one planned level.
///
/// A coarse level that cropping empties, or leaves with a single node, ends
/// the hierarchy with [`LevelStop::CroppedAway`]. Level 0 is never dropped:
/// an empty level 0 stays an error.
pub(crate) fn build_planned_lattice(
    coords: &[Point],
    dims: LevelDims,
    crop_to_convex_hull: bool,
) -> Result<Result<LatticeMesh, LevelStop>, MeshGraphError> {
    let grid_opts = GridOptions::with_dims(dims.nx, dims.ny)
        .cropped(crop_to_convex_hull)
        .on_level(dims.level);
    let cropped_away = |nodes: usize| {
        log::debug!("level {} keeps {nodes} node(s) after cropping, stopping", dims.level);
        LevelStop::CroppedAway {
            level: dims.level,
            nodes,
        }
    };
    match build_grid(coords, &grid_opts) {
        Ok(lattice) if dims.level > 0 && lattice.graph().num_nodes() < MIN_CROPPED_NODES => {
            Ok(Err(cropped_away(lattice.graph().num_nodes())))
        }
        Ok(lattice) => Ok(Ok(lattice)),
        Err(MeshGraphError::EmptyCrop { .. }) if dims.level > 0 => Ok(Err(cropped_away(0))),
        Err(e) => Err(e),
    }
}

/// Build and wire one level with local node ids.
fn build_level(
    coords: &[Point],
    opts: &HierarchyOptions,
    dims: LevelDims,
) -> Result<Result<Graph, LevelStop>, MeshGraphError> {
    match build_planned_lattice(coords, dims, opts.crop_to_convex_hull)? {
        Ok(lattice) => wire_lattice(&lattice, opts.connectivity).map(Ok),
        Err(stop) => Ok(Err(stop)),
    }
}

/// State of a [`HierarchyBuilder`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HierarchyState {
    /// Building the next planned level.
    Accumulate,
    /// All levels exist; inter-level edges pending.
    WireInterLevel,
    Done,
}

/// Step-wise hierarchical mesh builder.
#[derive(Debug)]
pub struct HierarchyBuilder<'a> {
    coords: &'a [Point],
    opts: HierarchyOptions,
    plan: Vec<LevelDims>,
    stop: LevelStop,
    levels: Vec<Graph>,
    offsets: Vec<usize>,
    up: Vec<Graph>,
    down: Vec<Graph>,
    state: HierarchyState,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(coords: &'a [Point], opts: HierarchyOptions) -> Result<Self, MeshGraphError> {
        let bbox = BoundingBox::from_points(coords)?;
        let (plan, stop) = plan_levels(&bbox, &opts)?;
        log::debug!("hierarchy plan {plan:?}, stop {stop:?}");
        Ok(Self {
            coords,
            opts,
            plan,
            stop,
            levels: Vec::new(),
            offsets: Vec::new(),
            up: Vec::new(),
            down: Vec::new(),
            state: HierarchyState::Accumulate,
        })
    }

    pub fn state(&self) -> HierarchyState {
        self.state
    }

    pub fn plan(&self) -> &[LevelDims] {
        &self.plan
    }

    /// Number of levels built so far.
    pub fn levels_built(&self) -> usize {
        self.levels.len()
    }

    /// Advance by one transition and return the new state.
    pub fn step(&mut self) -> Result<HierarchyState, MeshGraphError> {
        match self.state {
            HierarchyState::Accumulate => match self.plan.get(self.levels.len()).copied() {
                Some(dims) => match build_level(self.coords, &self.opts, dims)? {
                    Ok(level) => self.levels.push(level),
                    Err(stop) => self.stop_accumulating(stop),
                },
                None => self.state = HierarchyState::WireInterLevel,
            },
            HierarchyState::WireInterLevel => {
                self.wire_inter_level()?;
                self.state = HierarchyState::Done;
            }
            HierarchyState::Done => {}
        }
        Ok(self.state)
    }

    /// Build every remaining level concurrently.
    #[cfg(feature = "rayon")]
    fn build_levels_parallel(&mut self) -> Result<(), MeshGraphError> {
        use rayon::prelude::*;

        if self.state != HierarchyState::Accumulate {
            return Ok(());
        }
        let (coords, opts) = (self.coords, self.opts);
        let rest: Vec<Result<Graph, LevelStop>> = self.plan[self.levels.len()..]
            .par_iter()
            .map(|&dims| build_level(coords, &opts, dims))
            .collect::<Result<_, _>>()?;
        for level in rest {
            match level {
                Ok(level) => self.levels.push(level),
                Err(stop) => {
                    self.stop_accumulating(stop);
                    return Ok(());
                }
            }
        }
        self.state = HierarchyState::WireInterLevel;
        Ok(())
    }

    /// End the level loop early; the plan shrinks to the levels built.
    fn stop_accumulating(&mut self, stop: LevelStop) {
        self.plan.truncate(self.levels.len());
        self.stop = stop;
        self.state = HierarchyState::WireInterLevel;
    }

    /// Shift level ids into one space and connect neighbouring levels.
    fn wire_inter_level(&mut self) -> Result<(), MeshGraphError> {
        let mut offset = 0;
        let mut shifted = Vec::with_capacity(self.levels.len());
        for g in &self.levels {
            self.offsets.push(offset);
            shifted.push(g.offset_ids(offset));
            offset += g.num_nodes();
        }
        self.levels = shifted;

        for (k, pair) in self.levels.windows(2).enumerate() {
            let (fine, coarse) = (&pair[0], &pair[1]);
            let coarse_nodes: Vec<&MeshNode> = coarse.nodes().collect();
            let positions: Vec<Point> = coarse_nodes.iter().map(|n| n.pos).collect();
            let index = PointIndex::new(&positions);

            let mut up = Graph::union([&fine.without_edges(), &coarse.without_edges()])?;
            let mut down = up.clone();
            for n in fine.nodes() {
                let Some((c, _)) = index.nearest(n.pos) else {
                    continue;
                };
                let edge =
                    MeshEdge::between(n, coarse_nodes[c], EdgeKind::Up { from: k, to: k + 1 });
                down.add_edge(edge.reversed(EdgeKind::Down { from: k + 1, to: k }))?;
                up.add_edge(edge)?;
            }
            log::debug!("levels {k}<->{}: {} up/down edge pairs", k + 1, up.num_edges());
            self.up.push(up);
            self.down.push(down);
        }
        Ok(())
    }

    /// Run to completion.
    pub fn run(mut self) -> Result<LevelSet, MeshGraphError> {
        #[cfg(feature = "rayon")]
        self.build_levels_parallel()?;
        while self.step()? != HierarchyState::Done {}
        let set = LevelSet {
            levels: self.levels,
            offsets: self.offsets,
            up: self.up,
            down: self.down,
            plan: self.plan,
            stop: self.stop,
        };
        set.debug_assert_invariants();
        Ok(set)
    }
}

/// Build a hierarchical mesh over `coords`.
pub fn create_hierarchical_mesh(
    coords: &[Point],
    opts: HierarchyOptions,
) -> Result<LevelSet, MeshGraphError> {
    HierarchyBuilder::new(coords, opts)?.run()
}

/// Finished hierarchy: per-level graphs plus up/down graphs, all in one id
/// space where level `k` owns ids `offsets[k]..offsets[k] + size_k`.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelSet {
    levels: Vec<Graph>,
    offsets: Vec<usize>,
    up: Vec<Graph>,
    down: Vec<Graph>,
    plan: Vec<LevelDims>,
    stop: LevelStop,
}

impl LevelSet {
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Same-level graphs, finest first.
    pub fn levels(&self) -> &[Graph] {
        &self.levels
    }

    pub fn level(&self, k: usize) -> Option<&Graph> {
        self.levels.get(k)
    }

    /// Edges from level `k` to `k + 1`.
    pub fn up(&self, k: usize) -> Option<&Graph> {
        self.up.get(k)
    }

    /// Edges from level `k + 1` to `k`.
    pub fn down(&self, k: usize) -> Option<&Graph> {
        self.down.get(k)
    }

    /// First node id of every level.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn dims(&self) -> &[LevelDims] {
        &self.plan
    }

    pub fn stop_reason(&self) -> LevelStop {
        self.stop
    }

    /// All levels and inter-level edges in one graph.
    pub fn merged(&self) -> Result<Graph, MeshGraphError> {
        Graph::union(self.levels.iter().chain(&self.up).chain(&self.down))
    }

    /// Named graphs: every level, every up/down relation and the merged `m2m`.
    pub fn to_graph_set(&self) -> Result<GraphSet, MeshGraphError> {
        let mut set = GraphSet::new();
        for (k, g) in self.levels.iter().enumerate() {
            set.insert(level_name(k), g.clone());
        }
        for (k, (up, down)) in self.up.iter().zip(&self.down).enumerate() {
            set.insert(up_name(k), up.clone());
            set.insert(down_name(k), down.clone());
        }
        set.insert(M2M, self.merged()?);
        Ok(set)
    }
}

impl DebugInvariants for LevelSet {
    fn validate_invariants(&self) -> Result<(), MeshGraphError> {
        let n = self.levels.len();
        if self.up.len() + 1 != n.max(1) || self.down.len() != self.up.len() {
            return Err(MeshGraphError::InvalidGraph(format!(
                "{n} levels with {} up and {} down graphs",
                self.up.len(),
                self.down.len()
            )));
        }
        for g in self.levels.iter().chain(&self.up).chain(&self.down) {
            g.validate_invariants()?;
        }
        for (k, up) in self.up.iter().enumerate() {
            if up.num_edges() != self.levels[k].num_nodes() {
                return Err(MeshGraphError::InvalidGraph(format!(
                    "level {k} has {} nodes but {} up edges",
                    self.levels[k].num_nodes(),
                    up.num_edges()
                )));
            }
        }
        Ok(())
    }
}
