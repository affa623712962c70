//! Radial tree layout.
//!
//! Places the spanning tree below the root on concentric rings, one ring
//! per depth level. A compact tree pass runs first so that each ring keeps
//! the sibling order of the tree; ring members are then spread over the
//! circle in that order. The root stays at its position and becomes the
//! common center.

use std::f64::consts::TAU;

use indexmap::IndexMap;
use log::debug;

use trellis_core::{CellId, Geometry, Point};

use crate::error::TrellisError;
use crate::graph::Graph;
use crate::layout::tree::{set_bounds, CompactTreeLayout};
use crate::layout::Layout;

pub struct RadialTreeLayout {
    tree: CompactTreeLayout,
    /// Fraction of one angular step the first ring member is rotated by.
    angle_offset: f64,
    /// Radial distance between successive rings.
    level_distance: f64,
    /// Radius of the innermost ring.
    node_distance: f64,
    row_radii: Vec<f64>,
}

impl Default for RadialTreeLayout {
    fn default() -> Self {
        Self {
            tree: CompactTreeLayout::new(),
            angle_offset: 0.5,
            level_distance: 120.0,
            node_distance: 10.0,
            row_radii: Vec::new(),
        }
    }
}

impl RadialTreeLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level_distance(mut self, distance: f64) -> Self {
        self.level_distance = distance;
        self
    }

    pub fn with_node_distance(mut self, distance: f64) -> Self {
        self.node_distance = distance;
        self
    }

    pub fn with_angle_offset(mut self, offset: f64) -> Self {
        self.angle_offset = offset;
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.tree = self.tree.with_invert(invert);
        self
    }

    /// Ring radii computed by the last run, indexed by tree depth. The root
    /// row sits at radius zero.
    pub fn row_radii(&self) -> &[f64] {
        &self.row_radii
    }

    /// Groups the spanning tree below `root` into rings by depth, keeping
    /// each ring in the left-to-right order the tree pass produced.
    fn collect_rows(&self, graph: &Graph, parent: CellId, root: CellId) -> Vec<Vec<CellId>> {
        let mut depths: IndexMap<CellId, usize> = IndexMap::new();
        let mut rows: Vec<Vec<CellId>> = Vec::new();

        graph.traverse(root, true, self.tree.is_inverted(), |cell, via| {
            if graph.model().parent(cell) != Some(parent) {
                return false;
            }
            let depth = via
                .and_then(|edge| graph.model().opposite(edge, cell))
                .and_then(|p| depths.get(&p).copied())
                .map_or(0, |d| d + 1);
            depths.insert(cell, depth);
            if rows.len() <= depth {
                rows.resize_with(depth + 1, Vec::new);
            }
            rows[depth].push(cell);
            true
        });

        let center_x = |cell: CellId| {
            graph
                .model()
                .cell(cell)
                .and_then(|c| c.geometry())
                .map_or(0.0, |g| g.bounds().center().x())
        };
        for row in &mut rows {
            row.sort_by(|&a, &b| {
                center_x(a)
                    .partial_cmp(&center_x(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        rows
    }
}

impl Layout for RadialTreeLayout {
    fn execute(&mut self, graph: &mut Graph, parent: CellId) -> Result<(), TrellisError> {
        let roots = graph.find_tree_roots(parent, false, self.tree.is_inverted());
        let Some(&root) = roots.first() else {
            self.row_radii.clear();
            return Ok(());
        };

        graph.begin_update();
        let result = (|| {
            // the tree pass fixes the angular order within each ring
            self.tree.execute(graph, parent)?;

            let center = graph
                .model()
                .cell(root)
                .and_then(|c| c.geometry())
                .map(Geometry::bounds)
                .unwrap_or_default()
                .center();
            let rows = self.collect_rows(graph, parent, root);

            self.row_radii = Vec::with_capacity(rows.len());
            self.row_radii.push(0.0);
            for depth in 1..rows.len() {
                self.row_radii
                    .push(self.node_distance + (depth - 1) as f64 * self.level_distance);
            }

            for (depth, row) in rows.iter().enumerate().skip(1) {
                let radius = self.row_radii[depth];
                let step = TAU / row.len() as f64;
                for (j, &cell) in row.iter().enumerate() {
                    let angle = (j as f64 + self.angle_offset) * step;
                    let bounds = graph
                        .model()
                        .cell(cell)
                        .and_then(|c| c.geometry())
                        .map(Geometry::bounds)
                        .unwrap_or_default();
                    let position = Point::new(
                        center.x() + radius * angle.cos() - bounds.width() / 2.0,
                        center.y() + radius * angle.sin() - bounds.height() / 2.0,
                    );
                    if position != bounds.position() {
                        set_bounds(graph, cell, bounds.with_position(position))?;
                    }
                }
            }

            debug!(root = root.raw(), rows = self.row_radii.len(); "Radial tree layout placed rings");
            Ok(())
        })();
        graph.end_update();
        result
    }
}
