//! Compact tree layout.
//!
//! Arranges a spanning tree of the parent's children in levels below (or to
//! the right of) its root. Each subtree is packed into the smallest span
//! that holds its widest level, and every parent is centered over the block
//! formed by its children. The root keeps the position it already has, so
//! repeated runs are stable.

use indexmap::IndexMap;
use log::debug;

use trellis_core::{CellId, Geometry, Point, Rectangle};

use crate::error::TrellisError;
use crate::graph::Graph;
use crate::layout::sorter::{sort_by_weight, WeightedCellSorter};
use crate::layout::Layout;

pub struct CompactTreeLayout {
    level_distance: f64,
    node_distance: f64,
    /// Grow rightwards instead of downwards.
    horizontal: bool,
    /// Treat edges as pointing from child to parent.
    invert: bool,
    /// Order each node's children by connection count before placing them.
    sort_edges: bool,
}

impl Default for CompactTreeLayout {
    fn default() -> Self {
        Self {
            level_distance: 40.0,
            node_distance: 20.0,
            horizontal: false,
            invert: false,
            sort_edges: false,
        }
    }
}

struct TreeNode {
    cell: CellId,
    bounds: Rectangle,
    depth: usize,
    children: Vec<usize>,
    /// Cross-axis span of the subtree rooted here.
    extent: f64,
}

impl CompactTreeLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance between the origins of successive levels.
    pub fn with_level_distance(mut self, distance: f64) -> Self {
        self.level_distance = distance;
        self
    }

    /// Minimum cross-axis gap reserved around each node.
    pub fn with_node_distance(mut self, distance: f64) -> Self {
        self.node_distance = distance;
        self
    }

    pub fn with_horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn with_sort_edges(mut self, sort_edges: bool) -> Self {
        self.sort_edges = sort_edges;
        self
    }

    pub fn level_distance(&self) -> f64 {
        self.level_distance
    }

    pub fn node_distance(&self) -> f64 {
        self.node_distance
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Collects the spanning tree below `root`, restricted to vertices that
    /// are direct children of the layout parent. Traversal order fixes the
    /// sibling order unless edge sorting rearranges it.
    fn collect(&self, graph: &Graph, parent: CellId, root: CellId) -> Vec<TreeNode> {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut index: IndexMap<CellId, usize> = IndexMap::new();

        graph.traverse(root, true, self.invert, |cell, via| {
            if graph.model().parent(cell) != Some(parent) {
                return false;
            }
            let bounds = graph
                .model()
                .cell(cell)
                .and_then(|c| c.geometry())
                .map(Geometry::bounds)
                .unwrap_or_default();
            let tree_parent = via
                .and_then(|edge| graph.model().opposite(edge, cell))
                .and_then(|p| index.get(&p).copied());
            let depth = tree_parent.map_or(0, |p| nodes[p].depth + 1);
            let idx = nodes.len();
            index.insert(cell, idx);
            if let Some(p) = tree_parent {
                nodes[p].children.push(idx);
            }
            nodes.push(TreeNode {
                cell,
                bounds,
                depth,
                children: Vec::new(),
                extent: 0.0,
            });
            true
        });

        if self.sort_edges {
            for i in 0..nodes.len() {
                let mut sorters: Vec<WeightedCellSorter> = nodes[i]
                    .children
                    .iter()
                    .map(|&child| {
                        let weight = graph.model().connected_edges(nodes[child].cell).len();
                        let mut sorter = WeightedCellSorter::new(nodes[child].cell, weight as f64);
                        sorter.set_rank_index(Some(child));
                        sorter
                    })
                    .collect();
                sort_by_weight(&mut sorters);
                nodes[i].children = sorters
                    .iter()
                    .map(|s| s.rank_index().expect("rank index set above"))
                    .collect();
            }
        }
        nodes
    }

    fn cross_size(&self, bounds: Rectangle) -> f64 {
        if self.horizontal {
            bounds.height()
        } else {
            bounds.width()
        }
    }

    fn layout_tree(
        &self,
        graph: &mut Graph,
        parent: CellId,
        root: CellId,
    ) -> Result<(), TrellisError> {
        let mut nodes = self.collect(graph, parent, root);
        if nodes.is_empty() {
            return Ok(());
        }

        // children always follow their parent in collection order, so one
        // reverse pass accumulates subtree extents bottom-up
        for i in (0..nodes.len()).rev() {
            let own = self.cross_size(nodes[i].bounds) + self.node_distance;
            let sum: f64 = nodes[i].children.iter().map(|&c| nodes[c].extent).sum();
            nodes[i].extent = own.max(sum);
        }

        let root_bounds = nodes[0].bounds;
        let (main_origin, root_center) = if self.horizontal {
            (root_bounds.x(), root_bounds.center().y())
        } else {
            (root_bounds.y(), root_bounds.center().x())
        };

        let mut stack: Vec<(usize, f64)> = vec![(0, root_center)];
        while let Some((i, center)) = stack.pop() {
            if i != 0 {
                let bounds = nodes[i].bounds;
                let main = main_origin + nodes[i].depth as f64 * self.level_distance;
                let position = if self.horizontal {
                    Point::new(main, center - bounds.height() / 2.0)
                } else {
                    Point::new(center - bounds.width() / 2.0, main)
                };
                if position != bounds.position() {
                    set_bounds(graph, nodes[i].cell, bounds.with_position(position))?;
                }
            }

            let total: f64 = nodes[i].children.iter().map(|&c| nodes[c].extent).sum();
            let mut cursor = center - total / 2.0;
            for &child in &nodes[i].children {
                stack.push((child, cursor + nodes[child].extent / 2.0));
                cursor += nodes[child].extent;
            }
        }

        debug!(root = root.raw(), nodes = nodes.len(); "Compact tree layout placed subtree");
        Ok(())
    }
}

impl Layout for CompactTreeLayout {
    fn execute(&mut self, graph: &mut Graph, parent: CellId) -> Result<(), TrellisError> {
        let roots = graph.find_tree_roots(parent, false, self.invert);
        graph.begin_update();
        let mut result = Ok(());
        for root in roots {
            result = self.layout_tree(graph, parent, root);
            if result.is_err() {
                break;
            }
        }
        graph.end_update();
        result
    }
}

/// Replaces a cell's bounds, preserving the rest of its geometry.
pub(crate) fn set_bounds(
    graph: &mut Graph,
    cell: CellId,
    bounds: Rectangle,
) -> Result<(), TrellisError> {
    let geometry = graph
        .model()
        .cell(cell)
        .and_then(|c| c.geometry().cloned())
        .map_or_else(|| Geometry::new(bounds), |g| g.with_bounds(bounds));
    graph.model_mut().set_geometry(cell, geometry)
}
