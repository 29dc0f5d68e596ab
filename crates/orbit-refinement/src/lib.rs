//! Refinement tree of the ORBIT verifier
//!
//! A [`RefinementTree`] maintains two views of the same abstraction of state
//! space: a [`tree::FixedBranchTree`] recording how the initial box has been
//! decomposed into smaller boxes, and an [`graph::AdjacencyDiGraph`] over the
//! current tree leaves whose edges over-approximate the one-step transition
//! relation of the dynamics. Refining a leaf keeps both views consistent:
//! the leaf becomes interior in the tree, its graph vertex is replaced by one
//! vertex per child, and edges are recomputed against the former
//! neighbourhood of the refined leaf only.
//!
//! One distinguished graph vertex carries no tree node. It stands for the
//! complement of the root box; a leaf has an edge to it when the dynamics
//! possibly maps the leaf out of the root box. Paths ending there are
//! treated as unsafe, because nothing is known about the system outside the
//! root box.

use core::fmt;
use std::error;

use log::debug;

use orbit_kernel::constraint::ConstraintSet;
use orbit_kernel::enclosure::Enclosure;
use orbit_kernel::logic::{Effort, Kleenean, LowerKleenean, UpperKleenean};
use orbit_kernel::map::BoxMap;

use crate::graph::{AdjacencyDiGraph, VertexId};
use crate::strategy::RefinementStrategy;
use crate::tree::{FixedBranchTree, TreeNodeId};

pub mod graph;
pub mod strategy;
pub mod tree;

/// Value stored at every node of the refinement tree
///
/// Carries the node's box together with its safety verdict, computed once
/// when the node is created.
#[derive(Debug, Clone)]
pub struct TreeValue {
    enclosure: Enclosure,
    safe: LowerKleenean,
}

impl TreeValue {
    fn new(enclosure: Enclosure, constraints: &ConstraintSet, effort: Effort) -> Self {
        let safe = constraints.encloses(&enclosure, effort);
        TreeValue { enclosure, safe }
    }

    /// Box of the node
    pub fn enclosure(&self) -> &Enclosure {
        &self.enclosure
    }

    /// Safety verdict of the box: `True` when the box lies inside the safe
    /// set, `False` when it misses the safe set's interior
    pub fn is_safe(&self) -> LowerKleenean {
        self.safe
    }
}

impl fmt::Display for TreeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (safe: {})", self.enclosure, self.safe)
    }
}

/// Hierarchical decomposition of a box with a reachability graph over the
/// current decomposition cells
///
/// `N` is the branching factor of the decomposition: refining a cell always
/// produces exactly `N` children.
pub struct RefinementTree<const N: usize> {
    constraints: ConstraintSet,
    dynamics: Box<dyn BoxMap>,
    effort: Effort,
    refinements: FixedBranchTree<TreeValue, N>,
    mapping: AdjacencyDiGraph<Option<TreeNodeId>>,
    outside: VertexId,
}

impl<const N: usize> RefinementTree<N> {
    /// Create the abstraction consisting of the single cell `root_box`
    ///
    /// `root_box` bounds the portion of state space the analysis reasons
    /// about; `constraints` describe the safe region and `dynamics` the
    /// system under verification. Dimensions of the three must agree.
    pub fn new(
        root_box: Enclosure,
        constraints: ConstraintSet,
        dynamics: Box<dyn BoxMap>,
        effort: Effort,
    ) -> Result<Self, RefinementTreeSetupError> {
        if constraints.dimension() != root_box.dimension() {
            return Err(RefinementTreeSetupError::ConstraintDimensionMismatch {
                box_dimension: root_box.dimension(),
                constraint_dimension: constraints.dimension(),
            });
        }
        if dynamics.dimension() != root_box.dimension() {
            return Err(RefinementTreeSetupError::DynamicsDimensionMismatch {
                box_dimension: root_box.dimension(),
                dynamics_dimension: dynamics.dimension(),
            });
        }

        let root_value = TreeValue::new(root_box, &constraints, effort);
        let refinements = FixedBranchTree::new(root_value);

        let mut mapping = AdjacencyDiGraph::new();
        let outside = mapping.add_vertex(None);
        let root_vertex = mapping.add_vertex(Some(refinements.root()));

        let mut rtree = RefinementTree {
            constraints,
            dynamics,
            effort,
            refinements,
            mapping,
            outside,
        };

        if rtree.is_reachable(root_vertex, root_vertex).possibly() {
            rtree.mapping.add_edge(root_vertex, root_vertex);
        }
        if rtree.is_reachable(root_vertex, outside).possibly() {
            rtree.mapping.add_edge(root_vertex, outside);
        }

        Ok(rtree)
    }

    /// The decomposition tree
    pub fn tree(&self) -> &FixedBranchTree<TreeValue, N> {
        &self.refinements
    }

    /// The reachability graph over the current leaves
    pub fn leaf_mapping(&self) -> &AdjacencyDiGraph<Option<TreeNodeId>> {
        &self.mapping
    }

    /// The constraints describing the safe region
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// The dynamics of the system under verification
    pub fn dynamics(&self) -> &dyn BoxMap {
        self.dynamics.as_ref()
    }

    /// The effort every three-valued predicate is checked with
    pub fn effort(&self) -> Effort {
        self.effort
    }

    /// Box bounding the analysed portion of state space
    pub fn root_enclosure(&self) -> &Enclosure {
        self.refinements.value(self.refinements.root()).enclosure()
    }

    /// The vertex standing for the outside of the root box
    pub fn outside_vertex(&self) -> VertexId {
        self.outside
    }

    /// Total number of cells ever created, including refined ones
    pub fn node_count(&self) -> usize {
        self.refinements.len()
    }

    /// Value of the cell behind the vertex, `None` for the vertex standing
    /// for the outside of the root box
    pub fn node_value(&self, vertex: VertexId) -> Option<&TreeValue> {
        self.mapping
            .value(vertex)
            .map(|tree_node| self.refinements.value(tree_node))
    }

    /// Position of the vertex's cell in the decomposition tree
    pub fn tree_position(&self, vertex: VertexId) -> Option<TreeNodeId> {
        *self.mapping.value(vertex)
    }

    /// Check whether two vertices stand for the same box
    ///
    /// The outside vertex is equal to itself and distinct from every cell.
    pub fn nodes_equal(&self, a: VertexId, b: VertexId) -> LowerKleenean {
        match (self.node_value(a), self.node_value(b)) {
            (None, None) => LowerKleenean::new(Kleenean::True),
            (None, Some(_)) | (Some(_), None) => LowerKleenean::new(Kleenean::False),
            (Some(va), Some(vb)) => va.enclosure().equals(vb.enclosure(), self.effort),
        }
    }

    /// Safety verdict of the vertex
    ///
    /// The outside vertex is never safe: the constraints say nothing about
    /// the states beyond the root box.
    pub fn is_safe(&self, vertex: VertexId) -> LowerKleenean {
        match self.node_value(vertex) {
            None => LowerKleenean::new(Kleenean::False),
            Some(value) => value.is_safe(),
        }
    }

    /// All current leaves whose box possibly intersects `from`
    pub fn image(&self, from: &Enclosure) -> Vec<VertexId> {
        self.image_under(from, self.refinements.root())
    }

    /// All current leaves below `below` whose box possibly intersects `from`
    ///
    /// Restricting the search to a subtree is used after refining a cell to
    /// recompute only the part of an image that the refinement invalidated.
    pub fn image_under(&self, from: &Enclosure, below: TreeNodeId) -> Vec<VertexId> {
        let mut parts = Vec::new();
        self.image_recursive(from, below, &mut parts);
        parts
    }

    fn image_recursive(&self, from: &Enclosure, node: TreeNodeId, parts: &mut Vec<VertexId>) {
        let node_box = self.refinements.value(node).enclosure();
        if !from.overlaps(node_box, self.effort).possibly() {
            return;
        }
        match self.refinements.children(node) {
            None => parts.push(self.leaf_vertex(node)),
            Some(children) => {
                for &child in children {
                    self.image_recursive(from, child, parts);
                }
            }
        }
    }

    /// All current leaves
    pub fn leaves(&self) -> Vec<VertexId> {
        self.leaves_under(self.refinements.root())
    }

    /// All current leaves below the given tree node
    pub fn leaves_under(&self, below: TreeNodeId) -> Vec<VertexId> {
        self.refinements
            .leaves_below(below)
            .into_iter()
            .map(|leaf| self.leaf_vertex(leaf))
            .collect()
    }

    /// Vertices with an edge to `vertex`
    pub fn preimage(&self, vertex: VertexId) -> Vec<VertexId> {
        self.mapping.in_neighbours(vertex).collect()
    }

    /// Vertices `vertex` has an edge to
    pub fn postimage(&self, vertex: VertexId) -> Vec<VertexId> {
        self.mapping.out_neighbours(vertex).collect()
    }

    /// Check whether the dynamics possibly maps the box of `source` into the
    /// box of `target`
    ///
    /// Only non-reachability is provable: the box image over-approximates
    /// the set of successors. A transition into the outside vertex is
    /// possible when the image is not contained in the root box; the outside
    /// vertex itself has no successors the analysis reasons about.
    pub fn is_reachable(&self, source: VertexId, target: VertexId) -> UpperKleenean {
        let Some(source_value) = self.node_value(source) else {
            return UpperKleenean::new(Kleenean::False);
        };
        let mapped = self.dynamics.image(source_value.enclosure());
        match self.node_value(target) {
            Some(target_value) => {
                let overlaps = mapped.overlaps(target_value.enclosure(), self.effort);
                UpperKleenean::new(if overlaps.possibly() {
                    if overlaps.definitely() {
                        Kleenean::True
                    } else {
                        Kleenean::Indeterminate
                    }
                } else {
                    Kleenean::False
                })
            }
            None => !mapped.subset_of(self.root_enclosure(), self.effort),
        }
    }

    /// Replace a leaf cell by the partition the strategy produces
    ///
    /// The children inherit the former neighbourhood of the refined cell:
    /// for every new child, edges are recomputed against the pre- and
    /// post-image of the old leaf (the old leaf included, which at this
    /// point has been traced down to the new children, so edges among the
    /// children are found as well). Projected to the parent, any edge of a
    /// child corresponds to an edge the parent already had, which is why the
    /// recomputation can stay within the old neighbourhood. Finally the old
    /// leaf's vertex is removed, invalidating the handle passed in.
    ///
    /// Returns the vertices of the new children, in partition order.
    ///
    /// Panics when `vertex` is the outside vertex.
    pub fn refine(
        &mut self,
        vertex: VertexId,
        strategy: &dyn RefinementStrategy<N>,
    ) -> [VertexId; N] {
        let tree_node = self
            .tree_position(vertex)
            .unwrap_or_else(|| panic!("cannot refine the outside vertex {vertex}"));

        let parent_box = self.refinements.value(tree_node).enclosure().clone();
        debug!("refining cell {parent_box} into {N} parts");

        let partition = strategy.refine(&parent_box);
        let values =
            partition.map(|child_box| TreeValue::new(child_box, &self.constraints, self.effort));
        let child_nodes = self.refinements.expand(tree_node, values);

        let mut predecessors = self.preimage(vertex);
        let mut successors = self.postimage(vertex);
        // the old leaf takes part in both directions so that a former
        // self-loop is re-examined between the children
        predecessors.push(vertex);
        successors.push(vertex);

        let children = child_nodes.map(|node| self.mapping.add_vertex(Some(node)));

        for &child in &children {
            for &predecessor in &predecessors {
                for leaf in self.leaves_of_vertex(predecessor) {
                    if self.is_reachable(leaf, child).possibly() {
                        self.mapping.add_edge(leaf, child);
                    }
                }
            }
            for &successor in &successors {
                for leaf in self.leaves_of_vertex(successor) {
                    if self.is_reachable(child, leaf).possibly() {
                        self.mapping.add_edge(child, leaf);
                    }
                }
            }
        }

        self.mapping.remove_vertex(vertex);

        children
    }

    /// Graph vertex of a leaf tree node
    fn leaf_vertex(&self, leaf: TreeNodeId) -> VertexId {
        self.mapping
            .find_vertex(&Some(leaf))
            .unwrap_or_else(|| panic!("no graph vertex found for tree leaf {leaf}"))
    }

    /// Leaves a vertex stands for: the vertex itself for the outside vertex,
    /// the current leaves below its cell otherwise
    fn leaves_of_vertex(&self, vertex: VertexId) -> Vec<VertexId> {
        match self.tree_position(vertex) {
            None => vec![vertex],
            Some(tree_node) => self.leaves_under(tree_node),
        }
    }
}

/// Error reported when a refinement tree cannot be constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefinementTreeSetupError {
    /// The constraint set has a different dimension than the root box
    ConstraintDimensionMismatch {
        /// Dimension of the root box
        box_dimension: usize,
        /// Dimension of the constraint set
        constraint_dimension: usize,
    },
    /// The dynamics act on a different dimension than the root box
    DynamicsDimensionMismatch {
        /// Dimension of the root box
        box_dimension: usize,
        /// Dimension of the dynamics
        dynamics_dimension: usize,
    },
}

impl fmt::Display for RefinementTreeSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefinementTreeSetupError::ConstraintDimensionMismatch {
                box_dimension,
                constraint_dimension,
            } => write!(
                f,
                "The root box has dimension {box_dimension} but the constraints have dimension {constraint_dimension}"
            ),
            RefinementTreeSetupError::DynamicsDimensionMismatch {
                box_dimension,
                dynamics_dimension,
            } => write!(
                f,
                "The root box has dimension {box_dimension} but the dynamics act on dimension {dynamics_dimension}"
            ),
        }
    }
}

impl error::Error for RefinementTreeSetupError {}
