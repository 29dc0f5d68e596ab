//! Counterexample search on the reachability graph
//!
//! A counterexample is a path of graph-adjacent leaves that starts in the
//! image of the initial set and ends in a leaf that is not definitely safe,
//! the outside vertex included. The search is a depth-first traversal that
//! prunes a branch as soon as it would revisit a box already on the current
//! path.

use log::debug;

use orbit_refinement::RefinementTree;
use orbit_refinement::graph::VertexId;

/// Find a counterexample path starting in the given image of the initial set
///
/// Returns the path in forward order, or an empty vector when every leaf
/// reachable from the image is definitely safe, which proves safety of the
/// current abstraction.
///
/// Successors are explored in the iteration order of
/// [`RefinementTree::postimage`], so the result is deterministic for a fixed
/// construction history.
pub fn find_counterexample<const N: usize>(
    rtree: &RefinementTree<N>,
    initial_image: &[VertexId],
) -> Vec<VertexId> {
    let counterexample = search(rtree, initial_image, &[]);
    if !counterexample.is_empty() {
        debug!(
            "found candidate counterexample of length {}",
            counterexample.len()
        );
    }
    counterexample
}

fn search<const N: usize>(
    rtree: &RefinementTree<N>,
    frontier: &[VertexId],
    path: &[VertexId],
) -> Vec<VertexId> {
    for &node in frontier {
        // a node equal to one on the path would close a loop
        let closes_loop = path
            .iter()
            .any(|&visited| rtree.nodes_equal(node, visited).definitely());
        if closes_loop {
            continue;
        }

        let mut extended = path.to_vec();
        extended.push(node);

        if !rtree.is_safe(node).definitely() {
            return extended;
        }

        let successors = rtree.postimage(node);
        let counterexample = search(rtree, &successors, &extended);
        if !counterexample.is_empty() {
            return counterexample;
        }
    }
    Vec::new()
}
