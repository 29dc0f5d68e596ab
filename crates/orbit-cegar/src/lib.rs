//! Counterexample-guided abstraction refinement for discrete-time dynamical
//! systems
//!
//! The driver in this crate alternates three steps on a
//! [`orbit_refinement::RefinementTree`]: search the reachability graph for a
//! path from the initial region to a possibly-unsafe cell
//! ([`search::find_counterexample`]), try to validate the path with a
//! concrete trajectory ([`spurious::is_spurious`]), and refine the cells a
//! [`locator::Locator`] selects when validation fails. The loop ends with a
//! proof of safety, a concrete unsafe trajectory, or an inconclusive verdict
//! once the cell budget is exhausted.

use std::collections::BTreeMap;

use log::{debug, info};

use orbit_display_utils::join_iterator;
use orbit_kernel::enclosure::Enclosure;
use orbit_kernel::logic::{Effort, Kleenean};
use orbit_refinement::RefinementTree;
use orbit_refinement::graph::VertexId;
use orbit_refinement::strategy::RefinementStrategy;

use crate::locator::Locator;
use crate::search::find_counterexample;
use crate::spurious::is_spurious;

pub mod locator;
pub mod search;
pub mod spurious;

/// Image of the initial set, kept ordered by the stable identity of the
/// underlying tree cell so that iteration order survives refinements
type InitialImage = BTreeMap<Option<usize>, VertexId>;

/// Decide safety of a system by iterative abstraction refinement
///
/// Trajectories start anywhere in `initial_set`; the system is safe when no
/// trajectory ever leaves the safe set the tree was built with. The verdict
/// is three-valued:
///
/// - `(True, [])`: every reachable cell of the final abstraction is safe;
/// - `(False, path)`: `path` is a counterexample validated by a concrete
///   trajectory from the centre of its first cell into an unsafe terminal;
/// - `(Indeterminate, [])`: the cell budget `max_nodes` was exhausted, or
///   the locator stopped selecting refinable cells, before either proof.
///
/// A conclusive verdict on the current abstraction is always returned, even
/// when the budget is already exhausted; the budget only gates further
/// refinement.
pub fn cegar<const N: usize>(
    rtree: &mut RefinementTree<N>,
    initial_set: &Enclosure,
    effort: Effort,
    refinement: &dyn RefinementStrategy<N>,
    locator: &dyn Locator,
    max_nodes: usize,
) -> (Kleenean, Vec<VertexId>) {
    let mut initial_image: InitialImage = rtree
        .image(initial_set)
        .into_iter()
        .map(|vertex| (image_key(rtree, vertex), vertex))
        .collect();

    loop {
        info!(
            "searching the abstraction with {} cells, {} of them in the initial image",
            rtree.node_count(),
            initial_image.len()
        );
        let image: Vec<VertexId> = initial_image.values().copied().collect();

        let counterexample = find_counterexample(rtree, &image);
        if counterexample.is_empty() {
            info!("every cell reachable from the initial image is safe");
            return (Kleenean::True, Vec::new());
        }
        debug!(
            "candidate counterexample: {}",
            join_iterator(counterexample.iter(), " → ")
        );

        let spurious = is_spurious(rtree, &counterexample, initial_set, &image, effort);
        let terminal = *counterexample
            .last()
            .expect("a non-empty counterexample has a terminal");
        if (!spurious).definitely() && (!rtree.is_safe(terminal)).definitely() {
            info!("counterexample validated by a concrete trajectory");
            return (Kleenean::False, counterexample);
        }

        if rtree.node_count() >= max_nodes {
            info!("cell budget of {max_nodes} exhausted, giving up");
            return (Kleenean::Indeterminate, Vec::new());
        }

        let mut refined_any = false;
        for target in locator.locate(&counterexample) {
            // a duplicate selection may have been invalidated by an earlier
            // refinement in this round; the outside vertex is never refinable
            if !rtree.leaf_mapping().contains(target) {
                continue;
            }
            let Some(position) = rtree.tree_position(target) else {
                continue;
            };

            let was_in_image = initial_image
                .remove(&Some(position.index()))
                .is_some();

            rtree.refine(target, refinement);
            refined_any = true;

            if was_in_image {
                for vertex in rtree.image_under(initial_set, position) {
                    initial_image.insert(image_key(rtree, vertex), vertex);
                }
            }
        }

        if !refined_any {
            info!("locator selected nothing refinable, giving up");
            return (Kleenean::Indeterminate, Vec::new());
        }
    }
}

/// Ordering key of an initial-image entry: cells order by their stable tree
/// id, the outside vertex before all of them
fn image_key<const N: usize>(rtree: &RefinementTree<N>, vertex: VertexId) -> Option<usize> {
    rtree.tree_position(vertex).map(|node| node.index())
}

#[cfg(test)]
mod tests {
    use orbit_kernel::constraint::{AxisRange, ConstraintSet};
    use orbit_kernel::enclosure::Enclosure;
    use orbit_kernel::interval::Interval;
    use orbit_kernel::logic::{Effort, Kleenean};
    use orbit_kernel::map::AffineMap;
    use orbit_kernel::scalar::{fraction, integer};
    use orbit_refinement::RefinementTree;
    use orbit_refinement::graph::VertexId;
    use orbit_refinement::strategy::Bisection;

    use crate::cegar;
    use crate::locator::{AllButTerminal, Locator};

    fn bx(bounds: &[(i64, i64)]) -> Enclosure {
        Enclosure::new(
            bounds
                .iter()
                .map(|(lo, hi)| Interval::new(integer(*lo), integer(*hi)))
                .collect(),
        )
    }

    fn band(lo: i64, hi: i64) -> ConstraintSet {
        ConstraintSet::new(vec![AxisRange::between(integer(lo), integer(hi)).unwrap()]).unwrap()
    }

    /// Locator that never selects anything
    struct NoOp;

    impl Locator for NoOp {
        fn locate(&self, _path: &[VertexId]) -> Vec<VertexId> {
            Vec::new()
        }
    }

    #[test]
    fn test_noop_locator_leaves_the_tree_unchanged() {
        let mut rtree: RefinementTree<2> = RefinementTree::new(
            bx(&[(0, 2)]),
            band(0, 1),
            Box::new(AffineMap::identity(1)),
            Effort::default(),
        )
        .unwrap();

        let (verdict, path) = cegar(
            &mut rtree,
            &bx(&[(0, 2)]),
            Effort::default(),
            &Bisection,
            &NoOp,
            64,
        );

        assert_eq!(verdict, Kleenean::Indeterminate);
        assert!(path.is_empty());
        assert_eq!(rtree.node_count(), 1);
    }

    #[test]
    fn test_initial_image_is_refreshed_across_refinements() {
        // the initial set straddles the first split, so its image must be
        // rebuilt from the children for the verdict to be found
        let mut rtree: RefinementTree<2> = RefinementTree::new(
            bx(&[(0, 2)]),
            band(0, 1),
            Box::new(AffineMap::identity(1)),
            Effort::default(),
        )
        .unwrap();
        let initial = Enclosure::new(vec![Interval::new(fraction(1, 2), fraction(3, 2))]);

        let (verdict, path) = cegar(
            &mut rtree,
            &initial,
            Effort::default(),
            &Bisection,
            &AllButTerminal,
            16,
        );

        assert_eq!(verdict, Kleenean::False);
        assert_eq!(
            rtree.node_value(*path.last().unwrap()).unwrap().enclosure(),
            &bx(&[(1, 2)])
        );
    }
}
