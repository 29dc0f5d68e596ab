//! Validation of candidate counterexamples
//!
//! An abstract counterexample need not correspond to any concrete
//! trajectory: every edge of the reachability graph over-approximates the
//! dynamics, and a path may chain transitions that no single point can
//! follow. The check below simulates one representative point, the centre of
//! the first path box, along the path.
//!
//! The verdict is an upper Kleenean. `False` means the counterexample is
//! certainly not spurious: the representative traces the whole path into the
//! unsafe terminal. A failed trace, however, refutes nothing, since some
//! other point might follow the path, so everything else collapses to `True`
//! with the meaning "could not disprove spuriousness".

use log::debug;

use orbit_kernel::enclosure::Enclosure;
use orbit_kernel::logic::{Effort, Kleenean, UpperKleenean};
use orbit_refinement::RefinementTree;
use orbit_refinement::graph::VertexId;

/// Check whether a counterexample can be dismissed as an artefact of the
/// abstraction
///
/// `initial_set` is the region trajectories start in and `initial_image` the
/// current leaves it intersects, as maintained by the driver.
pub fn is_spurious<const N: usize>(
    rtree: &RefinementTree<N>,
    counterexample: &[VertexId],
    initial_set: &Enclosure,
    initial_image: &[VertexId],
    effort: Effort,
) -> UpperKleenean {
    let Some(&first) = counterexample.first() else {
        // nothing to trace, nothing to refute
        return UpperKleenean::new(Kleenean::True);
    };

    let Some(first_value) = rtree.node_value(first) else {
        // the path starts outside the root box: genuine exactly when the
        // initial set is not fully captured by the abstraction, i.e. some
        // image leaf holds initial points the leaf does not account for
        let not_covered = initial_image.iter().any(|&leaf| {
            rtree.node_value(leaf).is_some_and(|value| {
                !value
                    .enclosure()
                    .subset_of(initial_set, effort)
                    .definitely()
            })
        });
        return UpperKleenean::new(if not_covered {
            Kleenean::False
        } else {
            Kleenean::True
        });
    };

    let mut point = first_value.enclosure().centre();

    // the representative must be a possible starting point
    let starts_in_image = initial_image.iter().any(|&leaf| {
        rtree
            .node_value(leaf)
            .is_some_and(|value| value.enclosure().contains(&point, effort).possibly())
    });
    if !starts_in_image {
        debug!("representative {point} lies outside the initial image");
        return UpperKleenean::new(Kleenean::True);
    }

    for step in counterexample.windows(2) {
        point = rtree.dynamics().evaluate(&point);

        let follows_path = match rtree.node_value(step[1]) {
            Some(next_value) => next_value.enclosure().contains(&point, effort).possibly(),
            // the terminal is the outside vertex: the representative must
            // leave the root box
            None => (!rtree
                .root_enclosure()
                .contains(&point, effort))
            .possibly(),
        };
        if !follows_path {
            debug!("representative diverged from the path at {point}");
            return UpperKleenean::new(Kleenean::True);
        }
    }

    debug!("representative traced the counterexample to its terminal");
    UpperKleenean::new(Kleenean::False)
}
