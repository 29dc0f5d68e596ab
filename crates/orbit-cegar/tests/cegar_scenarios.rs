//! End-to-end verification runs of the refinement loop on one-dimensional
//! affine systems, covering the proved-safe, proved-unsafe and inconclusive
//! outcomes together with the stability of repeated runs.

use orbit_cegar::cegar;
use orbit_cegar::locator::AllButTerminal;
use orbit_kernel::constraint::{AxisRange, ConstraintSet};
use orbit_kernel::enclosure::Enclosure;
use orbit_kernel::interval::Interval;
use orbit_kernel::logic::{Effort, Kleenean};
use orbit_kernel::map::{AffineMap, BoxMap};
use orbit_kernel::scalar::{fraction, integer};
use orbit_refinement::RefinementTree;
use orbit_refinement::strategy::Bisection;

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

#[test]
fn test_trivially_safe_without_refinement() {
    // the identity keeps [0, 1] inside the safe band, the root alone proves
    // it even with the smallest possible cell budget
    let mut rtree: RefinementTree<2> = RefinementTree::new(
        bx(&[(0, 1)]),
        band(-1, 2),
        Box::new(AffineMap::identity(1)),
        Effort::default(),
    )
    .unwrap();

    let (verdict, path) = cegar(
        &mut rtree,
        &bx(&[(0, 1)]),
        Effort::default(),
        &Bisection,
        &AllButTerminal,
        1,
    );

    assert_eq!(verdict, Kleenean::True);
    assert!(path.is_empty());
    assert_eq!(rtree.node_count(), 1);
}

#[test]
fn test_immediately_unsafe() {
    // the initial box misses the safe set entirely; the root is a validated
    // one-cell counterexample
    let mut rtree: RefinementTree<2> = RefinementTree::new(
        bx(&[(0, 1)]),
        band(2, 3),
        Box::new(AffineMap::identity(1)),
        Effort::default(),
    )
    .unwrap();

    let (verdict, path) = cegar(
        &mut rtree,
        &bx(&[(0, 1)]),
        Effort::default(),
        &Bisection,
        &AllButTerminal,
        1,
    );

    assert_eq!(verdict, Kleenean::False);
    assert_eq!(path.len(), 1);
    assert_eq!(
        rtree.node_value(path[0]).unwrap().enclosure(),
        &bx(&[(0, 1)])
    );
}

#[test]
fn test_unsafe_after_one_refinement() {
    // [0, 2] straddles the safe band [0, 1]; one bisection isolates the
    // unsafe half, which then validates as a one-cell counterexample
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
        &AllButTerminal,
        3,
    );

    assert_eq!(verdict, Kleenean::False);
    assert_eq!(path.len(), 1);
    assert_eq!(
        rtree.node_value(path[0]).unwrap().enclosure(),
        &bx(&[(1, 2)])
    );
    assert_eq!(rtree.node_count(), 3);
}

#[test]
fn test_eventually_proved_safe() {
    // the contraction x/2 keeps [0, 1/2] safe, but the root box straddles
    // the safe band, so refinements have to carve out the safe region first
    let mut rtree: RefinementTree<2> = RefinementTree::new(
        bx(&[(-2, 2)]),
        band(-1, 1),
        Box::new(AffineMap::line(fraction(1, 2), integer(0))),
        Effort::default(),
    )
    .unwrap();
    let initial = Enclosure::new(vec![Interval::new(integer(0), fraction(1, 2))]);

    let (verdict, path) = cegar(
        &mut rtree,
        &initial,
        Effort::default(),
        &Bisection,
        &AllButTerminal,
        7,
    );

    assert_eq!(verdict, Kleenean::True);
    assert!(path.is_empty());
    assert!(rtree.node_count() > 1, "a proof without refinement here would be vacuous");
}

#[test]
fn test_budget_exhaustion() {
    // the same system as above cannot be decided on the root alone, and a
    // budget of one cell forbids refining it
    let mut rtree: RefinementTree<2> = RefinementTree::new(
        bx(&[(-2, 2)]),
        band(-1, 1),
        Box::new(AffineMap::line(fraction(1, 2), integer(0))),
        Effort::default(),
    )
    .unwrap();
    let initial = Enclosure::new(vec![Interval::new(integer(0), fraction(1, 2))]);

    let (verdict, path) = cegar(
        &mut rtree,
        &initial,
        Effort::default(),
        &Bisection,
        &AllButTerminal,
        1,
    );

    assert_eq!(verdict, Kleenean::Indeterminate);
    assert!(path.is_empty());
    assert_eq!(rtree.node_count(), 1);
}

#[test]
fn test_spurious_escape_is_filtered() {
    // under x + 1 with the constraint x ≥ 0 the abstraction repeatedly
    // suggests reaching the negative half or escaping the root box, but no
    // representative point from [0, 1/10] witnesses any of it within the
    // budget; the driver must keep refining instead of reporting unsafe
    let mut rtree: RefinementTree<2> = RefinementTree::new(
        bx(&[(-10, 10)]),
        ConstraintSet::new(vec![AxisRange::at_least(integer(0))]).unwrap(),
        Box::new(AffineMap::line(integer(1), integer(1))),
        Effort::default(),
    )
    .unwrap();
    let initial = Enclosure::new(vec![Interval::new(integer(0), fraction(1, 10))]);

    let (verdict, path) = cegar(
        &mut rtree,
        &initial,
        Effort::default(),
        &Bisection,
        &AllButTerminal,
        9,
    );

    assert_eq!(verdict, Kleenean::Indeterminate);
    assert!(path.is_empty());
    assert!(rtree.node_count() > 1, "the driver refined instead of giving up");
}

#[test]
fn test_proved_safe_verdict_is_stable() {
    // a larger budget cannot retract a safety proof
    for max_nodes in [1, 8, 64] {
        let mut rtree: RefinementTree<2> = RefinementTree::new(
            bx(&[(0, 1)]),
            band(-1, 2),
            Box::new(AffineMap::identity(1)),
            Effort::default(),
        )
        .unwrap();
        let (verdict, _) = cegar(
            &mut rtree,
            &bx(&[(0, 1)]),
            Effort::default(),
            &Bisection,
            &AllButTerminal,
            max_nodes,
        );
        assert_eq!(verdict, Kleenean::True);
    }
}

#[test]
fn test_unsafe_witness_traces_the_path() {
    // simulate the representative from the first path cell and check it
    // stays inside the reported path, step by step
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
        &AllButTerminal,
        8,
    );
    assert_eq!(verdict, Kleenean::False);

    let mut point = rtree.node_value(path[0]).unwrap().enclosure().centre();
    for step in path.windows(2) {
        point = rtree.dynamics().evaluate(&point);
        match rtree.node_value(step[1]) {
            Some(value) => assert!(value
                .enclosure()
                .contains(&point, Effort::default())
                .possibly()),
            None => assert!((!rtree
                .root_enclosure()
                .contains(&point, Effort::default()))
            .possibly()),
        }
    }
    // the terminal of a validated counterexample is genuinely unsafe
    assert!(!rtree.is_safe(*path.last().unwrap()).possibly());
}

#[test]
fn test_two_dimensional_contraction_is_proved_safe() {
    // componentwise halving in two dimensions, initial region already
    // inside the safe square
    let mut rtree: RefinementTree<2> = RefinementTree::new(
        bx(&[(-2, 2), (-2, 2)]),
        ConstraintSet::new(vec![
            AxisRange::between(integer(-1), integer(1)).unwrap(),
            AxisRange::between(integer(-1), integer(1)).unwrap(),
        ])
        .unwrap(),
        Box::new(AffineMap::diagonal(vec![fraction(1, 2), fraction(1, 2)])),
        Effort::default(),
    )
    .unwrap();
    let initial = Enclosure::new(vec![
        Interval::new(integer(0), fraction(1, 2)),
        Interval::new(integer(0), fraction(1, 2)),
    ]);

    let (verdict, path) = cegar(
        &mut rtree,
        &initial,
        Effort::default(),
        &Bisection,
        &AllButTerminal,
        64,
    );

    assert_eq!(verdict, Kleenean::True);
    assert!(path.is_empty());
}
