//! Structural invariants of the refinement tree, checked after sequences of
//! refinements on one- and two-dimensional systems.

use orbit_kernel::constraint::{AxisRange, ConstraintSet};
use orbit_kernel::enclosure::Enclosure;
use orbit_kernel::interval::Interval;
use orbit_kernel::logic::Effort;
use orbit_kernel::map::{AffineMap, BoxMap};
use orbit_kernel::scalar::{Scalar, fraction, integer};
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

fn volume(enclosure: &Enclosure) -> Scalar {
    enclosure
        .intervals()
        .map(Interval::width)
        .fold(integer(1), |acc, width| acc * width)
}

/// The current tree leaves and the graph vertex values must stay in
/// bijection, with the outside vertex as the only extra vertex.
fn assert_leaf_vertex_bijection<const N: usize>(rtree: &RefinementTree<N>) {
    let mut tree_leaves: Vec<_> = rtree
        .tree()
        .leaves_below(rtree.tree().root())
        .into_iter()
        .collect();
    tree_leaves.sort();

    let mut graph_positions: Vec<_> = rtree
        .leaf_mapping()
        .vertices()
        .filter_map(|vertex| rtree.tree_position(vertex))
        .collect();
    graph_positions.sort();

    assert_eq!(tree_leaves, graph_positions);
    assert_eq!(
        rtree.leaf_mapping().vertex_count(),
        tree_leaves.len() + 1,
        "expected exactly one vertex per leaf plus the outside vertex"
    );
}

/// Children of every interior node must tile their parent: each child lies
/// inside the parent, the children are pairwise interior-disjoint and their
/// volumes add up to the parent's volume.
fn assert_partition<const N: usize>(rtree: &RefinementTree<N>) {
    let effort = rtree.effort();
    let tree = rtree.tree();
    for node in tree.node_ids() {
        let Some(children) = tree.children(node) else {
            continue;
        };
        let parent_box = tree.value(node).enclosure();

        let mut child_volumes: Scalar = integer(0);
        for &child in children {
            let child_box = tree.value(child).enclosure();
            assert!(
                child_box.subset_of(parent_box, effort).definitely(),
                "child {child_box} escapes its parent {parent_box}"
            );
            child_volumes = child_volumes + volume(child_box);
        }
        assert_eq!(
            child_volumes,
            volume(parent_box),
            "children do not cover their parent {parent_box}"
        );

        for (i, &a) in children.iter().enumerate() {
            for &b in &children[i + 1..] {
                let box_a = tree.value(a).enclosure();
                let box_b = tree.value(b).enclosure();
                assert!(
                    !box_a.overlaps(box_b, effort).possibly(),
                    "children {box_a} and {box_b} overlap"
                );
            }
        }
    }
}

/// Every edge of the graph must be justified by the dynamics: the image of
/// the source box meets the target box, or leaves the root box for edges
/// into the outside vertex.
fn assert_edge_soundness<const N: usize>(rtree: &RefinementTree<N>) {
    let effort = rtree.effort();
    for source in rtree.leaf_mapping().vertices() {
        let Some(source_value) = rtree.node_value(source) else {
            assert_eq!(
                rtree.postimage(source).len(),
                0,
                "the outside vertex has no successors"
            );
            continue;
        };
        let mapped = rtree.dynamics().image(source_value.enclosure());
        for target in rtree.postimage(source) {
            match rtree.node_value(target) {
                Some(target_value) => assert!(
                    mapped
                        .overlaps(target_value.enclosure(), effort)
                        .possibly(),
                    "edge {source} → {target} has no witness in the dynamics"
                ),
                None => assert!(
                    !mapped
                        .subset_of(rtree.root_enclosure(), effort)
                        .definitely(),
                    "edge {source} → outside but the image stays in the root box"
                ),
            }
        }
    }
}

fn assert_all_invariants<const N: usize>(rtree: &RefinementTree<N>) {
    assert_leaf_vertex_bijection(rtree);
    assert_partition(rtree);
    assert_edge_soundness(rtree);
}

#[test]
fn test_invariants_one_dimensional_contraction() {
    let mut rtree: RefinementTree<2> = RefinementTree::new(
        bx(&[(-2, 2)]),
        ConstraintSet::new(vec![AxisRange::between(integer(-1), integer(1)).unwrap()]).unwrap(),
        Box::new(AffineMap::line(fraction(1, 2), integer(0))),
        Effort::default(),
    )
    .unwrap();
    assert_all_invariants(&rtree);

    let root = rtree.leaves()[0];
    let [left, right] = rtree.refine(root, &Bisection);
    assert_all_invariants(&rtree);

    rtree.refine(left, &Bisection);
    assert_all_invariants(&rtree);

    let [right_lower, _] = rtree.refine(right, &Bisection);
    assert_all_invariants(&rtree);

    rtree.refine(right_lower, &Bisection);
    assert_all_invariants(&rtree);
}

#[test]
fn test_invariants_one_dimensional_drift() {
    let mut rtree: RefinementTree<2> = RefinementTree::new(
        bx(&[(-10, 10)]),
        ConstraintSet::new(vec![AxisRange::at_least(integer(0))]).unwrap(),
        Box::new(AffineMap::line(integer(1), integer(1))),
        Effort::default(),
    )
    .unwrap();
    assert_all_invariants(&rtree);

    let root = rtree.leaves()[0];
    let [_, positive] = rtree.refine(root, &Bisection);
    assert_all_invariants(&rtree);

    let [lower, upper] = rtree.refine(positive, &Bisection);
    assert_all_invariants(&rtree);

    rtree.refine(lower, &Bisection);
    rtree.refine(upper, &Bisection);
    assert_all_invariants(&rtree);
}

#[test]
fn test_invariants_two_dimensional_rotation() {
    let quarter_turn_halving = AffineMap::new(
        vec![
            vec![integer(0), fraction(-1, 2)],
            vec![fraction(1, 2), integer(0)],
        ],
        vec![integer(0), integer(0)],
    )
    .unwrap();

    let mut rtree: RefinementTree<2> = RefinementTree::new(
        bx(&[(-2, 2), (-2, 2)]),
        ConstraintSet::new(vec![
            AxisRange::between(integer(-1), integer(1)).unwrap(),
            AxisRange::between(integer(-1), integer(1)).unwrap(),
        ])
        .unwrap(),
        Box::new(quarter_turn_halving),
        Effort::default(),
    )
    .unwrap();
    assert_all_invariants(&rtree);

    let root = rtree.leaves()[0];
    let children = rtree.refine(root, &Bisection);
    assert_all_invariants(&rtree);

    for child in children {
        rtree.refine(child, &Bisection);
        assert_all_invariants(&rtree);
    }
}

#[test]
fn test_safety_is_monotone_under_refinement() {
    // a definitely safe cell can only produce definitely safe children
    let mut rtree: RefinementTree<2> = RefinementTree::new(
        bx(&[(0, 1)]),
        ConstraintSet::new(vec![AxisRange::between(integer(-1), integer(2)).unwrap()]).unwrap(),
        Box::new(AffineMap::identity(1)),
        Effort::default(),
    )
    .unwrap();

    let root = rtree.leaves()[0];
    assert!(rtree.is_safe(root).definitely());

    let children = rtree.refine(root, &Bisection);
    for child in children {
        assert!(rtree.is_safe(child).definitely());
        let grandchildren = rtree.refine(child, &Bisection);
        for grandchild in grandchildren {
            assert!(rtree.is_safe(grandchild).definitely());
        }
    }
}
