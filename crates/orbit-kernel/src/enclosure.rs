//! Boxes and points
//!
//! An [`Enclosure`] is an axis-aligned product of closed intervals and the
//! unit of abstraction in the verifier: every node of a refinement tree
//! carries one. A [`Point`] is an exact coordinate vector; trajectory
//! simulation evaluates the dynamics on points.
//!
//! The three-valued predicates take an [`Effort`] so that an inexact kernel
//! can decide how hard to work before giving up; the exact kernel resolves
//! them at any effort.

use core::fmt;

use orbit_display_utils::{join_iterator, join_product};

use crate::interval::Interval;
use crate::logic::{Effort, LowerKleenean};
use crate::scalar::Scalar;

/// An exact point in `n`-dimensional space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    coordinates: Vec<Scalar>,
}

impl Point {
    /// Create a point from its coordinates
    ///
    /// Panics on an empty coordinate vector.
    pub fn new(coordinates: Vec<Scalar>) -> Self {
        assert!(!coordinates.is_empty(), "a point needs at least one coordinate");
        Point { coordinates }
    }

    /// Number of coordinates
    pub fn dimension(&self) -> usize {
        self.coordinates.len()
    }

    /// Coordinate along the given axis
    pub fn coordinate(&self, axis: usize) -> &Scalar {
        &self.coordinates[axis]
    }

    /// Iterator over the coordinates
    pub fn coordinates(&self) -> impl Iterator<Item = &Scalar> {
        self.coordinates.iter()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", join_iterator(self.coordinates.iter(), ", "))
    }
}

/// An axis-aligned box: the product of one closed interval per axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
    intervals: Vec<Interval>,
}

impl Enclosure {
    /// Create a box from its coordinate intervals
    ///
    /// Panics on an empty interval vector.
    pub fn new(intervals: Vec<Interval>) -> Self {
        assert!(!intervals.is_empty(), "a box needs at least one axis");
        Enclosure { intervals }
    }

    /// Number of axes
    pub fn dimension(&self) -> usize {
        self.intervals.len()
    }

    /// Interval along the given axis
    pub fn interval(&self, axis: usize) -> &Interval {
        &self.intervals[axis]
    }

    /// Iterator over the coordinate intervals
    pub fn intervals(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }

    /// Centre of the box
    pub fn centre(&self) -> Point {
        Point::new(self.intervals.iter().map(Interval::midpoint).collect())
    }

    /// Check whether the closed box contains the point
    pub fn contains(&self, point: &Point, _effort: Effort) -> LowerKleenean {
        assert_eq!(
            self.dimension(),
            point.dimension(),
            "dimension mismatch between box and point"
        );
        self.intervals
            .iter()
            .zip(point.coordinates())
            .all(|(interval, coordinate)| interval.contains(coordinate))
            .into()
    }

    /// Check whether the interiors of the two boxes intersect
    ///
    /// Boxes that only share parts of their boundary do not overlap in this
    /// sense. Reachability between leaf boxes is decided with this predicate:
    /// a transition witnessed only on a shared boundary is also witnessed by
    /// the closed box on the other side of that boundary.
    pub fn overlaps(&self, other: &Enclosure, _effort: Effort) -> LowerKleenean {
        assert_eq!(
            self.dimension(),
            other.dimension(),
            "dimension mismatch between boxes"
        );
        self.intervals
            .iter()
            .zip(other.intervals())
            .all(|(a, b)| a.overlaps(b))
            .into()
    }

    /// Check whether `self` is contained in `other` (closed containment)
    pub fn subset_of(&self, other: &Enclosure, _effort: Effort) -> LowerKleenean {
        assert_eq!(
            self.dimension(),
            other.dimension(),
            "dimension mismatch between boxes"
        );
        self.intervals
            .iter()
            .zip(other.intervals())
            .all(|(a, b)| a.subset_of(b))
            .into()
    }

    /// Check whether the two boxes are equal
    pub fn equals(&self, other: &Enclosure, _effort: Effort) -> LowerKleenean {
        (self == other).into()
    }

    /// Closed intersection of the two boxes, `None` if they are disjoint
    pub fn intersection(&self, other: &Enclosure) -> Option<Enclosure> {
        assert_eq!(
            self.dimension(),
            other.dimension(),
            "dimension mismatch between boxes"
        );
        self.intervals
            .iter()
            .zip(other.intervals())
            .map(|(a, b)| a.intersection(b))
            .collect::<Option<Vec<_>>>()
            .map(Enclosure::new)
    }
}

impl fmt::Display for Enclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_product(self.intervals.iter()))
    }
}
