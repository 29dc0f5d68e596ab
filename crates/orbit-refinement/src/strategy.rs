//! Strategies for splitting a box during refinement
//!
//! A strategy turns one box into a fixed number of smaller boxes that tile
//! it. The arity is part of the trait, matching the branching factor of the
//! refinement tree, so a partition of the wrong size cannot be produced.

use orbit_kernel::enclosure::Enclosure;
use orbit_kernel::interval::Interval;

/// A rule producing an `N`-way partition of a box
///
/// The returned boxes must cover the input box and may only share boundary
/// points with each other.
pub trait RefinementStrategy<const N: usize> {
    /// Partition the box into `N` parts
    fn refine(&self, enclosure: &Enclosure) -> [Enclosure; N];
}

/// Bisection along the widest axis
///
/// Splits the box at the midpoint of its widest coordinate interval, taking
/// the first such axis when several are equally wide. This keeps boxes from
/// degenerating into slabs under repeated refinement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bisection;

impl RefinementStrategy<2> for Bisection {
    fn refine(&self, enclosure: &Enclosure) -> [Enclosure; 2] {
        let mut widest = 0;
        for (axis, interval) in enclosure.intervals().enumerate().skip(1) {
            if interval.width() > enclosure.interval(widest).width() {
                widest = axis;
            }
        }

        let interval = enclosure.interval(widest);
        let (lower, upper) = interval.split_at(&interval.midpoint());

        let mut lower_intervals = Vec::with_capacity(enclosure.dimension());
        let mut upper_intervals = Vec::with_capacity(enclosure.dimension());
        for (axis, interval) in enclosure.intervals().enumerate() {
            if axis == widest {
                lower_intervals.push(lower.clone());
                upper_intervals.push(upper.clone());
            } else {
                lower_intervals.push(interval.clone());
                upper_intervals.push(interval.clone());
            }
        }

        [
            Enclosure::new(lower_intervals),
            Enclosure::new(upper_intervals),
        ]
    }
}
