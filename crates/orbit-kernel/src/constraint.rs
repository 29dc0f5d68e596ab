//! Safe-set descriptions
//!
//! A [`ConstraintSet`] describes the safe region of state space as a product
//! of per-axis ranges, each side either closed at a rational bound or
//! unbounded. The central predicate is [`ConstraintSet::encloses`], the
//! three-valued question "is this box inside the safe set":
//!
//! - `True`: every point of the box satisfies the constraints;
//! - `False`: the box intersects the interior of the safe set nowhere, so
//!   no neighbourhood inside the box is safe;
//! - `Indeterminate`: the box straddles the boundary of the safe set.

use core::fmt;
use std::error;

use orbit_display_utils::join_product;

use crate::enclosure::{Enclosure, Point};
use crate::interval::Interval;
use crate::logic::{Effort, Kleenean, LowerKleenean};
use crate::scalar::Scalar;

/// One side of an axis range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    /// No constraint on this side
    Unbounded,
    /// Closed constraint at the given value
    At(Scalar),
}

/// The admissible range of one coordinate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisRange {
    lower: Bound,
    upper: Bound,
}

impl AxisRange {
    /// Create a new range; the bounds must leave the range non-empty
    pub fn new(lower: Bound, upper: Bound) -> Result<Self, ConstraintSetError> {
        if let (Bound::At(lo), Bound::At(hi)) = (&lower, &upper) {
            if lo > hi {
                return Err(ConstraintSetError::EmptyRange {
                    lower: lo.clone(),
                    upper: hi.clone(),
                });
            }
        }
        Ok(AxisRange { lower, upper })
    }

    /// The unconstrained range
    pub fn all() -> Self {
        AxisRange {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// The half-line `[value, ∞[`
    pub fn at_least(value: Scalar) -> Self {
        AxisRange {
            lower: Bound::At(value),
            upper: Bound::Unbounded,
        }
    }

    /// The half-line `]-∞, value]`
    pub fn at_most(value: Scalar) -> Self {
        AxisRange {
            lower: Bound::Unbounded,
            upper: Bound::At(value),
        }
    }

    /// The closed range `[lo, hi]`
    pub fn between(lo: Scalar, hi: Scalar) -> Result<Self, ConstraintSetError> {
        AxisRange::new(Bound::At(lo), Bound::At(hi))
    }

    /// Lower bound of the range
    pub fn lower(&self) -> &Bound {
        &self.lower
    }

    /// Upper bound of the range
    pub fn upper(&self) -> &Bound {
        &self.upper
    }

    fn contains(&self, value: &Scalar) -> bool {
        let above = match &self.lower {
            Bound::Unbounded => true,
            Bound::At(lo) => lo <= value,
        };
        let below = match &self.upper {
            Bound::Unbounded => true,
            Bound::At(hi) => value <= hi,
        };
        above && below
    }

    /// Relate a coordinate interval to this range
    ///
    /// `True` if the interval lies inside the closed range, `False` if it
    /// misses the open interior of the range, `Indeterminate` otherwise.
    fn classify(&self, interval: &Interval) -> Kleenean {
        let inside_lower = match &self.lower {
            Bound::Unbounded => true,
            Bound::At(lo) => lo <= interval.lo(),
        };
        let inside_upper = match &self.upper {
            Bound::Unbounded => true,
            Bound::At(hi) => interval.hi() <= hi,
        };
        if inside_lower && inside_upper {
            return Kleenean::True;
        }

        let misses_interior = match (&self.lower, &self.upper) {
            (Bound::At(lo), _) if interval.hi() <= lo => true,
            (_, Bound::At(hi)) if hi <= interval.lo() => true,
            _ => false,
        };
        if misses_interior {
            return Kleenean::False;
        }

        Kleenean::Indeterminate
    }
}

impl fmt::Display for AxisRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Bound::Unbounded => write!(f, "[-∞, ")?,
            Bound::At(lo) => write!(f, "[{lo}, ")?,
        }
        match &self.upper {
            Bound::Unbounded => write!(f, "∞]"),
            Bound::At(hi) => write!(f, "{hi}]"),
        }
    }
}

/// The safe region of state space, a product of per-axis ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSet {
    ranges: Vec<AxisRange>,
}

impl ConstraintSet {
    /// Create a constraint set from one range per axis
    pub fn new(ranges: Vec<AxisRange>) -> Result<Self, ConstraintSetError> {
        if ranges.is_empty() {
            return Err(ConstraintSetError::ZeroDimension);
        }
        Ok(ConstraintSet { ranges })
    }

    /// Number of axes
    pub fn dimension(&self) -> usize {
        self.ranges.len()
    }

    /// Iterator over the per-axis ranges
    pub fn ranges(&self) -> impl Iterator<Item = &AxisRange> {
        self.ranges.iter()
    }

    /// Check whether the safe set encloses the box
    ///
    /// The verdict is `True` when the box is contained in the closed safe
    /// set, `False` when the box does not meet the interior of the safe set,
    /// and `Indeterminate` when the box straddles the boundary.
    pub fn encloses(&self, enclosure: &Enclosure, _effort: Effort) -> LowerKleenean {
        assert_eq!(
            self.dimension(),
            enclosure.dimension(),
            "dimension mismatch between constraints and box"
        );
        // one axis missing the interior separates the whole box, which the
        // absorbing `False` of the conjunction captures
        let verdict = self
            .ranges
            .iter()
            .zip(enclosure.intervals())
            .map(|(range, interval)| range.classify(interval))
            .fold(Kleenean::True, Kleenean::and);
        LowerKleenean::new(verdict)
    }

    /// Check whether the point satisfies the constraints
    pub fn contains_point(&self, point: &Point, _effort: Effort) -> LowerKleenean {
        assert_eq!(
            self.dimension(),
            point.dimension(),
            "dimension mismatch between constraints and point"
        );
        self.ranges
            .iter()
            .zip(point.coordinates())
            .all(|(range, coordinate)| range.contains(coordinate))
            .into()
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_product(self.ranges.iter()))
    }
}

/// Error that can occur when building a constraint set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintSetError {
    /// A range with its lower bound above its upper bound
    EmptyRange {
        /// Lower bound of the offending range
        lower: Scalar,
        /// Upper bound of the offending range
        upper: Scalar,
    },
    /// A constraint set without any axis
    ZeroDimension,
}

impl fmt::Display for ConstraintSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintSetError::EmptyRange { lower, upper } => write!(
                f,
                "The range [{lower}, {upper}] is empty: the lower bound exceeds the upper bound"
            ),
            ConstraintSetError::ZeroDimension => {
                write!(f, "A constraint set needs at least one axis")
            }
        }
    }
}

impl error::Error for ConstraintSetError {}
