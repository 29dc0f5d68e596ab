//! Closed intervals with exact rational endpoints
//!
//! Intervals are the one-dimensional building block of enclosures. All
//! operations are exact; the comparison helpers distinguish between closed
//! intersection and overlap of interiors, which is what the abstraction
//! layers above care about when deciding reachability between boxes.

use core::fmt;

use num::Zero;

use crate::scalar::{Scalar, fraction};

/// A closed interval `[lo, hi]` with exact rational endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    lo: Scalar,
    hi: Scalar,
}

impl Interval {
    /// Create a new interval `[lo, hi]`
    ///
    /// Panics if `lo > hi`.
    pub fn new(lo: Scalar, hi: Scalar) -> Self {
        assert!(lo <= hi, "interval endpoints out of order");
        Interval { lo, hi }
    }

    /// Create the degenerate interval `[value, value]`
    pub fn point(value: Scalar) -> Self {
        Interval {
            lo: value.clone(),
            hi: value,
        }
    }

    /// Lower endpoint
    pub fn lo(&self) -> &Scalar {
        &self.lo
    }

    /// Upper endpoint
    pub fn hi(&self) -> &Scalar {
        &self.hi
    }

    /// Width `hi - lo` of the interval
    pub fn width(&self) -> Scalar {
        &self.hi - &self.lo
    }

    /// Midpoint of the interval
    pub fn midpoint(&self) -> Scalar {
        (&self.lo + &self.hi) * fraction(1, 2)
    }

    /// Split the interval at an interior point into a lower and an upper part
    ///
    /// Panics if `at` is not strictly inside the interval.
    pub fn split_at(&self, at: &Scalar) -> (Interval, Interval) {
        assert!(
            &self.lo < at && at < &self.hi,
            "split point outside the interval interior"
        );
        (
            Interval::new(self.lo.clone(), at.clone()),
            Interval::new(at.clone(), self.hi.clone()),
        )
    }

    /// Check whether the closed interval contains the scalar
    pub fn contains(&self, value: &Scalar) -> bool {
        &self.lo <= value && value <= &self.hi
    }

    /// Check whether `self` is contained in `other` (closed containment)
    pub fn subset_of(&self, other: &Interval) -> bool {
        other.lo <= self.lo && self.hi <= other.hi
    }

    /// Check whether the interiors of the two intervals intersect
    ///
    /// Intervals that merely touch at an endpoint do not overlap in this
    /// sense; their shared boundary has no interior.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.lo < other.hi && other.lo < self.hi
    }

    /// Closed intersection of the two intervals, `None` if they are disjoint
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        let lo = if self.lo >= other.lo {
            self.lo.clone()
        } else {
            other.lo.clone()
        };
        let hi = if self.hi <= other.hi {
            self.hi.clone()
        } else {
            other.hi.clone()
        };
        if lo <= hi { Some(Interval { lo, hi }) } else { None }
    }

    /// Interval sum `[lo + other.lo, hi + other.hi]`
    pub fn add(&self, other: &Interval) -> Interval {
        Interval {
            lo: &self.lo + &other.lo,
            hi: &self.hi + &other.hi,
        }
    }

    /// Translate the interval by a scalar
    pub fn translate(&self, offset: &Scalar) -> Interval {
        Interval {
            lo: &self.lo + offset,
            hi: &self.hi + offset,
        }
    }

    /// Scale the interval by a scalar, flipping the endpoints for negative
    /// factors
    pub fn scale(&self, factor: &Scalar) -> Interval {
        let a = &self.lo * factor;
        let b = &self.hi * factor;
        if factor >= &Scalar::zero() {
            Interval { lo: a, hi: b }
        } else {
            Interval { lo: b, hi: a }
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

#[cfg(test)]
mod tests {
    use crate::interval::Interval;
    use crate::scalar::{fraction, integer};

    fn iv(lo: i64, hi: i64) -> Interval {
        Interval::new(integer(lo), integer(hi))
    }

    #[test]
    fn test_accessors() {
        let i = iv(-1, 3);
        assert_eq!(i.lo(), &integer(-1));
        assert_eq!(i.hi(), &integer(3));
        assert_eq!(i.width(), integer(4));
        assert_eq!(i.midpoint(), integer(1));
        assert_eq!(iv(0, 1).midpoint(), fraction(1, 2));
    }

    #[test]
    #[should_panic(expected = "endpoints out of order")]
    fn test_new_rejects_reversed_endpoints() {
        let _ = iv(1, 0);
    }

    #[test]
    fn test_split_at() {
        let (left, right) = iv(0, 2).split_at(&integer(1));
        assert_eq!(left, iv(0, 1));
        assert_eq!(right, iv(1, 2));
    }

    #[test]
    #[should_panic(expected = "split point outside")]
    fn test_split_at_boundary_panics() {
        let _ = iv(0, 2).split_at(&integer(2));
    }

    #[test]
    fn test_contains_and_subset() {
        let i = iv(0, 2);
        assert!(i.contains(&integer(0)));
        assert!(i.contains(&integer(2)));
        assert!(i.contains(&fraction(1, 2)));
        assert!(!i.contains(&integer(3)));

        assert!(iv(0, 1).subset_of(&i));
        assert!(i.subset_of(&i));
        assert!(!iv(-1, 1).subset_of(&i));
    }

    #[test]
    fn test_overlaps_ignores_touching_boundaries() {
        assert!(iv(0, 2).overlaps(&iv(1, 3)));
        assert!(!iv(0, 1).overlaps(&iv(1, 2)));
        assert!(!iv(0, 1).overlaps(&iv(2, 3)));
        assert!(iv(0, 1).overlaps(&iv(0, 1)));
    }

    #[test]
    fn test_intersection() {
        assert_eq!(iv(0, 2).intersection(&iv(1, 3)), Some(iv(1, 2)));
        assert_eq!(iv(0, 1).intersection(&iv(1, 2)), Some(iv(1, 1)));
        assert_eq!(iv(0, 1).intersection(&iv(2, 3)), None);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(iv(0, 1).add(&iv(1, 2)), iv(1, 3));
        assert_eq!(iv(0, 1).translate(&integer(-1)), iv(-1, 0));
        assert_eq!(iv(1, 2).scale(&fraction(1, 2)), Interval::new(fraction(1, 2), integer(1)));
        assert_eq!(iv(1, 2).scale(&integer(-1)), iv(-2, -1));
    }

    #[test]
    fn test_display() {
        assert_eq!(iv(0, 1).to_string(), "[0, 1]");
        assert_eq!(
            Interval::new(fraction(-1, 2), fraction(3, 2)).to_string(),
            "[-1/2, 3/2]"
        );
    }
}
