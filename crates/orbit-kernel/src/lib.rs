//! Exact numeric kernel of the ORBIT verifier
//!
//! This crate provides the numeric substrate every other ORBIT crate builds
//! on: three-valued verdicts with an [`logic::Effort`] knob, exact rational
//! scalars, closed intervals, axis-aligned boxes ([`enclosure::Enclosure`]),
//! safe-set descriptions ([`constraint::ConstraintSet`]) and the dynamics
//! contract ([`map::BoxMap`]).
//!
//! All arithmetic in this kernel is exact: scalars are arbitrary-precision
//! rationals and every comparison resolves at any effort. Indeterminate
//! verdicts therefore originate from abstraction (a box standing in for many
//! points), not from rounding. A validated, outward-rounding kernel can be
//! substituted behind the same signatures.

pub mod constraint;
pub mod enclosure;
pub mod interval;
pub mod logic;
pub mod map;
pub mod scalar;

pub use constraint::ConstraintSet;
pub use enclosure::{Enclosure, Point};
pub use interval::Interval;
pub use logic::{Effort, Kleenean, LowerKleenean, UpperKleenean};
pub use map::{AffineMap, BoxMap};
pub use scalar::Scalar;
