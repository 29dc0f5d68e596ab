//! Dynamics of the system under verification
//!
//! The verifier sees the dynamics through the [`BoxMap`] trait: a map that
//! can be evaluated both on boxes (producing an enclosure of the image, used
//! to approximate reachability between abstraction cells) and on points
//! (used to simulate concrete trajectories when validating counterexamples).
//!
//! [`AffineMap`] is the concrete implementation shipped with the kernel. Its
//! box evaluation is exact: the image of a box under an affine map is
//! computed componentwise with interval arithmetic, which for affine maps
//! yields the tightest axis-aligned enclosure.

use core::fmt;
use std::error;

use orbit_display_utils::join_iterator;

use crate::enclosure::{Enclosure, Point};
use crate::interval::Interval;
use crate::scalar::Scalar;

/// A discrete-time dynamical system on boxes and points
pub trait BoxMap {
    /// Dimension of the state space the map acts on
    fn dimension(&self) -> usize;

    /// An enclosure of the image of the box under the map
    fn image(&self, enclosure: &Enclosure) -> Enclosure;

    /// Exact evaluation of the map on a point
    fn evaluate(&self, point: &Point) -> Point;
}

/// The affine map `x ↦ A·x + b` with exact rational entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffineMap {
    matrix: Vec<Vec<Scalar>>,
    offset: Vec<Scalar>,
}

impl AffineMap {
    /// Create an affine map from a square matrix and an offset vector
    pub fn new(matrix: Vec<Vec<Scalar>>, offset: Vec<Scalar>) -> Result<Self, AffineMapError> {
        let dimension = offset.len();
        if dimension == 0 {
            return Err(AffineMapError::ZeroDimension);
        }
        if matrix.len() != dimension {
            return Err(AffineMapError::NotSquare {
                rows: matrix.len(),
                dimension,
            });
        }
        for (row, entries) in matrix.iter().enumerate() {
            if entries.len() != dimension {
                return Err(AffineMapError::RaggedRow {
                    row,
                    columns: entries.len(),
                    dimension,
                });
            }
        }
        Ok(AffineMap { matrix, offset })
    }

    /// The identity map of the given dimension
    pub fn identity(dimension: usize) -> Self {
        AffineMap::diagonal(vec![Scalar::from_integer(1.into()); dimension])
    }

    /// The map scaling each coordinate by its own factor
    pub fn diagonal(factors: Vec<Scalar>) -> Self {
        let dimension = factors.len();
        assert!(dimension > 0, "a map needs at least one axis");
        let matrix = factors
            .iter()
            .enumerate()
            .map(|(i, factor)| {
                let mut row = vec![Scalar::from_integer(0.into()); dimension];
                row[i] = factor.clone();
                row
            })
            .collect();
        AffineMap {
            matrix,
            offset: vec![Scalar::from_integer(0.into()); dimension],
        }
    }

    /// The translation `x ↦ x + offset`
    pub fn translation(offset: Vec<Scalar>) -> Self {
        let identity = AffineMap::identity(offset.len());
        AffineMap {
            matrix: identity.matrix,
            offset,
        }
    }

    /// The one-dimensional map `x ↦ scale · x + offset`
    pub fn line(scale: Scalar, offset: Scalar) -> Self {
        AffineMap {
            matrix: vec![vec![scale]],
            offset: vec![offset],
        }
    }
}

impl BoxMap for AffineMap {
    fn dimension(&self) -> usize {
        self.offset.len()
    }

    fn image(&self, enclosure: &Enclosure) -> Enclosure {
        assert_eq!(
            self.dimension(),
            enclosure.dimension(),
            "dimension mismatch between map and box"
        );
        let intervals = self
            .matrix
            .iter()
            .zip(self.offset.iter())
            .map(|(row, offset)| {
                row.iter()
                    .zip(enclosure.intervals())
                    .map(|(entry, interval)| interval.scale(entry))
                    .fold(Interval::point(offset.clone()), |acc, term| acc.add(&term))
            })
            .collect();
        Enclosure::new(intervals)
    }

    fn evaluate(&self, point: &Point) -> Point {
        assert_eq!(
            self.dimension(),
            point.dimension(),
            "dimension mismatch between map and point"
        );
        let coordinates = self
            .matrix
            .iter()
            .zip(self.offset.iter())
            .map(|(row, offset)| {
                row.iter()
                    .zip(point.coordinates())
                    .map(|(entry, coordinate)| entry * coordinate)
                    .fold(offset.clone(), |acc, term| acc + term)
            })
            .collect();
        Point::new(coordinates)
    }
}

impl fmt::Display for AffineMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "x ↦ A·x + b with")?;
        for (row, offset) in self.matrix.iter().zip(self.offset.iter()) {
            writeln!(f, "  [{}] + {offset}", join_iterator(row.iter(), ", "))?;
        }
        Ok(())
    }
}

/// Error that can occur when building an affine map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffineMapError {
    /// A map without any axis
    ZeroDimension,
    /// The matrix does not have one row per axis
    NotSquare {
        /// Number of rows in the supplied matrix
        rows: usize,
        /// Dimension of the offset vector
        dimension: usize,
    },
    /// A matrix row whose length differs from the dimension
    RaggedRow {
        /// Index of the offending row
        row: usize,
        /// Number of entries in the offending row
        columns: usize,
        /// Dimension of the offset vector
        dimension: usize,
    },
}

impl fmt::Display for AffineMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AffineMapError::ZeroDimension => write!(f, "An affine map needs at least one axis"),
            AffineMapError::NotSquare { rows, dimension } => write!(
                f,
                "The matrix has {rows} rows but the offset vector has dimension {dimension}"
            ),
            AffineMapError::RaggedRow {
                row,
                columns,
                dimension,
            } => write!(
                f,
                "Row {row} of the matrix has {columns} entries, expected {dimension}"
            ),
        }
    }
}

impl error::Error for AffineMapError {}
