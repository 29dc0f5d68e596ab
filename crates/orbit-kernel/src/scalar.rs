//! Exact rational scalars
//!
//! Every coordinate in the kernel is an arbitrary-precision rational. This
//! keeps interval endpoints, box centres and trajectory points exact under
//! the affine dynamics the verifier works with.

use core::fmt;
use std::error;

use num::{BigInt, BigRational, Zero};

/// Scalar type used throughout the kernel
pub type Scalar = BigRational;

/// Build a scalar from an integer
pub fn integer(n: i64) -> Scalar {
    Scalar::from_integer(BigInt::from(n))
}

/// Build a scalar from a numerator and denominator
///
/// Panics if the denominator is zero.
pub fn fraction(numerator: i64, denominator: i64) -> Scalar {
    Scalar::new(BigInt::from(numerator), BigInt::from(denominator))
}

/// Parse an exact scalar from a decimal string
///
/// Accepts an optional sign, an integer part and an optional fractional part,
/// e.g. `"2"`, `"-0.5"`, `"1.625"`. The result is the exact rational value of
/// the decimal, not a floating-point approximation.
///
/// # Example
///
/// ```
/// use orbit_kernel::scalar::{fraction, parse_decimal};
///
/// assert_eq!(parse_decimal("0.1").unwrap(), fraction(1, 10));
/// assert_eq!(parse_decimal("-2.5").unwrap(), fraction(-5, 2));
/// ```
pub fn parse_decimal(input: &str) -> Result<Scalar, ParseScalarError> {
    let trimmed = input.trim();

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if digits.is_empty() {
        return Err(ParseScalarError::Empty {
            input: input.to_string(),
        });
    }

    let (integer_part, fraction_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };

    if integer_part.is_empty() && fraction_part.is_empty() {
        return Err(ParseScalarError::Empty {
            input: input.to_string(),
        });
    }

    let mut numerator = BigInt::zero();
    for c in integer_part.chars().chain(fraction_part.chars()) {
        let digit = c.to_digit(10).ok_or_else(|| ParseScalarError::InvalidDigit {
            input: input.to_string(),
            found: c,
        })?;
        numerator = numerator * 10 + digit;
    }

    let denominator = num::pow(BigInt::from(10u32), fraction_part.len());

    if negative {
        numerator = -numerator;
    }

    Ok(Scalar::new(numerator, denominator))
}

/// Error that can occur when parsing a decimal scalar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseScalarError {
    /// The input contained no digits
    Empty {
        /// Input for which parsing failed
        input: String,
    },
    /// The input contained a character that is not a decimal digit
    InvalidDigit {
        /// Input for which parsing failed
        input: String,
        /// Offending character
        found: char,
    },
}

impl fmt::Display for ParseScalarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseScalarError::Empty { input } => {
                write!(f, "Cannot parse a scalar out of '{input}': no digits")
            }
            ParseScalarError::InvalidDigit { input, found } => write!(
                f,
                "Cannot parse a scalar out of '{input}': '{found}' is not a decimal digit"
            ),
        }
    }
}

impl error::Error for ParseScalarError {}
