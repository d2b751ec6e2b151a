// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for polyroot.

use core::fmt;

use thiserror::Error;

/// Result type alias using polyroot's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// An iterative root-finding method, as reported in [`Error::NonConvergent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Method {
    /// Newton's method.
    Newton,
    /// Halley's method.
    Halley,
    /// Brent's bracketing method.
    Brent,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Newton => "Newton's method",
            Self::Halley => "Halley's method",
            Self::Brent => "Brent's method",
        })
    }
}

/// Errors that can occur while finding roots.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// No coefficients were supplied.
    #[error("no coefficients were supplied")]
    EmptyCoefficients,

    /// Every coefficient is zero, so every value is a root.
    #[error("the polynomial is identically zero")]
    ZeroPolynomial,

    /// A coefficient is NaN or infinite.
    #[error("coefficient {index} is not finite")]
    NonFiniteCoefficient {
        /// Index of the first offending coefficient.
        index: usize,
    },

    /// The function has the same sign at both ends of a bracket.
    #[error("the interval [{lower}, {upper}] does not bracket a root")]
    NotBracketed {
        /// Lower end of the bracket.
        lower: f64,
        /// Upper end of the bracket.
        upper: f64,
    },

    /// An error tolerance that is not positive and finite.
    #[error("epsilon must be positive and finite, got {0}")]
    InvalidEpsilon(f64),

    /// An iterative method stopped without meeting its tolerance.
    ///
    /// This happens when the iteration limit is reached, when a derivative
    /// vanishes, or when the iteration stops making progress. Retrying with
    /// [`Brent`](crate::Brent) over `bracket`, when one is known, is the
    /// intended recovery.
    #[error("{method} did not converge (last estimate {estimate})")]
    NonConvergent {
        /// The method that failed.
        method: Method,
        /// The best estimate seen before giving up.
        estimate: f64,
        /// An interval that is known to contain a sign change, if the
        /// iteration saw one.
        bracket: Option<(f64, f64)>,
    },
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            Error::NonFiniteCoefficient { index: 3 }.to_string(),
            "coefficient 3 is not finite"
        );
        assert_eq!(
            Error::NotBracketed {
                lower: 1.0,
                upper: 2.5
            }
            .to_string(),
            "the interval [1, 2.5] does not bracket a root"
        );
        let e = Error::NonConvergent {
            method: Method::Newton,
            estimate: 0.5,
            bracket: None,
        };
        assert_eq!(
            e.to_string(),
            "Newton's method did not converge (last estimate 0.5)"
        );
    }
}
