// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polynomials in the Bernstein basis.

use alloc::vec::Vec;
use smallvec::{smallvec, SmallVec};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::{Polynomial, Result};

/// A polynomial in the Bernstein basis on `[0, 1]`.
///
/// With control values `b_0 … b_n`, this is `Σ b_i · C(n, i) · t^i · (1 - t)^(n - i)`.
/// The number of sign changes among the control values bounds the number of
/// roots in `[0, 1]`, and the curve starts at `b_0` and ends at `b_n`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BezierPolynomial {
    coeffs: SmallVec<[f64; 8]>,
}

impl BezierPolynomial {
    /// Creates a Bernstein polynomial from its control values.
    pub fn new(coeffs: impl IntoIterator<Item = f64>) -> Self {
        Self {
            coeffs: coeffs.into_iter().collect(),
        }
    }

    pub(crate) fn from_smallvec(coeffs: SmallVec<[f64; 8]>) -> Self {
        Self { coeffs }
    }

    /// The control values.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub(crate) fn into_coeffs(self) -> SmallVec<[f64; 8]> {
        self.coeffs
    }

    /// The degree: one less than the number of control values.
    ///
    /// Like the number of control values, this says nothing about whether the
    /// leading monomial coefficient is zero.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Returns the largest absolute value of any control value.
    pub fn magnitude(&self) -> f64 {
        self.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()))
    }

    /// Evaluates at `t` with de Casteljau's algorithm.
    pub fn eval(&self, t: f64) -> f64 {
        let mut work: SmallVec<[f64; 16]> = self.coeffs.iter().copied().collect();
        let n = work.len();
        if n == 0 {
            return 0.0;
        }
        let s = 1.0 - t;
        for k in 1..n {
            for i in 0..n - k {
                work[i] = s * work[i] + t * work[i + 1];
            }
        }
        work[0]
    }

    /// Splits at `t` into the pieces over `[0, t]` and `[t, 1]`, each
    /// reparameterized to `[0, 1]`.
    pub fn subdivide(&self, t: f64) -> (Self, Self) {
        let n = self.coeffs.len();
        if n == 0 {
            return (Self::default(), Self::default());
        }
        let mut work = self.coeffs.clone();
        let mut left: SmallVec<[f64; 8]> = SmallVec::with_capacity(n);
        let mut right: SmallVec<[f64; 8]> = smallvec![0.0; n];
        let s = 1.0 - t;
        left.push(work[0]);
        right[n - 1] = work[n - 1];
        for k in 1..n {
            for i in 0..n - k {
                work[i] = s * work[i] + t * work[i + 1];
            }
            left.push(work[0]);
            right[n - 1 - k] = work[n - 1 - k];
        }
        (Self { coeffs: left }, Self { coeffs: right })
    }

    /// The derivative, one degree lower.
    #[must_use]
    pub fn deriv(&self) -> Self {
        let n = self.degree() as f64;
        Self {
            coeffs: self.coeffs.windows(2).map(|w| n * (w[1] - w[0])).collect(),
        }
    }

    /// Converts to the monomial basis, keeping the degree.
    ///
    /// The coefficient of `t^j` is `C(n, j) · Σ_{i ≤ j} (-1)^(j - i) · C(j, i) · b_i`.
    pub fn to_monomial(&self) -> Polynomial {
        let n = self.degree();
        let mut coeffs: SmallVec<[f64; 8]> = smallvec![0.0; self.coeffs.len()];
        // C(n, j)
        let mut outer = 1.0;
        for (j, a) in coeffs.iter_mut().enumerate() {
            // C(j, i)
            let mut inner = 1.0;
            let mut sum = 0.0;
            for (i, b) in self.coeffs[..=j].iter().enumerate() {
                if (j - i) % 2 == 0 {
                    sum += inner * b;
                } else {
                    sum -= inner * b;
                }
                inner = inner * (j - i) as f64 / (i + 1) as f64;
            }
            *a = outer * sum;
            outer = outer * (n - j) as f64 / (j + 1) as f64;
        }
        Polynomial::new(coeffs)
    }

    /// Finds the roots in `[0, 1]`; see [`solve_bezier`](crate::solve_bezier).
    ///
    /// # Errors
    ///
    /// Returns an error if there are no control values, if they are all zero,
    /// or if one is not finite.
    pub fn roots(&self) -> Result<Vec<f64>> {
        crate::solve_bezier(&self.coeffs)
    }
}
