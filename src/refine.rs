// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pieces shared by the scalar refiners.

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::{next_down, next_up, ulp};
use crate::{different_signs, Error, Method, Result};

/// A method for solving `f(x) = y` for a scalar function `f`.
///
/// Implementations hold the function (and any derivatives) along with an
/// error estimate and optional parameters. They keep no state between calls,
/// so a single instance can be reused.
pub trait RootFinder {
    /// The starting point: a guess for open methods, a bracket for Brent.
    type Initial;

    /// Finds `x` such that `f(x) = y`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonConvergent`] when the method fails to meet its
    /// tolerance, and [`Error::NotBracketed`] when a bracketing method is
    /// given an interval without a sign change.
    fn solve(&self, y: f64, initial: Self::Initial) -> Result<f64>;

    /// Finds `x` such that `f(x) = 0`.
    ///
    /// # Errors
    ///
    /// See [`RootFinder::solve`].
    fn find_root(&self, initial: Self::Initial) -> Result<f64> {
        self.solve(0.0, initial)
    }
}

/// An estimate of the absolute error in a computed function value.
///
/// A root is accepted once `|f(x) - y| < ulp(y) + ferror(x)`.
///
/// Any closure `Fn(f64, &P) -> f64` taking `x` and the parameters is an
/// error estimate.
pub trait ErrorEstimate<P: ?Sized> {
    /// The error of `f(x)`, where `fx` is the computed value of `f(x)`.
    fn ferror(&self, x: f64, fx: f64, parameters: &P) -> f64;
}

impl<P: ?Sized, G> ErrorEstimate<P> for G
where
    G: Fn(f64, &P) -> f64,
{
    #[inline]
    fn ferror(&self, x: f64, _fx: f64, parameters: &P) -> f64 {
        self(x, parameters)
    }
}

/// A fixed error tolerance, either absolute or relative to `|f(x)|`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Epsilon {
    value: f64,
    relative: bool,
}

impl Epsilon {
    /// The default tolerance, an absolute `1e-12`.
    pub const DEFAULT: Self = Self {
        value: 1e-12,
        relative: false,
    };

    /// An absolute tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEpsilon`] unless `value` is positive and finite.
    pub fn absolute(value: f64) -> Result<Self> {
        Self::new(value, false)
    }

    /// A tolerance relative to `|f(x)|`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEpsilon`] unless `value` is positive and finite.
    pub fn relative(value: f64) -> Result<Self> {
        Self::new(value, true)
    }

    /// A tolerance that is relative when `relative` is true.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEpsilon`] unless `value` is positive and finite.
    pub fn new(value: f64, relative: bool) -> Result<Self> {
        if value > 0.0 && value.is_finite() {
            Ok(Self { value, relative })
        } else {
            Err(Error::InvalidEpsilon(value))
        }
    }

    /// The tolerance value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether the tolerance scales with `|f(x)|`.
    pub fn is_relative(&self) -> bool {
        self.relative
    }
}

impl Default for Epsilon {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<P: ?Sized> ErrorEstimate<P> for Epsilon {
    #[inline]
    fn ferror(&self, _x: f64, fx: f64, _parameters: &P) -> f64 {
        if self.relative {
            (fx * self.value).abs()
        } else {
            self.value
        }
    }
}

/// Default iteration limit for the open methods.
pub(crate) const DEFAULT_LIMIT: usize = 128;

const REFINE_SOLUTION_LIMIT: usize = 64;

/// Polishes an approximate solution of `f(x) = y`.
///
/// Starting from `guess`, this takes Newton steps for as long as they reduce
/// `|f(x) - y|`. When a step crosses the solution, the secant point between
/// the two iterates is tried as well. Finally the neighboring floats are
/// checked and the best one is returned.
///
/// The guess should already be close; this never moves to a worse value.
/// A NaN guess is returned unchanged.
pub fn refine_solution(
    f: impl Fn(f64) -> f64,
    df: impl Fn(f64) -> f64,
    y: f64,
    guess: f64,
) -> f64 {
    if guess.is_nan() {
        return guess;
    }
    let mut guess = guess;
    let mut r = f(guess) - y;
    for _ in 0..REFINE_SOLUTION_LIMIT {
        if r == 0.0 {
            break;
        }
        let d = df(guess);
        if d == 0.0 {
            break;
        }
        let mut x = guess - r / d;
        if !x.is_finite() {
            break;
        }
        let mut rx = f(x) - y;
        if different_signs(r, rx) {
            let z = guess + (x - guess) * (r / (r - rx));
            let rz = f(z) - y;
            if rz.abs() < r.abs() && rz.abs() < rx.abs() {
                x = z;
                rx = rz;
            }
        }
        if rx.abs() < r.abs() {
            guess = x;
            r = rx;
        } else {
            break;
        }
    }
    nearest_float(&f, y, guess)
}

/// Moves `x` by up to two floats in whichever direction reduces
/// `|f(x) - y|`.
pub(crate) fn nearest_float(f: impl Fn(f64) -> f64, y: f64, x: f64) -> f64 {
    let r = (f(x) - y).abs();
    let up = next_up(x);
    let down = next_down(x);
    let r_up = (f(up) - y).abs();
    let r_down = (f(down) - y).abs();
    if r_up < r && r_up <= r_down {
        let up2 = next_up(up);
        if (f(up2) - y).abs() < r_up {
            return up2;
        }
        up
    } else if r_down < r {
        let down2 = next_down(down);
        if (f(down2) - y).abs() < r_down {
            return down2;
        }
        down
    } else {
        x
    }
}

/// The iteration shared by Newton's and Halley's methods.
///
/// `residual(x)` is `f(x) - y`, `tolerance(x, r)` is the acceptance bound at
/// `x` given residual `r`, and `step(x, r)` is the next iterate, or `None`
/// when the derivative information is degenerate.
///
/// A step smaller than the resolution of `x` ends the iteration with `Ok`,
/// whatever the residual.
pub(crate) fn iterate_open(
    method: Method,
    limit: usize,
    guess: f64,
    residual: impl Fn(f64) -> f64,
    tolerance: impl Fn(f64, f64) -> f64,
    step: impl Fn(f64, f64) -> Option<f64>,
) -> Result<f64> {
    let fail = |estimate, bracket| Error::NonConvergent {
        method,
        estimate,
        bracket,
    };
    if !guess.is_finite() {
        return Err(fail(guess, None));
    }
    let mut x = guess;
    let mut r = residual(x);
    if r.abs() < tolerance(x, r) {
        return Ok(x);
    }
    let mut best = (x, r.abs());
    let mut bracket = None;
    for _ in 0..limit {
        let Some(next) = step(x, r).filter(|n| n.is_finite()) else {
            log::debug!("{method} stalled at {x}: degenerate derivative");
            return Err(fail(best.0, bracket));
        };
        let r_next = residual(next);
        if r_next.abs() < tolerance(next, r_next) {
            return Ok(next);
        }
        if r_next.abs() < best.1 {
            best = (next, r_next.abs());
        }
        if different_signs(r, r_next) {
            bracket = Some(if x < next { (x, next) } else { (next, x) });
            if (next - x).abs() < ulp(next) + ulp(x) {
                // Adjacent floats on either side of the solution.
                return Ok(best.0);
            }
            if r_next.abs() >= r.abs() {
                log::debug!("{method} is oscillating between {x} and {next}");
                return Err(fail(best.0, bracket));
            }
        } else if next == x {
            // The step is below the resolution of x.
            return Ok(x);
        }
        x = next;
        r = r_next;
    }
    Err(fail(best.0, bracket))
}
