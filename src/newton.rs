// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Newton's method.

use crate::common::ulp;
use crate::refine::{
    iterate_open, refine_solution, Epsilon, ErrorEstimate, RootFinder, DEFAULT_LIMIT,
};
use crate::{Method, Result};

/// Newton's method for solving `f(x) = y` from an initial guess.
///
/// Each step is `x ← x − (f(x) − y) / f'(x)`. The iteration succeeds when
/// `|f(x) − y| < ulp(y) + ferror(x)`, after which the estimate is polished
/// with [`refine_solution`] unless polishing is turned off. It also succeeds
/// when a step no longer changes `x`, or when two neighboring iterates less
/// than two ULPs apart straddle the solution: the estimate is then as close as
/// `f64` resolves, even if the residual is above the tolerance.
///
/// The method fails with [`Error::NonConvergent`](crate::Error::NonConvergent)
/// when the derivative vanishes, when two iterates straddle the solution but
/// the second is no better, or when the iteration limit runs out. If the
/// iterates straddled the solution, the error carries that interval so the
/// caller can retry with [`Brent`](crate::Brent):
///
/// ```
/// use polyroot::{Brent, Error, Newton, RootFinder};
///
/// let f = |x: f64, _: &()| x.powi(3) - 2.0 * x + 2.0;
/// let df = |x: f64, _: &()| 3.0 * x * x - 2.0;
/// let newton = Newton::new(f, df);
/// let root = match newton.find_root(0.0) {
///     Ok(root) => root,
///     Err(Error::NonConvergent { bracket: Some(bracket), .. }) => {
///         Brent::new(f).find_root(bracket).unwrap()
///     }
///     Err(Error::NonConvergent { bracket: None, .. }) => {
///         Brent::new(f).find_root((-3.0, 0.0)).unwrap()
///     }
///     Err(e) => panic!("{e}"),
/// };
/// assert!(f(root, &()).abs() < 1e-10);
/// ```
#[derive(Clone, Debug)]
pub struct Newton<F, D, P = (), E = Epsilon> {
    function: F,
    derivative: D,
    ferror: E,
    parameters: P,
    limit: usize,
    polish: bool,
}

impl<F, D> Newton<F, D>
where
    F: Fn(f64, &()) -> f64,
    D: Fn(f64, &()) -> f64,
{
    /// Creates a solver for `function` with first derivative `derivative`.
    pub fn new(function: F, derivative: D) -> Self {
        Self::with_parameters(function, derivative, ())
    }
}

impl<F, D, P> Newton<F, D, P>
where
    F: Fn(f64, &P) -> f64,
    D: Fn(f64, &P) -> f64,
{
    /// Creates a solver with fixed parameters passed to both functions.
    pub fn with_parameters(function: F, derivative: D, parameters: P) -> Self {
        Self {
            function,
            derivative,
            ferror: Epsilon::DEFAULT,
            parameters,
            limit: DEFAULT_LIMIT,
            polish: true,
        }
    }

    /// Uses an epsilon tolerance instead of the current error estimate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEpsilon`](crate::Error::InvalidEpsilon) unless
    /// `epsilon` is positive and finite.
    pub fn with_epsilon(self, epsilon: f64, relative: bool) -> Result<Self> {
        Ok(self.with_ferror(Epsilon::new(epsilon, relative)?))
    }
}

impl<F, D, P, E> Newton<F, D, P, E> {
    /// Replaces the error estimate.
    pub fn with_ferror<E2: ErrorEstimate<P>>(self, ferror: E2) -> Newton<F, D, P, E2> {
        Newton {
            function: self.function,
            derivative: self.derivative,
            ferror,
            parameters: self.parameters,
            limit: self.limit,
            polish: self.polish,
        }
    }

    /// Sets the iteration limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether to polish converged estimates with [`refine_solution`].
    #[must_use]
    pub fn with_polish(mut self, polish: bool) -> Self {
        self.polish = polish;
        self
    }

    /// The parameters passed to the functions.
    pub fn parameters(&self) -> &P {
        &self.parameters
    }

    /// Mutable access to the parameters.
    pub fn parameters_mut(&mut self) -> &mut P {
        &mut self.parameters
    }

    /// Replaces the parameters.
    pub fn set_parameters(&mut self, parameters: P) {
        self.parameters = parameters;
    }
}

impl<F, D, P, E> RootFinder for Newton<F, D, P, E>
where
    F: Fn(f64, &P) -> f64,
    D: Fn(f64, &P) -> f64,
    E: ErrorEstimate<P>,
{
    /// The initial guess.
    type Initial = f64;

    fn solve(&self, y: f64, guess: f64) -> Result<f64> {
        let f = |x: f64| (self.function)(x, &self.parameters);
        let df = |x: f64| (self.derivative)(x, &self.parameters);
        let x = iterate_open(
            Method::Newton,
            self.limit,
            guess,
            |x| f(x) - y,
            |x, r| ulp(y) + self.ferror.ferror(x, r + y, &self.parameters),
            |x, r| {
                let d = df(x);
                (d != 0.0).then(|| x - r / d)
            },
        )?;
        Ok(if self.polish {
            refine_solution(f, df, y, x)
        } else {
            x
        })
    }
}
