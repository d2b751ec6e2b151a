// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Halley's method.

use crate::common::ulp;
use crate::refine::{
    iterate_open, refine_solution, Epsilon, ErrorEstimate, RootFinder, DEFAULT_LIMIT,
};
use crate::{Method, Result};

/// Halley's method for solving `f(x) = y` from an initial guess.
///
/// With `r = f(x) − y`, each step is `x ← x − 2 r f' / (2 f'² − r f'')`,
/// which converges cubically near a simple root. Success and failure follow
/// the same rules as [`Newton`](crate::Newton); the step is degenerate when
/// its denominator vanishes.
#[derive(Clone, Debug)]
pub struct Halley<F, D, D2, P = (), E = Epsilon> {
    function: F,
    derivative: D,
    second_derivative: D2,
    ferror: E,
    parameters: P,
    limit: usize,
    polish: bool,
}

impl<F, D, D2> Halley<F, D, D2>
where
    F: Fn(f64, &()) -> f64,
    D: Fn(f64, &()) -> f64,
    D2: Fn(f64, &()) -> f64,
{
    /// Creates a solver from a function and its first two derivatives.
    pub fn new(function: F, derivative: D, second_derivative: D2) -> Self {
        Self::with_parameters(function, derivative, second_derivative, ())
    }
}

impl<F, D, D2, P> Halley<F, D, D2, P>
where
    F: Fn(f64, &P) -> f64,
    D: Fn(f64, &P) -> f64,
    D2: Fn(f64, &P) -> f64,
{
    /// Creates a solver with fixed parameters passed to all three functions.
    pub fn with_parameters(
        function: F,
        derivative: D,
        second_derivative: D2,
        parameters: P,
    ) -> Self {
        Self {
            function,
            derivative,
            second_derivative,
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

impl<F, D, D2, P, E> Halley<F, D, D2, P, E> {
    /// Replaces the error estimate.
    pub fn with_ferror<E2: ErrorEstimate<P>>(self, ferror: E2) -> Halley<F, D, D2, P, E2> {
        Halley {
            function: self.function,
            derivative: self.derivative,
            second_derivative: self.second_derivative,
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

impl<F, D, D2, P, E> RootFinder for Halley<F, D, D2, P, E>
where
    F: Fn(f64, &P) -> f64,
    D: Fn(f64, &P) -> f64,
    D2: Fn(f64, &P) -> f64,
    E: ErrorEstimate<P>,
{
    /// The initial guess.
    type Initial = f64;

    fn solve(&self, y: f64, guess: f64) -> Result<f64> {
        let f = |x: f64| (self.function)(x, &self.parameters);
        let df = |x: f64| (self.derivative)(x, &self.parameters);
        let x = iterate_open(
            Method::Halley,
            self.limit,
            guess,
            |x| f(x) - y,
            |x, r| ulp(y) + self.ferror.ferror(x, r + y, &self.parameters),
            |x, r| {
                let d1 = df(x);
                let d2 = (self.second_derivative)(x, &self.parameters);
                let denom = 2.0 * d1 * d1 - r * d2;
                (denom != 0.0).then(|| x - 2.0 * r * d1 / denom)
            },
        )?;
        Ok(if self.polish {
            refine_solution(f, df, y, x)
        } else {
            x
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn cube_root_of_two() {
        let halley = Halley::new(
            |x: f64, _: &()| x * x * x,
            |x: f64, _: &()| 3.0 * x * x,
            |x: f64, _: &()| 6.0 * x,
        );
        let x = halley.solve(2.0, 1.0).unwrap();
        assert!((x - 2f64.cbrt()).abs() <= 4.0 * f64::EPSILON, "got {x}");
    }

    #[test]
    fn cosine() {
        let halley = Halley::new(
            |x: f64, _: &()| x.cos(),
            |x: f64, _: &()| -x.sin(),
            |x: f64, _: &()| -x.cos(),
        )
        .with_polish(false);
        let x = halley.find_root(1.0).unwrap();
        assert!((x - core::f64::consts::FRAC_PI_2).abs() < 1e-11);
    }

    #[test]
    fn degenerate_step() {
        // f' = 0 and f'' = 0 at the guess, so the step is undefined.
        let halley = Halley::new(
            |x: f64, _: &()| x * x * x + 1.0,
            |x: f64, _: &()| 3.0 * x * x,
            |x: f64, _: &()| 6.0 * x,
        );
        assert_eq!(
            halley.find_root(0.0),
            Err(Error::NonConvergent {
                method: Method::Halley,
                estimate: 0.0,
                bracket: None
            })
        );
    }

    #[test]
    fn parameters() {
        let mut halley = Halley::with_parameters(
            |x: f64, p: &(f64, f64)| p.0 * x - p.1,
            |_: f64, p: &(f64, f64)| p.0,
            |_: f64, _: &(f64, f64)| 0.0,
            (2.0, 1.0),
        );
        assert_eq!(halley.find_root(0.0), Ok(0.5));
        halley.parameters_mut().1 = 3.0;
        assert_eq!(halley.find_root(0.0), Ok(1.5));
        assert_eq!(*halley.parameters(), (2.0, 3.0));
    }
}
