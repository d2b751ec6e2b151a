// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Brent's bracketing root finder.

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::{scalb, ulp};
use crate::refine::{Epsilon, ErrorEstimate, RootFinder};
use crate::{different_signs, Error, Method, Result};

const BRENT_LIMIT: usize = 1024;

/// Brent's method: inverse quadratic interpolation and secant steps,
/// guarded by bisection.
///
/// The function is `f(x, &P)`, where `P` is a fixed parameter value carried by
/// the solver. For functions that need no parameters, `P` is `()`.
///
/// Convergence is guaranteed for a continuous function whose values at the
/// two ends of the bracket have opposite signs. The bracket shrinks until
/// `|f(x) - y| <= ulp(y) + ferror(x)`, or until it spans no more than 32 ULPs.
///
/// ```
/// use polyroot::{Brent, RootFinder};
///
/// let brent = Brent::new(|x: f64, _: &()| x * x - 2.0);
/// let r = brent.find_root((0.0, 2.0)).unwrap();
/// assert!((r - 2f64.sqrt()).abs() < 1e-10);
/// ```
#[derive(Clone, Debug)]
pub struct Brent<F, P = (), E = Epsilon> {
    function: F,
    ferror: E,
    parameters: P,
    limit: usize,
}

impl<F> Brent<F>
where
    F: Fn(f64, &()) -> f64,
{
    /// Creates a solver for `function`.
    pub fn new(function: F) -> Self {
        Self::with_parameters(function, ())
    }
}

impl<F, P> Brent<F, P>
where
    F: Fn(f64, &P) -> f64,
{
    /// Creates a solver for `function` with fixed parameters.
    pub fn with_parameters(function: F, parameters: P) -> Self {
        Self {
            function,
            ferror: Epsilon::DEFAULT,
            parameters,
            limit: BRENT_LIMIT,
        }
    }

    /// Uses an epsilon tolerance instead of the current error estimate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEpsilon`] unless `epsilon` is positive and finite.
    pub fn with_epsilon(self, epsilon: f64, relative: bool) -> Result<Self> {
        Ok(self.with_ferror(Epsilon::new(epsilon, relative)?))
    }
}

impl<F, P, E> Brent<F, P, E> {
    /// Replaces the error estimate.
    pub fn with_ferror<E2: ErrorEstimate<P>>(self, ferror: E2) -> Brent<F, P, E2> {
        Brent {
            function: self.function,
            ferror,
            parameters: self.parameters,
            limit: self.limit,
        }
    }

    /// Sets the iteration limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The parameters passed to the function.
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

impl<F, P, E> RootFinder for Brent<F, P, E>
where
    F: Fn(f64, &P) -> f64,
    E: ErrorEstimate<P>,
{
    /// The two ends of the bracket, in either order.
    type Initial = (f64, f64);

    fn solve(&self, y: f64, (lower, upper): (f64, f64)) -> Result<f64> {
        let f = |x: f64| (self.function)(x, &self.parameters) - y;
        let tol = |x: f64, r: f64| ulp(y) + self.ferror.ferror(x, r + y, &self.parameters);

        let (mut a, mut b) = if lower > upper {
            (upper, lower)
        } else {
            (lower, upper)
        };
        let mut fa = f(a);
        let mut fb = f(b);
        if fa.abs() <= tol(a, fa) {
            return Ok(a);
        }
        if fb.abs() <= tol(b, fb) {
            return Ok(b);
        }
        if !different_signs(fa, fb) {
            return Err(Error::NotBracketed { lower, upper });
        }

        if fa.abs() < fb.abs() {
            core::mem::swap(&mut a, &mut b);
            core::mem::swap(&mut fa, &mut fb);
        }
        let mut c = a;
        let mut fc = fa;
        let mut d = 0.0;
        let mut bisected = true;
        for _ in 0..self.limit {
            let mut s = if fa != fc && fb != fc {
                a * fb * fc / ((fa - fb) * (fa - fc))
                    + b * fa * fc / ((fb - fa) * (fb - fc))
                    + c * fa * fb / ((fc - fa) * (fc - fb))
            } else {
                b - fb * (b - a) / (fb - fa)
            };
            let t1 = (3.0 * a + b) / 4.0;
            let (t1, t2) = if t1 > b { (b, t1) } else { (t1, b) };
            let lim1 = scalb(ulp(b).max(ulp(c)), 5);
            let lim2 = scalb(ulp(c).max(ulp(d)), 5);
            let reject = !(s > t1 && s < t2)
                || (bisected && (s - b).abs() >= (b - c).abs() / 2.0)
                || (!bisected && (s - b).abs() >= (c - d).abs() / 2.0)
                || (bisected && (b - c).abs() < lim1)
                || (!bisected && (c - d).abs() < lim2);
            if reject {
                s = (a + b) / 2.0;
            }
            bisected = reject;

            let fs = f(s);
            if fs.abs() <= tol(s, fs) {
                return Ok(s);
            }
            d = c;
            c = b;
            fc = fb;
            if different_signs(fs, fa) {
                b = s;
                fb = fs;
            } else {
                a = s;
                fa = fs;
            }
            if fa.abs() < fb.abs() {
                core::mem::swap(&mut a, &mut b);
                core::mem::swap(&mut fa, &mut fb);
            }
            if (b - a).abs() <= scalb(ulp(b).max(ulp(a)), 5) {
                return Ok(b);
            }
        }
        Err(Error::NonConvergent {
            method: Method::Brent,
            estimate: b,
            bracket: Some(if a < b { (a, b) } else { (b, a) }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_at_bracket_end() {
        let brent = Brent::new(|x: f64, _: &()| x * x * x);
        assert_eq!(brent.find_root((0.0, 3.0)), Ok(0.0));
        assert_eq!(brent.find_root((3.0, 0.0)), Ok(0.0));
    }

    #[test]
    fn cube_inside_bracket() {
        let brent = Brent::new(|x: f64, _: &()| x * x * x);
        let r = brent.find_root((-1.0, 3.0)).unwrap();
        assert!(r.abs() < 1e-3, "within the cube root of the tolerance, got {r}");
        let brent = Brent::new(|x: f64, _: &()| x * x * x - 8.0)
            .with_epsilon(1e-14, false)
            .unwrap();
        let r = brent.find_root((0.0, 5.0)).unwrap();
        assert!((r - 2.0).abs() < 1e-13);
    }

    #[test]
    fn solve_for_target_value() {
        let brent = Brent::new(|x: f64, _: &()| x.cos());
        let r = brent.solve(0.5, (0.0, 2.0)).unwrap();
        assert!((r - core::f64::consts::FRAC_PI_3).abs() < 1e-10);
    }

    #[test]
    fn not_bracketed() {
        let brent = Brent::new(|x: f64, _: &()| x * x + 1.0);
        assert_eq!(
            brent.find_root((-1.0, 2.0)),
            Err(Error::NotBracketed {
                lower: -1.0,
                upper: 2.0
            })
        );
    }

    #[test]
    fn parameters() {
        let mut brent = Brent::with_parameters(|x: f64, k: &f64| x - k, 0.25);
        assert!((brent.find_root((0.0, 1.0)).unwrap() - 0.25).abs() < 1e-10);
        brent.set_parameters(0.75);
        assert_eq!(*brent.parameters(), 0.75);
        assert!((brent.find_root((0.0, 1.0)).unwrap() - 0.75).abs() < 1e-10);
        *brent.parameters_mut() = 0.5;
        assert!((brent.find_root((0.0, 1.0)).unwrap() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn custom_ferror() {
        let brent = Brent::new(|x: f64, _: &()| x - 1.0 / 3.0).with_ferror(|_: f64, _: &()| 1e-3);
        let r = brent.find_root((0.0, 1.0)).unwrap();
        assert!((r - 1.0 / 3.0).abs() <= 1e-3);
    }

    #[test]
    fn flat_root_meets_tolerance() {
        // The cube is below 1e-12 only within about 1e-5 of the root, far
        // wider than the 32 ULPs that would end the search on width alone.
        let f = |x: f64, _: &()| 1e3 * (x - 0.3).powi(3);
        let r = Brent::new(f).find_root((0.0, 1.0)).unwrap();
        assert!(f(r, &()).abs() <= 1e-12, "f({r}) = {}", f(r, &()));
        assert!((r - 0.3).abs() < 1e-5);
    }

    #[test]
    fn iteration_limit() {
        let brent = Brent::new(|x: f64, _: &()| x * x * x - 0.3)
            .with_epsilon(1e-300, false)
            .unwrap()
            .with_limit(1);
        match brent.find_root((0.0, 1.0)) {
            Err(Error::NonConvergent {
                method: Method::Brent,
                bracket: Some((lo, hi)),
                ..
            }) => {
                let root = 0.3_f64.cbrt();
                assert!(lo < root && root < hi, "{root} not in [{lo}, {hi}]");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
