// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polynomials in the monomial basis.

use core::ops::Mul;

use alloc::vec::Vec;
use arrayvec::ArrayVec;
use smallvec::{smallvec, SmallVec};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::{ilogb, scalb, two_product, two_sum, ulp};
use crate::{BezierPolynomial, Result};

/// A polynomial in the monomial basis.
///
/// Coefficients are stored in increasing order of degree, so `coeffs()[0]`
/// is the constant term. Polynomials of degree seven or less are stored
/// inline.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polynomial {
    coeffs: SmallVec<[f64; 8]>,
}

impl Mul<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let len = (self.coeffs.len() + rhs.coeffs.len()).saturating_sub(1);
        let mut coeffs: SmallVec<[f64; 8]> = smallvec![0.0; len];
        for (i, c) in self.coeffs.iter().enumerate() {
            for (j, d) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += c * d;
            }
        }
        Polynomial { coeffs }
    }
}

impl Mul<&Polynomial> for Polynomial {
    type Output = Self;

    fn mul(self, rhs: &Self) -> Self {
        (&self) * rhs
    }
}

impl Polynomial {
    /// Constructs a new polynomial from coefficients.
    ///
    /// The first coefficient provided will be the constant term, the second will
    /// be the linear term, and so on.
    pub fn new(coeffs: impl IntoIterator<Item = f64>) -> Self {
        Self {
            coeffs: coeffs.into_iter().collect(),
        }
    }

    /// The monic polynomial with the given roots, repeated roots included.
    pub fn from_roots(roots: &[f64]) -> Self {
        let mut coeffs: SmallVec<[f64; 8]> = smallvec![1.0];
        for &r in roots {
            coeffs.push(0.0);
            for i in (1..coeffs.len()).rev() {
                coeffs[i] = coeffs[i - 1] - r * coeffs[i];
            }
            coeffs[0] *= -r;
        }
        Self { coeffs }
    }

    /// The coefficients of this polynomial.
    ///
    /// In the returned slice, the coefficient of `x^i` is at index `i`.
    /// Trailing zeros are kept as supplied.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// The index of the highest nonzero coefficient, or `None` for the zero
    /// polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.iter().rposition(|c| *c != 0.0)
    }

    /// This polynomial without trailing zero coefficients.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        let len = self.degree().map_or(0, |d| d + 1);
        Self {
            coeffs: self.coeffs[..len].iter().copied().collect(),
        }
    }

    /// Whether every coefficient is zero. A polynomial with no coefficients
    /// is zero.
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| *c == 0.0)
    }

    /// Are all the coefficients finite?
    pub fn is_finite(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_finite())
    }

    /// Returns the largest absolute value of any coefficient.
    pub fn magnitude(&self) -> f64 {
        self.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()))
    }

    /// Evaluates this polynomial at a point, using Horner's method.
    pub fn eval(&self, x: f64) -> f64 {
        let mut acc = 0.0;
        for c in self.coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    /// Evaluates this polynomial with compensated Horner's method.
    ///
    /// The rounding error of every multiply and add is captured exactly and
    /// accumulated in a second Horner pass. The result is about as accurate as
    /// if it had been computed in twice the working precision and then rounded.
    pub fn eval_compensated(&self, x: f64) -> f64 {
        let mut iter = self.coeffs.iter().rev();
        let Some(&lead) = iter.next() else {
            return 0.0;
        };
        let mut acc = lead;
        let mut err = 0.0;
        for &c in iter {
            let (p, pi) = two_product(acc, x);
            let (s, sigma) = two_sum(p, c);
            acc = s;
            err = err * x + (pi + sigma);
        }
        acc + err
    }

    /// The floating-point noise floor of evaluating this polynomial at `x`.
    ///
    /// This is `2^6 · [Σ (i+1)·ulp(|c_i|·|x|^i) + ulp(x)·Σ i·|c_i|·|x|^(i-1)]`.
    /// The first sum bounds the rounding in each term, the second the effect
    /// of `x` itself being rounded. A computed value smaller than this cannot
    /// be told apart from zero.
    pub fn eval_error(&self, x: f64) -> f64 {
        let ax = x.abs();
        // |x| = m · 2^e with m in [1, 2), so powers of m stay in range even
        // where powers of x would overflow.
        let e = ilogb(x).unwrap_or(0);
        let m = scalb(ax, -e);
        let mut pow = 1.0;
        let mut shift = 0_i32;
        let mut terms = 0.0;
        let mut slope = 0.0;
        for (i, c) in self.coeffs.iter().enumerate() {
            let term = scalb(c.abs() * pow, shift);
            terms += (i + 1) as f64 * ulp(term);
            if i > 0 && ax > 0.0 {
                slope += i as f64 * (term / ax);
            }
            pow *= m;
            shift = shift.saturating_add(e);
        }
        if ax == 0.0 {
            slope = self.coeffs.get(1).map_or(0.0, |c| c.abs());
        }
        scalb(terms + ulp(x) * slope, 6)
    }

    /// Returns the polynomial that's the derivative of this polynomial.
    #[must_use]
    pub fn deriv(&self) -> Self {
        Self {
            coeffs: self
                .coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * i as f64)
                .collect(),
        }
    }

    /// The polynomial `p(-x)`.
    #[must_use]
    pub fn reflect(&self) -> Self {
        Self {
            coeffs: self
                .coeffs
                .iter()
                .enumerate()
                .map(|(i, &c)| if i % 2 == 1 { -c } else { c })
                .collect(),
        }
    }

    /// The polynomial `q(t) = p(scale · t + shift)`.
    ///
    /// The variable is scaled first and then shifted by `shift / scale`, so a
    /// power-of-two `scale` introduces no rounding of its own.
    #[must_use]
    pub fn affine_substitute(&self, scale: f64, shift: f64) -> Self {
        if scale == 0.0 {
            return Self::new([self.eval(shift)]);
        }
        let mut coeffs = self.coeffs.clone();
        let mut pow = 1.0;
        for c in &mut coeffs {
            *c *= pow;
            pow *= scale;
        }
        let s = shift / scale;
        if s != 0.0 {
            // Taylor shift by repeated synthetic division.
            let d = coeffs.len().saturating_sub(1);
            for i in 0..d {
                for j in (i..d).rev() {
                    coeffs[j] += s * coeffs[j + 1];
                }
            }
        }
        Self { coeffs }
    }

    /// Converts to the Bernstein basis on `[0, 1]`, keeping the degree.
    ///
    /// With `n` the number of coefficients minus one, the control values are
    /// `b_i = Σ_{j ≤ i} C(i, j) / C(n, j) · a_j`.
    pub fn to_bernstein(&self) -> BezierPolynomial {
        let n = self.coeffs.len().saturating_sub(1);
        let mut out: SmallVec<[f64; 8]> = smallvec![0.0; self.coeffs.len()];
        for (i, b) in out.iter_mut().enumerate() {
            // C(i, j) / C(n, j), updated as j increases.
            let mut ratio = 1.0;
            let mut sum = 0.0;
            for (j, a) in self.coeffs[..=i].iter().enumerate() {
                sum += ratio * a;
                if j < i {
                    ratio *= (i - j) as f64 / (n - j) as f64;
                }
            }
            *b = sum;
        }
        BezierPolynomial::from_smallvec(out)
    }

    /// Finds every real root; see [`solve_polynomial`](crate::solve_polynomial).
    ///
    /// # Errors
    ///
    /// Returns an error if the polynomial is zero, empty, or has a non-finite
    /// coefficient.
    pub fn roots(&self) -> Result<Vec<f64>> {
        crate::solve_polynomial(&self.coeffs)
    }

    /// Rescales by a power of two so the largest coefficient has magnitude in
    /// `[1, 2)`. The roots are unchanged.
    pub(crate) fn normalized(&self) -> Self {
        match ilogb(self.magnitude()) {
            Some(e) => Self {
                coeffs: self.coeffs.iter().map(|&c| scalb(c, -e)).collect(),
            },
            None => self.clone(),
        }
    }

    /// The polynomial `q(y) = 2^-m · p(2^e · y)`, with `m` chosen so the
    /// largest coefficient of `q` has magnitude in `[1, 2)`.
    ///
    /// This is exact except for terms that underflow, so `q` has the roots of
    /// `p` divided by `2^e`, and its values carry the signs of `p`.
    pub(crate) fn rescaled(&self, e: i32) -> Self {
        let shift = |i: usize| e.saturating_mul(i32::try_from(i).unwrap_or(i32::MAX));
        let top = self
            .coeffs
            .iter()
            .enumerate()
            .filter_map(|(i, c)| ilogb(*c).map(|x| x.saturating_add(shift(i))))
            .max()
            .unwrap_or(0);
        Self {
            coeffs: self
                .coeffs
                .iter()
                .enumerate()
                .map(|(i, c)| scalb(*c, shift(i).saturating_sub(top)))
                .collect(),
        }
    }

    /// The compensated value at `x` and its [`eval_error`](Self::eval_error),
    /// both scaled by the same power of two.
    ///
    /// The value has the sign of `p(x)`. Nothing overflows, even where `p(x)`
    /// itself would.
    pub(crate) fn residual(&self, x: f64) -> (f64, f64) {
        let e = ilogb(x).unwrap_or(0);
        let (q, y) = (self.rescaled(e), scalb(x, -e));
        (q.eval_compensated(y), q.eval_error(y))
    }

    /// Polishes an approximate root against the compensated evaluation.
    pub(crate) fn polish(&self, x: f64) -> f64 {
        let e = ilogb(x).unwrap_or(0);
        let q = self.rescaled(e);
        let dq = q.deriv();
        let y = crate::refine_solution(
            |y| q.eval_compensated(y),
            |y| dq.eval(y),
            0.0,
            scalb(x, -e),
        );
        scalb(y, e)
    }

    /// Whether `x` passes the residual test `|p(x)| ≤ eval_error(x)`.
    ///
    /// The test is done on [`residual`](Self::residual), so it works for
    /// roots whose powers overflow.
    pub(crate) fn is_root(&self, x: f64) -> bool {
        let (fx, error) = self.residual(x);
        fx.is_finite() && fx.abs() <= error
    }

    /// How far `x` is from passing the residual test, as a multiple of the
    /// noise floor.
    fn residual_ratio(&self, x: f64) -> f64 {
        let (fx, error) = self.residual(x);
        fx.abs() / error
    }

    /// Polishes candidate roots, drops those that fail the residual test, and
    /// sorts and merges the survivors. Non-finite candidates are skipped.
    pub(crate) fn refine_roots<const N: usize>(&self, candidates: &[f64]) -> ArrayVec<f64, N> {
        let mut roots = ArrayVec::new();
        for &x in candidates {
            if !x.is_finite() {
                continue;
            }
            // Adding zero turns -0.0 into 0.0.
            let x = self.polish(x) + 0.0;
            if !self.is_root(x) {
                log::debug!("rejected candidate root {x}: residual {:?}", self.residual(x));
            } else if roots.try_push(x).is_err() {
                break;
            }
        }
        let n = self.merge_roots(&mut roots);
        roots.truncate(n);
        roots
    }

    /// Sorts `roots` and merges neighbors that cannot be told apart: equal
    /// values, or values with `|p(mid)| ≤ eval_error(mid)` between them. Of a
    /// merged pair, the one with the smaller residual relative to its noise
    /// floor survives.
    ///
    /// Returns the number of roots kept at the front of the slice.
    pub(crate) fn merge_roots(&self, roots: &mut [f64]) -> usize {
        roots.sort_by(f64::total_cmp);
        let mut n = 0;
        for i in 0..roots.len() {
            let x = roots[i];
            if n > 0 {
                let prev = roots[n - 1];
                if prev == x || self.is_root(0.5 * (prev + x)) {
                    if self.residual_ratio(x) < self.residual_ratio(prev) {
                        roots[n - 1] = x;
                    }
                    continue;
                }
            }
            roots[n] = x;
            n += 1;
        }
        n
    }

    /// Binary exponents `(lo, hi)` such that every nonzero root `x` has
    /// `2^lo ≤ |x| < 2^hi`, from Fujiwara's bound applied to `p` and to its
    /// reversal.
    ///
    /// Returns `None` when there is no nonzero root to bound.
    pub(crate) fn root_exponents(&self) -> Option<(i32, i32)> {
        let first = self.coeffs.iter().position(|c| *c != 0.0)?;
        let last = self.degree()?;
        let exponents: SmallVec<[Option<i32>; 8]> =
            self.coeffs[first..=last].iter().map(|c| ilogb(*c)).collect();
        let hi = fujiwara(exponents.iter().copied())?;
        let lo = fujiwara(exponents.iter().rev().copied())?;
        Some((-lo, hi))
    }
}

/// With `exponents[i]` the binary exponent of the coefficient of `x^i`, an
/// `e` such that every root is smaller than `2^e` in magnitude.
///
/// Fujiwara's bound is `2 · max |c_(n-k) / c_n|^(1/k)`. Each ratio is less
/// than `2^(e_(n-k) + 1 - e_n)`, so the bound needs exponents only.
fn fujiwara(
    mut exponents: impl DoubleEndedIterator<Item = Option<i32>> + ExactSizeIterator,
) -> Option<i32> {
    let n = exponents.len().checked_sub(1)?;
    let lead = exponents.next_back()??;
    let mut bound = None;
    for (i, e) in exponents.enumerate() {
        let (Some(e), Ok(k)) = (e, i32::try_from(n - i)) else {
            continue;
        };
        // ceil((e + 1 - lead) / k)
        let r = -(lead - 1 - e).div_euclid(k);
        bound = bound.max(Some(r));
    }
    bound.map(|b| b.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke() {
        let x_minus_1 = Polynomial::new([-1.0, 1.0]);
        let x_minus_2 = Polynomial::new([-2.0, 1.0]);
        let x_minus_3 = Polynomial::new([-3.0, 1.0]);
        let p = &x_minus_1 * &x_minus_2 * &x_minus_3;
        assert_eq!(p.coeffs(), &[-6.0, 11.0, -6.0, 1.0]);
        assert_eq!(p, Polynomial::from_roots(&[1.0, 2.0, 3.0]));
        assert_eq!(p.eval(4.0), 6.0);
        assert_eq!(p.eval_compensated(4.0), 6.0);
        assert_eq!(p.degree(), Some(3));
    }

    #[test]
    fn degree_and_trim() {
        let p = Polynomial::new([1.0, 2.0, 0.0, 0.0]);
        assert_eq!(p.degree(), Some(1));
        assert_eq!(p.trimmed().coeffs(), &[1.0, 2.0]);
        let zero = Polynomial::new([0.0, 0.0]);
        assert!(zero.is_zero());
        assert_eq!(zero.degree(), None);
        assert!(zero.trimmed().coeffs().is_empty());
        assert!(Polynomial::default().is_zero());
    }

    #[test]
    fn compensated_beats_horner() {
        // (x - 1)^7 expanded, evaluated next to its root: plain Horner is
        // dominated by cancellation.
        let p = Polynomial::from_roots(&[1.0; 7]);
        let x = 1.0 + 1.0 / 1024.0;
        let exact = (1.0_f64 / 1024.0).powi(7);
        let compensated = p.eval_compensated(x);
        assert!(((compensated - exact) / exact).abs() < 1e-10);
        assert!((p.eval(x) - exact).abs() > (compensated - exact).abs());
    }

    #[test]
    fn eval_error_covers_rounding() {
        let p = Polynomial::from_roots(&[0.1, 0.3, 0.7]);
        for x in [0.1, 0.3, 0.7] {
            assert!(p.eval(x).abs() <= p.eval_error(x));
        }
        assert!(p.eval(0.5).abs() > p.eval_error(0.5));
        assert!(p.is_root(0.3));
        assert!(!p.is_root(0.31));
    }

    #[test]
    fn deriv_and_reflect() {
        let p = Polynomial::new([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(p.deriv().coeffs(), &[2.0, 6.0, 12.0]);
        assert_eq!(p.reflect().coeffs(), &[1.0, -2.0, 3.0, -4.0]);
        assert_eq!(p.reflect().eval(1.5), p.eval(-1.5));
        assert!(Polynomial::new([5.0]).deriv().coeffs().is_empty());
    }

    #[test]
    fn affine_substitute() {
        let p = Polynomial::new([0.5, -3.0, 0.25, 2.0, -1.0]);
        let q = p.affine_substitute(4.0, 4.0);
        for t in [0.0, 0.25, 0.5, 1.0] {
            let expected = p.eval(4.0 + 4.0 * t);
            assert!((q.eval(t) - expected).abs() <= 1e-12 * expected.abs().max(1.0));
        }
        let q = p.affine_substitute(-0.5, 0.0);
        assert_eq!(q.coeffs(), &[0.5, 1.5, 0.0625, -0.25, -0.0625]);
        assert_eq!(p.affine_substitute(0.0, 2.0).coeffs(), &[p.eval(2.0)]);
    }

    #[test]
    fn bernstein_conversion() {
        let p = Polynomial::new([1.0, -2.0, 0.5, 3.0]);
        let b = p.to_bernstein();
        assert_eq!(b.coeffs().len(), 4);
        assert_eq!(b.coeffs()[0], p.eval(0.0));
        assert_eq!(b.coeffs()[3], p.eval(1.0));
        for t in [0.1, 0.5, 0.9] {
            assert!((b.eval(t) - p.eval(t)).abs() < 1e-14);
        }
        let back = b.to_monomial();
        for (x, y) in back.coeffs().iter().zip(p.coeffs()) {
            assert!((x - y).abs() < 1e-14);
        }
    }

    #[test]
    fn merge_close_roots() {
        let p = Polynomial::from_roots(&[1.0, 1.0, 2.0]);
        let mut roots = [2.0, 1.0 + 1e-9, 1.0 - 1e-9, 1.0];
        let n = p.merge_roots(&mut roots);
        assert_eq!(&roots[..n], &[1.0, 2.0]);
    }

    #[test]
    fn rescaled_roots() {
        let p = Polynomial::from_roots(&[1.0, 2.0, 3.0]);
        let q = p.rescaled(2);
        assert_eq!(q.coeffs(), &[-0.09375, 0.6875, -1.5, 1.0]);
        assert_eq!(q.eval(0.5), 0.0);
    }

    #[test]
    fn residual_past_overflow() {
        // 1 + x - x² + 1e-300 x³ has a root near 1e300, where x³ overflows.
        let p = Polynomial::new([1.0, 1.0, -1.0, 1e-300]);
        assert!(p.is_root(1e300));
        assert!(!p.is_root(5e299));
        assert!(!p.is_root(2e300));
        let (fx, error) = p.residual(2e300);
        assert!(fx > 0.0 && error.is_finite());
        assert!(p.is_root(0.5 * (1.0 + 5f64.sqrt())));
    }

    #[test]
    fn root_exponents() {
        let p = Polynomial::from_roots(&[1.0, 2.0, 3.0]);
        assert_eq!(p.root_exponents(), Some((-3, 4)));
        // Zero roots are left out.
        let p = Polynomial::new([0.0, 0.0, -1.0, 1.0]);
        assert_eq!(p.root_exponents(), Some((-2, 2)));
        assert_eq!(Polynomial::new([3.0]).root_exponents(), None);
    }

    #[test]
    fn normalized_keeps_roots() {
        let p = Polynomial::new([-6.0e20, 11.0e20, -6.0e20, 1.0e20]);
        let q = p.normalized();
        assert!(q.magnitude() >= 1.0 && q.magnitude() < 2.0);
        assert_eq!(q.eval(2.0), 0.0);
    }
}
