// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Real roots of polynomials of any degree.

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::{check_finite, ilogb, scalb};
use crate::isolate::{find_missing, MIN_EXPONENT};
use crate::subdivision::bezier_roots_with_band;
use crate::{
    solve_cubic, solve_linear, solve_quadratic, solve_quartic, Error, Polynomial, Result,
};

/// Find the real roots of a polynomial.
///
/// `coeffs[i]` is the coefficient of `x^i`. The roots are returned in
/// increasing order, each distinct root once, and each passes the residual
/// test `|p(x)| ≤ eval_error(x)` of [`Polynomial::eval_error`].
///
/// Trailing zero coefficients are ignored. Degrees one through four use
/// [`solve_linear`], [`solve_quadratic`], [`solve_cubic`] and
/// [`solve_quartic`]. Higher degrees first look for special forms: a factor
/// of `x^k` gives the root `0.0`, a binomial `c0 + cn x^n` is solved with an
/// `n`th root, and a polynomial in `x²` is solved at half the degree.
///
/// Everything else is searched for in dyadic shells `[2^e, 2^(e+1)]`, between
/// a lower and an upper bound on the root magnitudes, once for positive roots
/// and once for `p(-x)`. Each shell is mapped onto `[0, 1]` exactly, converted
/// to Bernstein form, and solved by subdivision; see
/// [`solve_bezier`](crate::solve_bezier). The roots are then polished against
/// `p` and validated. Finally the real roots of the derivative, found the same
/// way, split the line into intervals where `p` is monotonic; a sign change
/// of `p` over an interval that holds no root yet is searched with
/// [`Brent`](crate::Brent).
///
/// ```
/// use polyroot::{solve_polynomial, Polynomial};
///
/// // (x - 0.5)(x - 1.5)(x - 2.5)(x² + 1)
/// let p = Polynomial::from_roots(&[0.5, 1.5, 2.5]) * &Polynomial::new([1.0, 0.0, 1.0]);
/// let roots = solve_polynomial(p.coeffs()).unwrap();
/// assert_eq!(roots.len(), 3);
/// assert!((roots[1] - 1.5).abs() < 1e-12);
/// ```
///
/// # Errors
///
/// Returns [`Error::EmptyCoefficients`] for an empty slice,
/// [`Error::ZeroPolynomial`] if every coefficient is zero, and
/// [`Error::NonFiniteCoefficient`] if any is NaN or infinite.
pub fn solve_polynomial(coeffs: &[f64]) -> Result<Vec<f64>> {
    let mut roots = Vec::new();
    solve_polynomial_into(coeffs, &mut roots)?;
    Ok(roots)
}

/// Like [`solve_polynomial`], but writes the roots into `roots`.
///
/// The buffer is cleared first. Returns the number of roots.
///
/// # Errors
///
/// See [`solve_polynomial`].
pub fn solve_polynomial_into(coeffs: &[f64], roots: &mut Vec<f64>) -> Result<usize> {
    roots.clear();
    if coeffs.is_empty() {
        return Err(Error::EmptyCoefficients);
    }
    check_finite(coeffs)?;
    let Some(degree) = coeffs.iter().rposition(|c| *c != 0.0) else {
        return Err(Error::ZeroPolynomial);
    };
    let c = &coeffs[..=degree];
    match *c {
        [_] => {}
        [c0, c1] => roots.extend(solve_linear(c0, c1)?),
        [c0, c1, c2] => roots.extend(solve_quadratic(c0, c1, c2)?),
        [c0, c1, c2, c3] => roots.extend(solve_cubic(c0, c1, c2, c3)?),
        [c0, c1, c2, c3, c4] => roots.extend(solve_quartic(c0, c1, c2, c3, c4)?),
        _ => solve_general(c, roots)?,
    }
    Ok(roots.len())
}

/// Degree five and up, with a nonzero leading coefficient.
fn solve_general(c: &[f64], roots: &mut Vec<f64>) -> Result<()> {
    let n = c.len() - 1;
    if let Some(k) = c.iter().position(|c| *c != 0.0).filter(|k| *k > 0) {
        solve_polynomial_into(&c[k..], roots)?;
        roots.push(0.0);
        roots.sort_by(f64::total_cmp);
        roots.dedup();
        return Ok(());
    }
    let p = Polynomial::new(c.iter().copied()).normalized();
    let mut candidates = Vec::new();
    if c[1..n].iter().all(|c| *c == 0.0) {
        // c0 + cn xⁿ
        let r = c[0].abs().powf(1.0 / n as f64) / c[n].abs().powf(1.0 / n as f64);
        let same_sign = (c[0] > 0.0) == (c[n] > 0.0);
        if n % 2 == 1 {
            candidates.push(if same_sign { -r } else { r });
        } else if !same_sign {
            candidates.extend([-r, r]);
        }
    } else if c.iter().skip(1).step_by(2).all(|c| *c == 0.0) {
        let even: Vec<f64> = c.iter().step_by(2).copied().collect();
        for z in solve_polynomial(&even)? {
            if z > 0.0 {
                candidates.extend([-z.sqrt(), z.sqrt()]);
            }
        }
    } else {
        shells(&p, 1.0, &mut candidates);
        shells(&p.reflect(), -1.0, &mut candidates);
        validate_into(&p, &candidates, roots);
        // A shell's band can swallow roots that the compensated evaluation
        // still separates. They show up as sign changes between the critical
        // points.
        let critical = solve_polynomial(p.deriv().coeffs())?;
        let mut missing = Vec::new();
        find_missing(&p, &critical, roots, |x| missing.push(x));
        if !missing.is_empty() {
            log::debug!("found {missing:?} between critical points");
            roots.extend(missing);
            let kept = p.merge_roots(roots);
            roots.truncate(kept);
        }
        return Ok(());
    }
    validate_into(&p, &candidates, roots);
    Ok(())
}

/// Appends the positive roots of `p`, times `sign`, shell by shell.
fn shells(p: &Polynomial, sign: f64, candidates: &mut Vec<f64>) {
    let c = p.coeffs();
    let n = c.len() - 1;
    let lead = c[n];
    // Cauchy's bound and its counterpart for 1/x.
    let upper = 1.0 + c[..n].iter().fold(0.0_f64, |m, x| m.max((x / lead).abs()));
    let upper = if upper.is_finite() { upper } else { f64::MAX };
    let rest = c[1..].iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    let lower = c[0].abs() / (c[0].abs() + rest);
    let Some(hi) = ilogb(upper) else {
        return;
    };
    let lo = ilogb(lower).unwrap_or(MIN_EXPONENT);
    for e in lo..=hi {
        let scaled = p.rescaled(e);
        let bezier = scaled.affine_substitute(1.0, 1.0).to_bernstein();
        if !bezier.coeffs().iter().all(|b| b.is_finite()) {
            log::debug!("skipping shell [2^{e}, 2^{}]: coefficients overflowed", e + 1);
            continue;
        }
        let band = scaled
            .eval_error(2.0)
            .max(scalb((n + 1) as f64 * f64::EPSILON * bezier.magnitude(), 4));
        let start = candidates.len();
        bezier_roots_with_band(&bezier, band, candidates);
        for t in &mut candidates[start..] {
            *t = sign * scalb(1.0 + *t, e);
        }
    }
}

/// Polishes each candidate against `p`, keeps the ones that pass the residual
/// test, and appends them to `roots` sorted and merged.
fn validate_into(p: &Polynomial, candidates: &[f64], roots: &mut Vec<f64>) {
    let start = roots.len();
    for &x in candidates {
        if !x.is_finite() {
            continue;
        }
        let x = p.polish(x) + 0.0;
        if p.is_root(x) {
            roots.push(x);
        } else {
            log::debug!("rejected root {x}: residual {:?}", p.residual(x));
        }
    }
    let n = p.merge_roots(&mut roots[start..]);
    roots.truncate(start + n);
}
