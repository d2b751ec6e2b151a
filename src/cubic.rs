// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic equations.

use arrayvec::ArrayVec;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::{
    balance, check_finite, integer_coefficients, scalb, sort_dedup, CompensatedSum, Sign,
};
use crate::{isolate, solve_quadratic, Error, Polynomial, Result};

/// Integer coefficients below this have exactly computable discriminants.
const EXACT_LIMIT: f64 = 536870912.0; // 2^29

/// The real roots of a cubic with nonzero leading coefficient, by
/// multiplicity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "a cubic has no other cases")]
pub enum CubicRoots {
    /// Three distinct real roots (`Δ > 0`).
    ThreeSimple,
    /// One real root and a complex conjugate pair (`Δ < 0`).
    SimpleAndComplexPair,
    /// A double root and a simple root (`Δ = 0`, `Δ0 ≠ 0`).
    DoubleAndSimple,
    /// A triple root (`Δ = 0`, `Δ0 = 0`).
    Triple,
}

impl CubicRoots {
    /// The number of distinct real roots.
    pub fn count(self) -> usize {
        match self {
            Self::ThreeSimple => 3,
            Self::DoubleAndSimple => 2,
            Self::SimpleAndComplexPair | Self::Triple => 1,
        }
    }
}

/// Classifies the real roots of c0 + c1 x + c2 x² + c3 x³.
///
/// This looks only at the signs of the discriminant
/// `Δ = 18abcd − 4b³d + b²c² − 4ac³ − 27a²d²` and of `Δ0 = b² − 3ac`, where
/// `a` is the leading coefficient. For integer coefficients below `2^29`
/// these signs are exact.
///
/// Returns `None` if `c3` is zero or any coefficient is not finite.
pub fn classify_cubic(c0: f64, c1: f64, c2: f64, c3: f64) -> Option<CubicRoots> {
    if c3 == 0.0 || check_finite(&[c0, c1, c2, c3]).is_err() {
        return None;
    }
    let (disc, delta0) = cubic_signs([c0, c1, c2, c3]);
    Some(classify(disc, delta0))
}

fn classify(disc: Sign, delta0: Sign) -> CubicRoots {
    match (disc, delta0) {
        (Sign::Positive, _) => CubicRoots::ThreeSimple,
        (Sign::Negative, _) => CubicRoots::SimpleAndComplexPair,
        (Sign::Zero, Sign::Zero) => CubicRoots::Triple,
        (Sign::Zero, _) => CubicRoots::DoubleAndSimple,
    }
}

/// The signs of `Δ` and `Δ0`.
fn cubic_signs(coeffs: [f64; 4]) -> (Sign, Sign) {
    if let Some([d, c, b, a]) = integer_coefficients(coeffs, EXACT_LIMIT) {
        let disc = 18 * a * b * c * d - 4 * b * b * b * d + b * b * c * c
            - 4 * a * c * c * c
            - 27 * a * a * d * d;
        return (Sign::of_int(disc), Sign::of_int(b * b - 3 * a * c));
    }
    // Both signs are unchanged by the substitution x = 2^k·y.
    let (_, [d, c, b, a]) = balance(coeffs);
    let disc: CompensatedSum = [
        18.0 * a * b * c * d,
        -4.0 * b * b * b * d,
        b * b * c * c,
        -4.0 * a * c * c * c,
        -27.0 * a * a * d * d,
    ]
    .into_iter()
    .collect();
    let delta0: CompensatedSum = [b * b, -3.0 * a * c].into_iter().collect();
    (Sign::of_sum(&disc), Sign::of_sum(&delta0))
}

/// Find real roots of cubic equation.
///
/// Return values of x for which c0 + c1 x + c2 x² + c3 x³ = 0, in increasing
/// order, each distinct root once.
///
/// The case is chosen by [`classify_cubic`]. Three distinct roots come from
/// the trigonometric form and a single real root from Cardano's formula, both
/// following Jim Blinn's "How to Solve a Cubic Equation". Repeated roots use
/// the closed forms `(9ad − bc) / 2Δ0` for the double root,
/// `(4abc − 9a²d − b³) / aΔ0` for the simple one, and `−b / 3a` for a triple
/// root. The variable is first scaled by a power of two so that the roots
/// are near one in magnitude, which keeps the intermediate values in range.
/// Every root is then polished and checked against
/// [`Polynomial::eval_error`]; candidates that fail are dropped.
///
/// The closed forms are checked against the critical points, the roots of
/// the derivative. Between two neighboring critical points the cubic has a
/// root exactly when it changes sign, and each sign change without a root is
/// searched with [`Brent`](crate::Brent). This recovers roots that the
/// closed forms lose to rounding, whether in a misjudged discriminant or to
/// magnitudes too far from the others to survive the scaling.
///
/// If `c3` is zero, this is [`solve_quadratic`]. A zero `c0` gives the root
/// `0.0` exactly.
///
/// # Errors
///
/// Returns [`Error::ZeroPolynomial`] if every coefficient is zero, and
/// [`Error::NonFiniteCoefficient`] if any is NaN or infinite.
pub fn solve_cubic(c0: f64, c1: f64, c2: f64, c3: f64) -> Result<ArrayVec<f64, 3>> {
    check_finite(&[c0, c1, c2, c3])?;
    let mut result = ArrayVec::new();
    if c3 == 0.0 {
        result.extend(solve_quadratic(c0, c1, c2)?);
        return Ok(result);
    }
    if c0 == 0.0 {
        result.push(0.0);
        result.extend(solve_quadratic(c1, c2, c3)?);
        let n = sort_dedup(&mut result);
        result.truncate(n);
        return Ok(result);
    }
    let (disc, delta0) = cubic_signs([c0, c1, c2, c3]);
    let (k, [d, c, b, a]) = balance([c0, c1, c2, c3]);
    let mut candidates = ArrayVec::<f64, 3>::new();
    match (disc, delta0) {
        (Sign::Zero, Sign::Zero) => candidates.push(-b / (3.0 * a)),
        (Sign::Zero, _) => {
            let delta0 = b * b - 3.0 * a * c;
            candidates.push((9.0 * a * d - b * c) / (2.0 * delta0));
            candidates.push((4.0 * a * b * c - 9.0 * a * a * d - b * b * b) / (a * delta0));
        }
        _ => blinn(d, c, b, a, disc == Sign::Positive, &mut candidates),
    }
    let roots: ArrayVec<f64, 3> = Polynomial::new([d, c, b, a]).refine_roots(&candidates);
    let known: ArrayVec<f64, 3> = roots.into_iter().map(|y| scalb(y, k)).collect();
    if classify(disc, delta0).count() != known.len() {
        log::debug!("closed form found {known:?} for a cubic with {disc:?} discriminant");
    }
    // A quarter of the derivative.
    let critical = solve_quadratic(0.25 * c1, 0.5 * c2, 0.75 * c3)?;
    Ok(isolate::complete(
        &Polynomial::new([c0, c1, c2, c3]),
        &critical,
        &known,
    ))
}

/// Blinn's solution for the cases with distinct roots.
fn blinn(c0: f64, c1: f64, c2: f64, c3: f64, three: bool, out: &mut ArrayVec<f64, 3>) {
    const ONETHIRD: f64 = 1. / 3.;
    let c3_recip = c3.recip();
    let c2 = c2 * (ONETHIRD * c3_recip);
    let c1 = c1 * (ONETHIRD * c3_recip);
    let c0 = c0 * c3_recip;
    // (d0, d1, d2) is called "Delta" in the article
    let d0 = (-c2).mul_add(c2, c1);
    let d1 = (-c1).mul_add(c2, c0);
    let d2 = c2 * c0 - c1 * c1;
    // d is called "Discriminant". Its sign was settled by the caller, so
    // roundoff that flips it is clamped away.
    let d = 4.0 * d0 * d2 - d1 * d1;
    // de is called "Depressed.x", Depressed.y = d0
    let de = (-2.0 * c2).mul_add(d0, d1);
    if three {
        let th = d.max(0.0).sqrt().atan2(-de) * ONETHIRD;
        // (th_cos, th_sin) is called "CubicRoot"
        let (th_sin, th_cos) = th.sin_cos();
        // (r0, r1, r2) is called "Root"
        let r0 = th_cos;
        let ss3 = th_sin * 3.0f64.sqrt();
        let r1 = 0.5 * (-th_cos + ss3);
        let r2 = 0.5 * (-th_cos - ss3);
        let t = 2.0 * (-d0).max(0.0).sqrt();
        out.push(t.mul_add(r0, -c2));
        out.push(t.mul_add(r1, -c2));
        out.push(t.mul_add(r2, -c2));
    } else {
        let sq = (-0.25 * d).max(0.0).sqrt();
        let r = -0.5 * de;
        // Take the cube root on the side without cancellation; the other
        // one follows from their product, -d0.
        let u = (r + sq.copysign(r)).cbrt();
        let t = if u == 0.0 { 0.0 } else { u - d0 / u };
        out.push(t - c2);
    }
}
