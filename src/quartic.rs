// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quartic equations.

use arrayvec::ArrayVec;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::{
    balance, check_finite, integer_coefficients, scalb, sort_dedup, CompensatedSum, Sign,
};
use crate::{isolate, solve_cubic, solve_quadratic, Polynomial, Result};

/// Integer coefficients below this have exactly computable discriminants.
const EXACT_LIMIT: f64 = 262144.0; // 2^18

/// The signs of the invariants that classify the real roots of a quartic
/// `a x⁴ + b x³ + c x² + d x + e`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuarticSigns {
    /// The discriminant `Δ`.
    pub discriminant: Sign,
    /// `P = 8ac − 3b²`.
    pub p: Sign,
    /// `R = b³ + 8a²d − 4abc`.
    pub r: Sign,
    /// `Δ0 = c² − 3bd + 12ae`.
    pub delta0: Sign,
    /// `D = 64a³e − 16a²c² + 16ab²c − 16a²bd − 3b⁴`.
    pub d: Sign,
}

/// The real roots of a quartic with nonzero leading coefficient, by
/// multiplicity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "a quartic has no other cases")]
pub enum QuarticRoots {
    /// Four distinct real roots.
    FourSimple,
    /// Two distinct real roots and a complex conjugate pair.
    TwoSimple,
    /// Two complex conjugate pairs.
    NoReal,
    /// A double root and two simple real roots.
    DoubleAndTwoSimple,
    /// A double real root and a complex conjugate pair.
    DoubleAndComplexPair,
    /// A triple root and a simple root.
    TripleAndSimple,
    /// Two double real roots.
    TwoDouble,
    /// A quadruple root.
    Quadruple,
    /// A complex conjugate pair, each of multiplicity two.
    ComplexDoublePair,
}

impl QuarticRoots {
    /// The number of distinct real roots.
    pub fn count(self) -> usize {
        match self {
            Self::FourSimple => 4,
            Self::DoubleAndTwoSimple => 3,
            Self::TwoSimple | Self::TripleAndSimple | Self::TwoDouble => 2,
            Self::DoubleAndComplexPair | Self::Quadruple => 1,
            Self::NoReal | Self::ComplexDoublePair => 0,
        }
    }

    /// Whether any root, real or complex, is repeated.
    pub fn has_repeated_root(self) -> bool {
        !matches!(self, Self::FourSimple | Self::TwoSimple | Self::NoReal)
    }
}

impl QuarticSigns {
    /// Computes the signs for c0 + c1 x + c2 x² + c3 x³ + c4 x⁴.
    ///
    /// For integer coefficients below `2^18` the signs are exact. Otherwise
    /// each invariant is a compensated sum of its terms, evaluated after
    /// scaling the variable so the roots are near one.
    pub fn new(c0: f64, c1: f64, c2: f64, c3: f64, c4: f64) -> Self {
        if let Some([e, d, c, b, a]) = integer_coefficients([c0, c1, c2, c3, c4], EXACT_LIMIT) {
            let disc = 256 * a * a * a * e * e * e - 192 * a * a * b * d * e * e
                - 128 * a * a * c * c * e * e
                + 144 * a * a * c * d * d * e
                - 27 * a * a * d * d * d * d
                + 144 * a * b * b * c * e * e
                - 6 * a * b * b * d * d * e
                - 80 * a * b * c * c * d * e
                + 18 * a * b * c * d * d * d
                + 16 * a * c * c * c * c * e
                - 4 * a * c * c * c * d * d
                - 27 * b * b * b * b * e * e
                + 18 * b * b * b * c * d * e
                - 4 * b * b * b * d * d * d
                - 4 * b * b * c * c * c * e
                + b * b * c * c * d * d;
            return Self {
                discriminant: Sign::of_int(disc),
                p: Sign::of_int(8 * a * c - 3 * b * b),
                r: Sign::of_int(b * b * b + 8 * a * a * d - 4 * a * b * c),
                delta0: Sign::of_int(c * c - 3 * b * d + 12 * a * e),
                d: Sign::of_int(
                    64 * a * a * a * e - 16 * a * a * c * c + 16 * a * b * b * c
                        - 16 * a * a * b * d
                        - 3 * b * b * b * b,
                ),
            };
        }
        let (_, [e, d, c, b, a]) = balance([c0, c1, c2, c3, c4]);
        let sign =
            |terms: &[f64]| Sign::of_sum(&terms.iter().copied().collect::<CompensatedSum>());
        Self {
            discriminant: sign(&[
                256.0 * a * a * a * e * e * e,
                -192.0 * a * a * b * d * e * e,
                -128.0 * a * a * c * c * e * e,
                144.0 * a * a * c * d * d * e,
                -27.0 * a * a * d * d * d * d,
                144.0 * a * b * b * c * e * e,
                -6.0 * a * b * b * d * d * e,
                -80.0 * a * b * c * c * d * e,
                18.0 * a * b * c * d * d * d,
                16.0 * a * c * c * c * c * e,
                -4.0 * a * c * c * c * d * d,
                -27.0 * b * b * b * b * e * e,
                18.0 * b * b * b * c * d * e,
                -4.0 * b * b * b * d * d * d,
                -4.0 * b * b * c * c * c * e,
                b * b * c * c * d * d,
            ]),
            p: sign(&[8.0 * a * c, -3.0 * b * b]),
            r: sign(&[b * b * b, 8.0 * a * a * d, -4.0 * a * b * c]),
            delta0: sign(&[c * c, -3.0 * b * d, 12.0 * a * e]),
            d: sign(&[
                64.0 * a * a * a * e,
                -16.0 * a * a * c * c,
                16.0 * a * b * b * c,
                -16.0 * a * a * b * d,
                -3.0 * b * b * b * b,
            ]),
        }
    }

    /// Looks the signs up in the classification table.
    ///
    /// Rows are tried in order and the first match wins. Returns `None` for
    /// sign patterns that no quartic with real coefficients produces, which
    /// can only come from roundoff in the floating-point invariants.
    pub fn classify(self) -> Option<QuarticRoots> {
        use QuarticRoots::{
            ComplexDoublePair, DoubleAndComplexPair, DoubleAndTwoSimple, FourSimple, NoReal,
            Quadruple, TripleAndSimple, TwoDouble, TwoSimple,
        };
        use Sign::{Negative as Neg, Positive as Pos, Zero};
        // (Δ, P, D, Δ0, R)
        match (self.discriminant, self.p, self.d, self.delta0, self.r) {
            (Neg, ..) => Some(TwoSimple),
            (Pos, Neg, Neg, ..) => Some(FourSimple),
            (Pos, Pos, ..) | (Pos, _, Pos, ..) => Some(NoReal),
            (Zero, Neg, Neg, Neg | Pos, _) => Some(DoubleAndTwoSimple),
            (Zero, _, Pos, ..) | (Zero, Pos, Neg, ..) | (Zero, Pos, Zero, _, Neg | Pos) => {
                Some(DoubleAndComplexPair)
            }
            (Zero, _, Neg, Zero, _) => Some(TripleAndSimple),
            (Zero, Neg, Zero, ..) => Some(TwoDouble),
            (Zero, _, Zero, Zero, _) => Some(Quadruple),
            (Zero, _, Zero, ..) => Some(ComplexDoublePair),
            _ => None,
        }
    }
}

/// Classifies the real roots of c0 + c1 x + c2 x² + c3 x³ + c4 x⁴.
///
/// Returns `None` if `c4` is zero, if any coefficient is not finite, or if
/// the computed signs match no row of the table.
pub fn classify_quartic(c0: f64, c1: f64, c2: f64, c3: f64, c4: f64) -> Option<QuarticRoots> {
    if c4 == 0.0 || check_finite(&[c0, c1, c2, c3, c4]).is_err() {
        return None;
    }
    QuarticSigns::new(c0, c1, c2, c3, c4).classify()
}

/// Find real roots of quartic equation.
///
/// Return values of x for which c0 + c1 x + c2 x² + c3 x³ + c4 x⁴ = 0, in
/// increasing order, each distinct root once.
///
/// Quartics with distinct roots are solved with Ferrari's method through
/// the resolvent cubic, after scaling the variable by a power of two so the
/// roots are near one in magnitude. Ferrari's roots are validated against
/// the quartic and then checked against its critical points: between two
/// neighboring critical points the quartic has a root exactly when it
/// changes sign, and each sign change that no validated root accounts for
/// is searched with [`Brent`](crate::Brent). When [`classify_quartic`]
/// reports a repeated root, Ferrari's method is skipped and all roots come
/// from this search. A critical point where the polynomial vanishes within
/// [`Polynomial::eval_error`] is a multiple root.
///
/// If `c4` is zero, this is [`solve_cubic`]. A zero `c0` gives the root
/// `0.0` exactly.
///
/// # Errors
///
/// Returns [`Error::ZeroPolynomial`](crate::Error::ZeroPolynomial) if every
/// coefficient is zero, and
/// [`Error::NonFiniteCoefficient`](crate::Error::NonFiniteCoefficient) if any
/// is NaN or infinite.
pub fn solve_quartic(c0: f64, c1: f64, c2: f64, c3: f64, c4: f64) -> Result<ArrayVec<f64, 4>> {
    check_finite(&[c0, c1, c2, c3, c4])?;
    let mut result = ArrayVec::new();
    if c4 == 0.0 {
        result.extend(solve_cubic(c0, c1, c2, c3)?);
        return Ok(result);
    }
    if c0 == 0.0 {
        result.push(0.0);
        result.extend(solve_cubic(c1, c2, c3, c4)?);
        let n = sort_dedup(&mut result);
        result.truncate(n);
        return Ok(result);
    }
    let kind = QuarticSigns::new(c0, c1, c2, c3, c4).classify();
    let (k, coeffs) = balance([c0, c1, c2, c3, c4]);
    let mut known = ArrayVec::<f64, 4>::new();
    match kind {
        Some(kind) if kind.has_repeated_root() => {
            log::debug!("quartic has repeated roots ({kind:?}), isolating");
        }
        _ => {
            if let Some(roots) = ferrari(coeffs)? {
                known.extend(roots.into_iter().map(|y| scalb(y, k)));
            }
            if kind.map_or(true, |kind| kind.count() != known.len()) {
                log::debug!("Ferrari found {known:?} where {kind:?} was expected");
            }
        }
    }
    // A quarter of the derivative.
    let critical = solve_cubic(0.25 * c1, 0.5 * c2, 0.75 * c3, c4)?;
    Ok(isolate::complete(
        &Polynomial::new([c0, c1, c2, c3, c4]),
        &critical,
        &known,
    ))
}

/// Ferrari's method. Returns `None` when the resolvent cubic has no positive
/// root, which only happens through roundoff.
fn ferrari(coeffs: [f64; 5]) -> Result<Option<ArrayVec<f64, 4>>> {
    let [e, d, c, b, a] = coeffs;
    let (b, c, d, e) = (b / a, c / a, d / a, e / a);
    // Depressed quartic y⁴ + p y² + q y + r with x = y − b/4.
    let bb = b * b;
    let p = c - 0.375 * bb;
    let q = d - 0.5 * b * c + 0.125 * bb * b;
    let r = e - 0.25 * b * d + 0.0625 * bb * c - (3.0 / 256.0) * bb * bb;
    let q_noise = f64::EPSILON * (d.abs() + 0.5 * (b * c).abs() + 0.125 * (bb * b).abs());
    let mut candidates = ArrayVec::<f64, 4>::new();
    if q.abs() <= q_noise {
        // Biquadratic.
        for z in solve_quadratic(r, p, 1.0)? {
            if z > 0.0 {
                candidates.push(-z.sqrt());
                candidates.push(z.sqrt());
            } else if z == 0.0 {
                candidates.push(0.0);
            }
        }
    } else {
        // (y² + p/2 + m)² = (s y − q/2s)² with s = √(2m), where m is a root of
        // the resolvent 8m³ + 8pm² + (2p² − 8r)m − q².
        let resolvent = solve_cubic(-q * q, 2.0 * p * p - 8.0 * r, 8.0 * p, 8.0)?;
        let Some(&m) = resolvent.last().filter(|m| **m > 0.0) else {
            return Ok(None);
        };
        let s = (2.0 * m).sqrt();
        let h = 0.5 * p + m;
        let t = 0.5 * q / s;
        candidates.extend(solve_quadratic(h + t, -s, 1.0)?);
        candidates.extend(solve_quadratic(h - t, s, 1.0)?);
    }
    for y in &mut candidates {
        *y -= 0.25 * b;
    }
    Ok(Some(Polynomial::new(coeffs).refine_roots(&candidates)))
}
