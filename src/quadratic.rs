// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear and quadratic equations.

use arrayvec::ArrayVec;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::{check_finite, integer_coefficients, normalize, two_product, ulp, Sign};
use crate::{Error, Polynomial, Result};

/// Integer coefficients below this have an exactly computable discriminant.
const EXACT_LIMIT: f64 = 9007199254740992.0; // 2^53

/// Find the real root of a linear equation.
///
/// Return values of x for which c0 + c1 x = 0.
///
/// If `c1` is zero there is no root, unless `c0` is zero as well. A root too
/// large to represent is not reported.
///
/// # Errors
///
/// Returns [`Error::ZeroPolynomial`] if both coefficients are zero, and
/// [`Error::NonFiniteCoefficient`] if either is NaN or infinite.
pub fn solve_linear(c0: f64, c1: f64) -> Result<ArrayVec<f64, 1>> {
    check_finite(&[c0, c1])?;
    let mut result = ArrayVec::new();
    if c1 == 0.0 {
        if c0 == 0.0 {
            return Err(Error::ZeroPolynomial);
        }
        return Ok(result);
    }
    let root = -c0 / c1 + 0.0;
    if root.is_finite() {
        result.push(root);
    }
    Ok(result)
}

/// Find real roots of quadratic equation.
///
/// Return values of x for which c0 + c1 x + c2 x² = 0, in increasing order.
/// A double root is reported once.
///
/// The coefficients are first scaled by a power of two. For integer
/// coefficients below `2^53` the sign of the discriminant is exact; otherwise
/// a discriminant within ten ULPs of zero counts as zero. One root is found
/// with the cancellation-free `q = -(b + sign(b)·√D) / 2`, `x = q / a`, and the
/// other from the product of the roots, `x = c / q`. Both are then polished
/// and checked against the residual bound of
/// [`Polynomial::eval_error`].
///
/// If `c2` is zero, this is [`solve_linear`].
///
/// # Errors
///
/// Returns [`Error::ZeroPolynomial`] if every coefficient is zero, and
/// [`Error::NonFiniteCoefficient`] if any is NaN or infinite.
pub fn solve_quadratic(c0: f64, c1: f64, c2: f64) -> Result<ArrayVec<f64, 2>> {
    check_finite(&[c0, c1, c2])?;
    let mut result = ArrayVec::new();
    if c2 == 0.0 {
        result.extend(solve_linear(c0, c1)?);
        return Ok(result);
    }
    let sign = discriminant_sign(c0, c1, c2);
    let [c, b, a] = normalize([c0, c1, c2]);
    match sign {
        Sign::Negative => return Ok(result),
        Sign::Zero => result.push(-b / (2.0 * a)),
        Sign::Positive => {
            let d = discriminant(c, b, a).max(0.0);
            if b == 0.0 {
                let r = (-c / a).sqrt();
                result.push(-r);
                result.push(r);
            } else {
                let q = -0.5 * (b + d.sqrt().copysign(b));
                result.push(q / a);
                result.push(c / q);
            }
        }
    }
    Ok(Polynomial::new([c, b, a]).refine_roots(&result))
}

/// `b² - 4ac` with both products evaluated exactly.
fn discriminant(c: f64, b: f64, a: f64) -> f64 {
    let (bb, bb_err) = two_product(b, b);
    let (ac, ac_err) = two_product(4.0 * a, c);
    (bb - ac) + (bb_err - ac_err)
}

fn discriminant_sign(c0: f64, c1: f64, c2: f64) -> Sign {
    if let Some([c, b, a]) = integer_coefficients([c0, c1, c2], EXACT_LIMIT) {
        return Sign::of_int(b * b - 4 * a * c);
    }
    let [c, b, a] = normalize([c0, c1, c2]);
    let limit = 10.0 * ulp(b * b).max(ulp(4.0 * a * c));
    Sign::with_tolerance(discriminant(c, b, a), limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify<const N: usize>(roots: ArrayVec<f64, N>, expected: &[f64]) {
        assert_eq!(expected.len(), roots.len(), "{roots:?} vs {expected:?}");
        let epsilon = 1e-12;
        for i in 0..expected.len() {
            assert!(
                (roots[i] - expected[i]).abs() < epsilon,
                "{roots:?} vs {expected:?}"
            );
        }
    }

    #[test]
    fn test_solve_linear() {
        verify(solve_linear(3.0, 1.5).unwrap(), &[-2.0]);
        verify(solve_linear(1.0, 0.0).unwrap(), &[]);
        verify(solve_linear(1e300, 1e-300).unwrap(), &[]);
        assert_eq!(solve_linear(0.0, 2.0).unwrap()[0].to_bits(), 0);
        assert_eq!(solve_linear(0.0, 0.0), Err(Error::ZeroPolynomial));
        assert_eq!(
            solve_linear(0.0, f64::NAN),
            Err(Error::NonFiniteCoefficient { index: 1 })
        );
    }

    #[test]
    fn test_solve_quadratic() {
        verify(
            solve_quadratic(-5.0, 0.0, 1.0).unwrap(),
            &[-(5.0f64.sqrt()), 5.0f64.sqrt()],
        );
        verify(solve_quadratic(5.0, 0.0, 1.0).unwrap(), &[]);
        verify(solve_quadratic(5.0, 1.0, 0.0).unwrap(), &[-5.0]);
        verify(solve_quadratic(1.0, 2.0, 1.0).unwrap(), &[-1.0]);
        verify(solve_quadratic(0.0, 1.0, 1.0).unwrap(), &[-1.0, 0.0]);
    }

    #[test]
    fn double_root_is_reported_once() {
        assert_eq!(solve_quadratic(1.0, -2.0, 1.0).unwrap().as_slice(), &[1.0]);
        // (x - 0.1)², where the coefficients are already rounded.
        let roots = solve_quadratic(0.01, -0.2, 1.0).unwrap();
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 0.1).abs() < 1e-8);
    }

    #[test]
    fn wide_dynamic_range() {
        let roots = solve_quadratic(1.0, 1e200, 1.0).unwrap();
        assert_eq!(roots.len(), 2);
        assert!((roots[0] / -1e200 - 1.0).abs() < 1e-15);
        assert!((roots[1] / -1e-200 - 1.0).abs() < 1e-15);
        let roots = solve_quadratic(-3e-300, 0.0, 3e-300).unwrap();
        verify(roots, &[-1.0, 1.0]);
    }

    #[test]
    fn degenerate() {
        assert_eq!(solve_quadratic(0.0, 0.0, 0.0), Err(Error::ZeroPolynomial));
        assert_eq!(
            solve_quadratic(1.0, f64::INFINITY, 1.0),
            Err(Error::NonFiniteCoefficient { index: 1 })
        );
        assert!(solve_quadratic(1.0, 0.0, 0.0).unwrap().is_empty());
    }
}
