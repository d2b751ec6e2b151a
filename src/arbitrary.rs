// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generators for fuzz and property testing using `arbitrary`.

use alloc::vec::Vec;

use arbitrary::Unstructured;

use crate::{BezierPolynomial, Polynomial};

type Result<T> = core::result::Result<T, arbitrary::Error>;

fn require_finite(x: f64) -> Result<f64> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(arbitrary::Error::IncorrectFormat)
    }
}

/// An arbitrary finite float.
pub fn finite_float(u: &mut Unstructured<'_>) -> Result<f64> {
    require_finite(u.arbitrary()?)
}

/// A finite float that has a good chance of being within a few ulps of
/// `near`, for generating almost-repeated roots.
fn another_finite_float(near: f64, u: &mut Unstructured<'_>) -> Result<f64> {
    if u.arbitrary()? {
        let ulps: i32 = u.int_in_range(-32..=32)?;
        require_finite(near * (1.0 + f64::from(ulps) * f64::EPSILON))
    } else {
        finite_float(u)
    }
}

/// An arbitrary float in `(-1.0, 1.0)`.
pub fn float_in_unit_interval(u: &mut Unstructured<'_>) -> Result<f64> {
    let mantissa = u.arbitrary::<u64>()? & ((1 << 52) - 1);
    let sign = if u.arbitrary()? { 1 << 63 } else { 0 };
    // Biased exponents top out at 1022, below 1.0. Half the time we pick
    // 1022 outright, or nearly everything would be tiny.
    let exponent = if u.arbitrary()? {
        1022
    } else {
        u.arbitrary::<u64>()? % 1023
    };
    Ok(f64::from_bits(sign | (exponent << 52) | mantissa))
}

/// A float that is either zero or has magnitude in `[2^-20, 2^20)`.
///
/// Polynomials built from these can be evaluated near their roots without
/// overflow or underflow.
pub fn moderate_float(u: &mut Unstructured<'_>) -> Result<f64> {
    if u.ratio(1, 8)? {
        return Ok(0.0);
    }
    let mantissa = u.arbitrary::<u64>()? & ((1 << 52) - 1);
    let sign = if u.arbitrary()? { 1 << 63 } else { 0 };
    let exponent: u64 = u.int_in_range(1003..=1042)?;
    Ok(f64::from_bits(sign | (exponent << 52) | mantissa))
}

/// An arbitrary polynomial of the given degree with finite coefficients.
///
/// Half the time the coefficients are generated directly; otherwise the
/// polynomial is a scaled product of linear factors, with a bias towards
/// almost-repeated roots. The leading coefficient may be zero.
pub fn poly(u: &mut Unstructured<'_>, degree: usize) -> Result<Polynomial> {
    if u.arbitrary()? {
        let mut coeffs = Vec::with_capacity(degree + 1);
        let mut c = finite_float(u)?;
        coeffs.push(c);
        for _ in 0..degree {
            c = another_finite_float(c, u)?;
            coeffs.push(c);
        }
        Ok(Polynomial::new(coeffs))
    } else {
        let mut roots = Vec::with_capacity(degree);
        let mut r = finite_float(u)?;
        for _ in 0..degree {
            roots.push(r);
            r = another_finite_float(r, u)?;
        }
        scaled(Polynomial::from_roots(&roots), finite_float(u)?)
    }
}

/// Like [`poly`], but with every coefficient and root drawn from
/// [`moderate_float`].
pub fn moderate_poly(u: &mut Unstructured<'_>, degree: usize) -> Result<Polynomial> {
    if u.arbitrary()? {
        let coeffs = (0..=degree)
            .map(|_| moderate_float(u))
            .collect::<Result<Vec<_>>>()?;
        Ok(Polynomial::new(coeffs))
    } else {
        let roots = (0..degree)
            .map(|_| moderate_float(u))
            .collect::<Result<Vec<_>>>()?;
        scaled(Polynomial::from_roots(&roots), moderate_float(u)?)
    }
}

/// A polynomial of the given degree (at least one) with a root at `root`
/// and no other roots within `buffer` of it.
pub fn poly_with_planted_root(
    u: &mut Unstructured<'_>,
    degree: usize,
    root: f64,
    buffer: f64,
) -> Result<Polynomial> {
    let mut roots = Vec::with_capacity(degree);
    let mut r = finite_float(u)?;
    for _ in 1..degree {
        if (r - root).abs() < buffer {
            return Err(arbitrary::Error::IncorrectFormat);
        }
        roots.push(r);
        r = another_finite_float(r, u)?;
    }
    // The last factor multiplied in is the one whose root survives rounding
    // best.
    roots.push(root);
    scaled(Polynomial::from_roots(&roots), finite_float(u)?.max(1.0))
}

/// A Bernstein polynomial of the given degree with moderate control values.
pub fn bezier(u: &mut Unstructured<'_>, degree: usize) -> Result<BezierPolynomial> {
    let coeffs = (0..=degree)
        .map(|_| moderate_float(u))
        .collect::<Result<Vec<_>>>()?;
    Ok(BezierPolynomial::new(coeffs))
}

fn scaled(p: Polynomial, scale: f64) -> Result<Polynomial> {
    let coeffs = p
        .coeffs()
        .iter()
        .map(|c| require_finite(c * scale))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polynomial::new(coeffs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval() {
        arbtest::arbtest(|u| {
            let x = float_in_unit_interval(u)?;
            assert!(x.abs() < 1.0);
            Ok(())
        });
    }

    #[test]
    fn moderate_range() {
        arbtest::arbtest(|u| {
            let x = moderate_float(u)?.abs();
            assert!(x == 0.0 || (x >= 1.0 / 1048576.0 && x < 1048576.0));
            Ok(())
        });
    }

    #[test]
    fn planted_root() {
        arbtest::arbtest(|u| {
            let r = float_in_unit_interval(u)?;
            let degree = u.int_in_range(1..=8)?;
            let p = poly_with_planted_root(u, degree, r, 1e-6)?;
            assert_eq!(p.coeffs().len(), degree + 1);
            assert!(p.eval(r).abs() <= 1e-12 * p.magnitude().max(1.0));
            Ok(())
        });
    }
}
