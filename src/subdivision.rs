// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root isolation for Bernstein polynomials by subdividing the control
//! polygon.

use alloc::vec::Vec;
use smallvec::SmallVec;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::{check_finite, scalb, sort_dedup};
use crate::{
    different_signs, refine_solution, solve_polynomial, BezierPolynomial, Brent, Error, Result,
    RootFinder,
};

/// The maximum number of halvings of the unit interval.
const MAX_DEPTH: u32 = 47;

/// Roots closer than this are the same root, and roots this close to an end
/// of the interval are snapped onto it. This is `2^5 · ulp(1)`.
const X_EPSILON: f64 = 1.0 / 140737488355328.0; // 2^-47

/// A piece of the unit interval with the control values of the polynomial
/// restricted to it.
struct Segment {
    coeffs: SmallVec<[f64; 8]>,
    lo: f64,
    hi: f64,
    depth: u32,
}

/// Find the real roots in `[0, 1]` of a polynomial in Bernstein form.
///
/// `coeffs` are the control values `b_0 … b_n`; see [`BezierPolynomial`].
/// The roots are returned in increasing order, each distinct root once.
///
/// Up to degree four, and whenever the monomial leading coefficient is zero,
/// the polynomial is converted to monomial form and handed to
/// [`solve_polynomial`]. Roots within `2^-47` of an end of the interval are
/// snapped onto it.
///
/// Higher degrees are isolated by de Casteljau subdivision. A control value
/// within `2^4 · (n+1) · ε · max|b_i|` of zero has no sign. A segment whose
/// control values have no sign change is pruned, one with a single clean sign
/// change is solved with [`Brent`], and anything else is halved, at most 47
/// times. Candidates are then polished, merged when they cannot be told apart,
/// and kept only if `|B(t)| ≤ 2^8 · (n+1) · ε · max|b_i|`.
///
/// To solve a sub-range of a larger array, pass a slice of it.
///
/// # Errors
///
/// Returns [`Error::EmptyCoefficients`] for an empty slice,
/// [`Error::ZeroPolynomial`] if every control value is zero, and
/// [`Error::NonFiniteCoefficient`] if any is NaN or infinite.
pub fn solve_bezier(coeffs: &[f64]) -> Result<Vec<f64>> {
    let mut roots = Vec::new();
    solve_bezier_into(coeffs, &mut roots)?;
    Ok(roots)
}

/// Like [`solve_bezier`], but writes the roots into `roots`.
///
/// The buffer is cleared first. Returns the number of roots.
///
/// # Errors
///
/// See [`solve_bezier`].
pub fn solve_bezier_into(coeffs: &[f64], roots: &mut Vec<f64>) -> Result<usize> {
    roots.clear();
    if coeffs.is_empty() {
        return Err(Error::EmptyCoefficients);
    }
    check_finite(coeffs)?;
    if coeffs.iter().all(|c| *c == 0.0) {
        return Err(Error::ZeroPolynomial);
    }
    let bezier = BezierPolynomial::new(coeffs.iter().copied());
    let n = bezier.degree();
    let monomial = bezier.to_monomial();
    if n <= 4 || monomial.coeffs()[n] == 0.0 {
        for root in solve_polynomial(monomial.coeffs())? {
            let root = if root.abs() <= X_EPSILON {
                0.0
            } else if (root - 1.0).abs() <= X_EPSILON {
                1.0
            } else {
                root
            };
            if (0.0..=1.0).contains(&root) {
                roots.push(root);
            }
        }
        let len = sort_dedup(roots);
        roots.truncate(len);
        return Ok(len);
    }
    let band = scalb((n + 1) as f64 * f64::EPSILON * bezier.magnitude(), 4);
    bezier_roots_with_band(&bezier, band, roots);
    Ok(roots.len())
}

/// Appends the roots of `bezier` in `[0, 1]`, treating values within `band`
/// of zero as zero. Roots are accepted up to `16 · band`.
///
/// The appended roots are sorted; anything already in `roots` is left alone.
pub(crate) fn bezier_roots_with_band(
    bezier: &BezierPolynomial,
    band: f64,
    roots: &mut Vec<f64>,
) {
    let f = |t: f64| bezier.eval(t);
    let brent =
        Brent::new(|t: f64, _: &()| bezier.eval(t)).with_ferror(|_: f64, _: &()| band / 16.0);
    let in_band = |c: &f64| c.abs() <= band;

    let mut candidates: Vec<f64> = Vec::new();
    let mut stack = Vec::new();
    stack.push(Segment {
        coeffs: bezier.coeffs().iter().copied().collect(),
        lo: 0.0,
        hi: 1.0,
        depth: 0,
    });
    while let Some(segment) = stack.pop() {
        let Segment {
            coeffs,
            lo,
            hi,
            depth,
        } = segment;
        let mid = 0.5 * (lo + hi);
        if coeffs.iter().all(in_band) {
            log::trace!("[{lo}, {hi}] is flat at zero");
            candidates.push(mid);
            continue;
        }
        let changes = sign_changes(&coeffs, band);
        let clean = !coeffs.iter().any(in_band);
        if changes == 0 && clean {
            continue;
        }
        if changes == 1 && clean {
            match brent.find_root((lo, hi)) {
                Ok(t) => {
                    log::trace!("[{lo}, {hi}] has a single root at {t}");
                    candidates.push(t);
                    continue;
                }
                Err(e) => log::debug!("splitting [{lo}, {hi}]: {e}"),
            }
        }
        if depth >= MAX_DEPTH {
            let (f_lo, f_hi) = (f(lo), f(hi));
            if different_signs(f_lo, f_hi) {
                candidates.push(mid);
            } else {
                let best = [lo, mid, hi]
                    .into_iter()
                    .min_by(|a, b| f(*a).abs().total_cmp(&f(*b).abs()))
                    .unwrap_or(mid);
                if f(best).abs() <= band {
                    candidates.push(best);
                }
            }
            log::trace!("[{lo}, {hi}] reached the depth limit");
            continue;
        }
        log::trace!("splitting [{lo}, {hi}] with {changes} sign changes");
        let (left, right) = BezierPolynomial::from_smallvec(coeffs).subdivide(0.5);
        stack.push(Segment {
            coeffs: right.into_coeffs(),
            lo: mid,
            hi,
            depth: depth + 1,
        });
        stack.push(Segment {
            coeffs: left.into_coeffs(),
            lo,
            hi: mid,
            depth: depth + 1,
        });
    }

    let deriv = bezier.deriv();
    for t in &mut candidates {
        *t = refine_solution(f, |t| deriv.eval(t), 0.0, *t).clamp(0.0, 1.0);
    }
    for t in &mut candidates {
        if *t < X_EPSILON && f(0.0).abs() <= f(*t).abs() {
            *t = 0.0;
        } else if 1.0 - *t < X_EPSILON && f(1.0).abs() <= f(*t).abs() {
            *t = 1.0;
        }
    }
    candidates.sort_by(f64::total_cmp);

    let start = roots.len();
    for t in candidates {
        if let Some(prev) = roots[start..].last_mut() {
            if t - *prev <= X_EPSILON || f(0.5 * (*prev + t)).abs() <= band {
                if f(t).abs() < f(*prev).abs() {
                    *prev = t;
                }
                continue;
            }
        }
        roots.push(t);
    }
    let accept = 16.0 * band;
    let mut i = start;
    while i < roots.len() {
        let t = roots[i];
        if f(t).abs() <= accept {
            i += 1;
        } else {
            log::debug!("rejected Bernstein root {t}: residual {}", f(t));
            roots.remove(i);
        }
    }
}

/// Counts sign changes, skipping values within `band` of zero.
fn sign_changes(coeffs: &[f64], band: f64) -> usize {
    let mut changes = 0;
    let mut last = 0.0;
    for &c in coeffs {
        if c.abs() <= band {
            continue;
        }
        if different_signs(last, c) {
            changes += 1;
        }
        last = c;
    }
    changes
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::Polynomial;

    fn verify(roots: &[f64], expected: &[f64], epsilon: f64) {
        assert_eq!(expected.len(), roots.len(), "{roots:?} vs {expected:?}");
        for (r, x) in roots.iter().zip(expected) {
            assert!((r - x).abs() <= epsilon, "{roots:?} vs {expected:?}");
        }
    }

    fn bernstein(p: &Polynomial) -> Vec<f64> {
        p.to_bernstein().coeffs().to_vec()
    }

    #[test]
    fn sign_change_count() {
        assert_eq!(sign_changes(&[1.0, -1.0, 1.0], 0.0), 2);
        assert_eq!(sign_changes(&[1.0, 1e-20, -1.0], 1e-10), 1);
        assert_eq!(sign_changes(&[1.0, -1e-20, 1.0], 1e-10), 0);
        assert_eq!(sign_changes(&[0.0, 0.0], 0.0), 0);
    }

    #[test]
    fn high_degree() {
        // (x - 0.1)(x - 0.4)(x - 0.8)(x² + 1)
        let p = Polynomial::from_roots(&[0.1, 0.4, 0.8]) * &Polynomial::new([1.0, 0.0, 1.0]);
        let roots = solve_bezier(&bernstein(&p)).unwrap();
        verify(&roots, &[0.1, 0.4, 0.8], 1e-12);
    }

    #[test]
    fn roots_at_ends() {
        // x (x - 0.5)(x - 1)(x² + x + 1)
        let p = Polynomial::from_roots(&[0.0, 0.5, 1.0]) * &Polynomial::new([1.0, 1.0, 1.0]);
        let roots = solve_bezier(&bernstein(&p)).unwrap();
        assert_eq!(roots, [0.0, 0.5, 1.0]);
    }

    #[test]
    fn double_root() {
        let p = Polynomial::from_roots(&[0.3, 0.3, 0.6]) * &Polynomial::new([1.0, 0.0, 1.0]);
        let roots = solve_bezier(&bernstein(&p)).unwrap();
        verify(&roots, &[0.3, 0.6], 1e-7);
    }

    #[test]
    fn no_roots() {
        assert!(solve_bezier(&[1.0, 2.0, -0.5, 3.0, 0.25, 1.0])
            .unwrap()
            .is_empty());
        assert!(solve_bezier(&[3.0]).unwrap().is_empty());
    }

    #[test]
    fn low_degree_matches_monomial() {
        // One root just outside the unit interval.
        let b = [400.0, 4666.667, 8933.333, 13200.0];
        assert!(solve_bezier(&b).unwrap().is_empty());
        let b = b.map(|c| c - 1000.0);
        let roots = solve_bezier(&b).unwrap();
        let expected: Vec<f64> = BezierPolynomial::new(b)
            .to_monomial()
            .roots()
            .unwrap()
            .into_iter()
            .filter(|t| (0.0..=1.0).contains(t))
            .collect();
        assert_eq!(roots.len(), 1);
        verify(&roots, &expected, 1e-10);
        assert!((roots[0] - 0.046875).abs() < 1e-7);
    }

    #[test]
    fn degree_drop() {
        // -3 + 10t written with degree-five control values.
        let b = [-3.0, -1.0, 1.0, 3.0, 5.0, 7.0];
        assert_eq!(
            BezierPolynomial::new(b).to_monomial().coeffs(),
            &[-3.0, 10.0, 0.0, 0.0, 0.0, 0.0]
        );
        verify(&solve_bezier(&b).unwrap(), &[0.3], 1e-15);
        // A quintic written with degree-seven control values.
        let p = Polynomial::from_roots(&[0.2, 0.5, 0.9]) * &Polynomial::new([2.0, 0.0, 1.0]);
        let padded = Polynomial::new(p.coeffs().iter().copied().chain([0.0, 0.0]));
        let b = bernstein(&padded);
        assert_eq!(b.len(), 8);
        verify(&solve_bezier(&b).unwrap(), &[0.2, 0.5, 0.9], 1e-12);
    }

    #[test]
    fn into_clears_buffer() {
        let mut roots = vec![5.0, 6.0];
        let n = solve_bezier_into(&[-1.0, 1.0], &mut roots).unwrap();
        assert_eq!(n, 1);
        assert_eq!(roots, [0.5]);
    }

    #[test]
    fn bad_input() {
        assert_eq!(solve_bezier(&[]), Err(Error::EmptyCoefficients));
        assert_eq!(solve_bezier(&[0.0; 6]), Err(Error::ZeroPolynomial));
        assert_eq!(
            solve_bezier(&[1.0, f64::NAN, 1.0]),
            Err(Error::NonFiniteCoefficient { index: 1 })
        );
    }

    #[test]
    fn random_agrees_with_monomial() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let n = rng.random_range(5..10);
            let b: Vec<f64> = (0..=n).map(|_| rng.random_range(-1.0..1.0)).collect();
            let roots = solve_bezier(&b).unwrap();
            let expected: Vec<f64> = BezierPolynomial::new(b.iter().copied())
                .to_monomial()
                .roots()
                .unwrap()
                .into_iter()
                .filter(|t| (0.0..=1.0).contains(t))
                .collect();
            verify(&roots, &expected, 1e-10);
        }
    }

    #[test]
    fn arbitrary_roots_are_sorted() {
        arbtest::arbtest(|u| {
            let degree = u.int_in_range(1..=9)?;
            let b = crate::arbitrary::bezier(u, degree)?;
            if b.coeffs().iter().all(|c| *c == 0.0) {
                return Ok(());
            }
            let roots = solve_bezier(b.coeffs()).unwrap();
            assert!(roots.windows(2).all(|w| w[0] < w[1]), "{b:?}: {roots:?}");
            assert!(roots.iter().all(|t| (0.0..=1.0).contains(t)));
            Ok(())
        })
        .budget_ms(5_000);
    }
}
