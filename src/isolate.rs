// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root isolation between critical points.
//!
//! Between two neighboring critical points a polynomial is monotonic, so it
//! has a root there exactly when its values at the two ends differ in sign.
//! The solvers use this to check the roots they found by other means: any
//! sign change that no known root accounts for is searched with [`Brent`].

use arrayvec::ArrayVec;
use smallvec::{smallvec, SmallVec};

use crate::common::{ilogb, scalb};
use crate::{different_signs, Brent, Polynomial, RootFinder};

/// The binary exponent of the smallest subnormal.
pub(crate) const MIN_EXPONENT: i32 = -1074;

/// The largest exponent worth searching; `2^1024` is already infinite.
const MAX_EXPONENT: i32 = 1024;

/// Validates `known` against `p`, adds the roots it misses, and returns them
/// sorted and merged.
///
/// `critical` must hold the real roots of the derivative of `p`.
pub(crate) fn complete<const N: usize>(
    p: &Polynomial,
    critical: &[f64],
    known: &[f64],
) -> ArrayVec<f64, N> {
    let mut roots: SmallVec<[f64; 8]> = known
        .iter()
        .copied()
        .filter(|x| x.is_finite() && p.is_root(*x))
        .collect();
    let mut missing = SmallVec::<[f64; 4]>::new();
    find_missing(p, critical, &roots, |x| missing.push(x));
    roots.extend(missing);
    let n = p.merge_roots(&mut roots);
    if n > N {
        log::debug!("isolation kept {N} of {n} roots");
    }
    roots[..n.min(N)].iter().copied().collect()
}

/// Calls `found` with every root of `p` that `known` misses.
///
/// The search visits the critical points, the origin and Fujiwara's bounds
/// on the root magnitudes in order. A critical point that passes the residual
/// test is a multiple root. Between neighboring points, a sign change with no
/// known root in the closed interval holds one simple root, which is found
/// with [`Brent`] and polished.
pub(crate) fn find_missing(
    p: &Polynomial,
    critical: &[f64],
    known: &[f64],
    mut found: impl FnMut(f64),
) {
    let Some((lo, hi)) = p.root_exponents() else {
        return;
    };
    let bound = scalb(1.0, hi.min(MAX_EXPONENT)).min(f64::MAX);
    let tiny = scalb(1.0, lo.max(MIN_EXPONENT));
    let mut points: SmallVec<[f64; 8]> = smallvec![-bound, 0.0, bound];
    for &x in critical {
        if x.is_finite() && x.abs() < bound {
            if p.is_root(x) {
                found(x);
            }
            points.push(x);
        }
    }
    points.sort_by(f64::total_cmp);
    points.dedup();
    let values: SmallVec<[f64; 8]> = points.iter().map(|x| p.residual(*x).0).collect();
    for i in 1..points.len() {
        let (a, b) = (points[i - 1], points[i]);
        if !different_signs(values[i - 1], values[i])
            || known.iter().any(|x| (a..=b).contains(x))
        {
            continue;
        }
        if let Some(x) = bracketed_root(p, (a, values[i - 1]), (b, values[i]), tiny) {
            let polished = p.polish(x) + 0.0;
            found(if p.is_root(polished) { polished } else { x });
        }
    }
}

/// The root of `p` in `[a, b]`, where `p` is monotonic and `fa`, `fb` have
/// opposite signs. No root is smaller in magnitude than `tiny`.
fn bracketed_root(
    p: &Polynomial,
    (mut a, mut fa): (f64, f64),
    (mut b, mut fb): (f64, f64),
    tiny: f64,
) -> Option<f64> {
    // Zero is one of the points, so an end at zero is the only way to touch
    // it. Roots stay clear of the interval (-tiny, tiny).
    if a == 0.0 {
        a = tiny;
        fa = p.residual(a).0;
    }
    if b == 0.0 {
        b = -tiny;
        fb = p.residual(b).0;
    }
    if a >= b || !different_signs(fa, fb) {
        return None;
    }
    // Bisect the exponents until the bracket spans at most two binades.
    while let (Some(ea), Some(eb)) = (ilogb(a), ilogb(b)) {
        if (ea - eb).abs() <= 1 {
            break;
        }
        let m = scalb(1.0, (ea + eb) / 2);
        let m = if a < 0.0 { -m } else { m };
        let fm = p.residual(m).0;
        if fm == 0.0 {
            return Some(m);
        }
        if different_signs(fa, fm) {
            b = m;
            fb = fm;
        } else {
            a = m;
            fa = fm;
        }
    }
    debug_assert!(different_signs(fa, fb), "lost the sign change");
    let e = ilogb(a.abs().max(b.abs())).unwrap_or(0);
    let q = p.rescaled(e);
    let brent = Brent::new(|y: f64, _: &()| q.eval_compensated(y))
        .with_ferror(|y: f64, _: &()| q.eval_error(y));
    match brent.find_root((scalb(a, -e), scalb(b, -e))) {
        Ok(y) => Some(scalb(y, e)),
        Err(err) => {
            log::debug!("no root in [{a}, {b}]: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_roots_between_critical_points() {
        // (x - 1)(x - 2)(x - 3), with critical points 2 ± 1/√3.
        let p = Polynomial::from_roots(&[1.0, 2.0, 3.0]);
        let critical = [2.0 - 3f64.sqrt().recip(), 2.0 + 3f64.sqrt().recip()];
        let roots: ArrayVec<f64, 3> = complete(&p, &critical, &[]);
        assert_eq!(roots.as_slice(), &[1.0, 2.0, 3.0]);
        // Known roots are kept as they are.
        let roots: ArrayVec<f64, 3> = complete(&p, &critical, &[2.0]);
        assert_eq!(roots.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn drops_bad_known_roots() {
        let p = Polynomial::from_roots(&[1.0, 2.0, 3.0]);
        let critical = [2.0 - 3f64.sqrt().recip(), 2.0 + 3f64.sqrt().recip()];
        let roots: ArrayVec<f64, 3> = complete(&p, &critical, &[0.0, 2.5, f64::INFINITY]);
        assert_eq!(roots.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn critical_point_root() {
        // (x - 1)²(x + 1) has a double root at its critical point 1.
        let p = Polynomial::from_roots(&[1.0, 1.0, -1.0]);
        let roots: ArrayVec<f64, 3> = complete(&p, &[-1.0 / 3.0, 1.0], &[]);
        assert_eq!(roots.as_slice(), &[-1.0, 1.0]);
    }

    #[test]
    fn roots_far_apart() {
        // 1 + x - x² + 1e-300 x³, whose third root is near 1e300.
        let p = Polynomial::new([1.0, 1.0, -1.0, 1e-300]);
        assert_eq!(p.root_exponents(), Some((-2, 999)));
        let critical = [0.5, 2.0 / 3e-300];
        let mut found = Vec::new();
        find_missing(&p, &critical, &[], |x| found.push(x));
        found.sort_by(f64::total_cmp);
        assert_eq!(found.len(), 3, "{found:?}");
        let golden = 0.5 * (1.0 + 5f64.sqrt());
        assert!((found[0] - (1.0 - golden)).abs() < 1e-15, "{found:?}");
        assert!((found[1] - golden).abs() < 1e-15, "{found:?}");
        assert!((found[2] / 1e300 - 1.0).abs() < 1e-15, "{found:?}");
    }
}
