// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Common floating-point helpers: ULP arithmetic, compensated sums and signs.

/// Defines a trait that chooses between libstd or libm implementations of float methods.
macro_rules! define_float_funcs {
    ($(
        fn $name:ident(self $(,$arg:ident: $arg_ty:ty)*) -> $ret:ty
        => $lname:ident;
    )+) => {
        #[cfg(not(feature = "std"))]
        pub(crate) trait FloatFuncs : Sized {
            /// Special implementation for signum, because libm doesn't have it.
            fn signum(self) -> Self;

            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret;)+
        }

        #[cfg(not(feature = "std"))]
        impl FloatFuncs for f64 {
            #[inline]
            fn signum(self) -> f64 {
                if self.is_nan() {
                    f64::NAN
                } else {
                    1.0_f64.copysign(self)
                }
            }

            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret {
                #[cfg(feature = "libm")]
                return libm::$lname(self $(,$arg as _)*);

                #[cfg(not(feature = "libm"))]
                compile_error!("polyroot requires either the `std` or `libm` feature")
            })+
        }
    }
}

define_float_funcs! {
    fn abs(self) -> Self => fabs;
    fn atan2(self, other: Self) -> Self => atan2;
    fn cbrt(self) -> Self => cbrt;
    fn copysign(self, sign: Self) -> Self => copysign;
    fn cos(self) -> Self => cos;
    fn mul_add(self, a: Self, b: Self) -> Self => fma;
    fn powf(self, n: Self) -> Self => pow;
    fn sin_cos(self) -> (Self, Self) => sincos;
    fn sqrt(self) -> Self => sqrt;
}

/// The smallest representable value greater than `x`.
///
/// NaN and positive infinity are returned unchanged.
#[inline]
pub fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// The largest representable value less than `x`.
///
/// NaN and negative infinity are returned unchanged.
#[inline]
pub fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

/// The unit in the last place of `x`: the distance from `|x|` to the next
/// larger representable value.
///
/// `ulp(0.0)` is the smallest subnormal. Infinities map to infinity and NaN
/// to NaN.
#[inline]
pub fn ulp(x: f64) -> f64 {
    let a = f64::from_bits(x.to_bits() & !(1 << 63));
    if a.is_nan() {
        return a;
    }
    if a == f64::INFINITY {
        return f64::INFINITY;
    }
    if a == f64::MAX {
        return a - next_down(a);
    }
    next_up(a) - a
}

#[inline]
fn pow2(n: i32) -> f64 {
    debug_assert!((-1022..=1023).contains(&n), "exponent {n} out of range");
    f64::from_bits(((n + 1023) as u64) << 52)
}

/// Computes `x · 2^n` without intermediate overflow.
pub fn scalb(x: f64, n: i32) -> f64 {
    let mut x = x;
    let mut n = n;
    while n > 1023 {
        x *= pow2(1023);
        n -= 1023;
        if !x.is_finite() {
            return x;
        }
    }
    while n < -1022 {
        x *= pow2(-1022);
        n += 1022;
        if x == 0.0 {
            return x;
        }
    }
    x * pow2(n)
}

/// The binary exponent of `x`, that is `floor(log2(|x|))`.
///
/// Returns `None` for zero, infinities and NaN.
pub fn ilogb(x: f64) -> Option<i32> {
    if x == 0.0 || !x.is_finite() {
        return None;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the biased exponent has eleven bits"
    )]
    let biased = ((x.to_bits() >> 52) & 0x7ff) as i32;
    if biased == 0 {
        // Subnormal: normalize first.
        return ilogb(x * pow2(54)).map(|e| e - 54);
    }
    Some(biased - 1023)
}

/// Error-free transformation of a sum: `a + b = s + e` exactly.
#[inline]
pub fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let e = (a - (s - bb)) + (b - bb);
    (s, e)
}

/// Error-free transformation of a product: `a · b = p + e` exactly.
#[inline]
pub fn two_product(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

/// A running floating-point sum with Neumaier compensation.
///
/// Besides the compensated value, it tracks the sum of the magnitudes of all
/// terms, which bounds the error that was already present in the terms.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
    magnitude: f64,
}

impl CompensatedSum {
    /// An empty sum.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a term.
    #[inline]
    pub fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
        self.magnitude += x.abs();
    }

    /// The compensated value of the sum.
    #[inline]
    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }

    /// The sum of the absolute values of the terms.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }
}

impl FromIterator<f64> for CompensatedSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut sum = Self::new();
        for x in iter {
            sum.add(x);
        }
        sum
    }
}

/// The sign of a quantity that is known exactly or up to a tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "there are only three signs")]
pub enum Sign {
    /// Strictly less than zero.
    Negative,
    /// Zero, or indistinguishable from zero.
    Zero,
    /// Strictly greater than zero.
    Positive,
}

impl Sign {
    /// The exact sign of an integer.
    #[inline]
    pub fn of_int(x: i128) -> Self {
        match x {
            0 => Self::Zero,
            x if x < 0 => Self::Negative,
            _ => Self::Positive,
        }
    }

    /// The sign of `x`, treating `|x| <= tolerance` as zero.
    #[inline]
    pub fn with_tolerance(x: f64, tolerance: f64) -> Self {
        if x.abs() <= tolerance {
            Self::Zero
        } else if x < 0.0 {
            Self::Negative
        } else {
            Self::Positive
        }
    }

    /// The sign of a compensated sum, treating values within
    /// `2ε` times the magnitude of its terms as zero.
    #[inline]
    pub fn of_sum(sum: &CompensatedSum) -> Self {
        Self::with_tolerance(sum.value(), 2.0 * f64::EPSILON * sum.magnitude())
    }

    /// Whether this sign is [`Sign::Zero`].
    #[inline]
    pub fn is_zero(self) -> bool {
        self == Self::Zero
    }
}

/// Converts coefficients to integers if every one is integral and smaller in
/// magnitude than `limit`.
pub(crate) fn integer_coefficients<const N: usize>(
    coeffs: [f64; N],
    limit: f64,
) -> Option<[i128; N]> {
    let mut out = [0_i128; N];
    for (c, o) in coeffs.iter().zip(&mut out) {
        if c.is_nan() || c.abs() >= limit {
            return None;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the round trip below rejects anything that truncated"
        )]
        let i = *c as i128;
        if i as f64 != *c {
            return None;
        }
        *o = i;
    }
    Some(out)
}

/// Rescales coefficients by a power of two so the largest has magnitude in
/// `[1, 2)`. This is exact unless a coefficient underflows.
pub(crate) fn normalize<const N: usize>(coeffs: [f64; N]) -> [f64; N] {
    let max = coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    match ilogb(max) {
        Some(e) => coeffs.map(|c| scalb(c, -e)),
        None => coeffs,
    }
}

/// Substitutes `x = 2^k · y` so that the roots in `y` have magnitude near
/// one, then normalizes. Returns `k` along with the new coefficients, whose
/// roots are those of the input divided by `2^k`.
///
/// The scaling is exact except for terms that underflow, which are negligible
/// next to the largest one.
pub(crate) fn balance<const N: usize>(coeffs: [f64; N]) -> (i32, [f64; N]) {
    let n = N - 1;
    let Some(lead) = ilogb(coeffs[n]) else {
        return (0, normalize(coeffs));
    };
    #[expect(
        clippy::cast_possible_truncation,
        reason = "only used for degrees up to four"
    )]
    let k = coeffs[..n]
        .iter()
        .enumerate()
        .filter_map(|(i, c)| ilogb(*c).map(|e| (e - lead).div_euclid((n - i) as i32)))
        .max()
        .unwrap_or(0);
    #[expect(
        clippy::cast_possible_truncation,
        reason = "only used for degrees up to four"
    )]
    let scaled = core::array::from_fn(|i| scalb(coeffs[i], -k * (n - i) as i32));
    (k, normalize(scaled))
}

/// Checks that every coefficient is finite.
pub(crate) fn check_finite(coeffs: &[f64]) -> crate::Result<()> {
    match coeffs.iter().position(|c| !c.is_finite()) {
        Some(index) => Err(crate::Error::NonFiniteCoefficient { index }),
        None => Ok(()),
    }
}

/// Sorts roots and removes exact duplicates.
pub(crate) fn sort_dedup(roots: &mut [f64]) -> usize {
    roots.sort_by(f64::total_cmp);
    let mut n = 0;
    for i in 0..roots.len() {
        if n == 0 || roots[i] != roots[n - 1] {
            roots[n] = roots[i];
            n += 1;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ulp_matches_epsilon() {
        assert_eq!(ulp(1.0), f64::EPSILON);
        assert_eq!(ulp(-1.0), f64::EPSILON);
        assert_eq!(ulp(0.0), f64::from_bits(1));
        assert_eq!(ulp(1.5), f64::EPSILON);
        assert_eq!(ulp(2.0), 2.0 * f64::EPSILON);
        assert!(ulp(f64::NAN).is_nan());
        assert_eq!(ulp(f64::NEG_INFINITY), f64::INFINITY);
        assert!(ulp(f64::MAX).is_finite());
    }

    #[test]
    fn next_up_down() {
        assert_eq!(next_up(1.0), 1.0 + f64::EPSILON);
        assert_eq!(next_down(1.0), 1.0 - f64::EPSILON / 2.0);
        assert_eq!(next_up(-0.0), f64::from_bits(1));
        assert_eq!(next_down(0.0), -f64::from_bits(1));
        assert_eq!(next_up(-f64::from_bits(1)), 0.0);
        assert_eq!(next_up(f64::MAX), f64::INFINITY);
        assert_eq!(next_down(f64::INFINITY), f64::MAX);
    }

    #[test]
    fn scalb_and_ilogb() {
        assert_eq!(scalb(3.0, 4), 48.0);
        assert_eq!(scalb(3.0, -1), 1.5);
        assert_eq!(scalb(1.0, 1100), f64::INFINITY);
        assert_eq!(scalb(1.0, -1074), f64::from_bits(1));
        assert_eq!(scalb(scalb(1.0, 1023), -2000), scalb(1.0, -977));
        assert_eq!(ilogb(1.0), Some(0));
        assert_eq!(ilogb(0.75), Some(-1));
        assert_eq!(ilogb(-1024.5), Some(10));
        assert_eq!(ilogb(f64::from_bits(1)), Some(-1074));
        assert_eq!(ilogb(0.0), None);
    }

    #[test]
    fn error_free_transforms() {
        let (s, e) = two_sum(1.0, 1e-20);
        assert_eq!(s, 1.0);
        assert_eq!(e, 1e-20);
        let a = 1.0 + f64::EPSILON;
        let (p, e) = two_product(a, a);
        assert_eq!(p, 1.0 + 2.0 * f64::EPSILON);
        assert_eq!(e, f64::EPSILON * f64::EPSILON);
    }

    #[test]
    fn compensated_sum_recovers_cancellation() {
        let naive: f64 = [1e16, 1.0, -1e16].iter().sum();
        assert_eq!(naive, 0.0);
        let sum: CompensatedSum = [1e16, 1.0, -1e16].into_iter().collect();
        assert_eq!(sum.value(), 1.0);
        assert!(sum.magnitude() >= 2e16, "magnitude tracks absolute values");
        assert_eq!(Sign::of_sum(&sum), Sign::Zero);
        let sum: CompensatedSum = [3.0, -1.0].into_iter().collect();
        assert_eq!(Sign::of_sum(&sum), Sign::Positive);
    }

    #[test]
    fn integers() {
        assert_eq!(
            integer_coefficients([1.0, -2.0, 3.0], 1e6),
            Some([1, -2, 3])
        );
        assert_eq!(integer_coefficients([1.0, 0.5], 1e6), None);
        assert_eq!(integer_coefficients([1.0, 2e6], 1e6), None);
        assert_eq!(integer_coefficients([f64::NAN], 1e6), None);
    }

    #[test]
    fn normalize_is_exact() {
        let n = normalize([3.0, -12.0, 0.375]);
        assert_eq!(n, [0.375, -1.5, 0.046875]);
        assert_eq!(normalize([0.0, 0.0]), [0.0, 0.0]);
    }

    #[test]
    fn balance_brings_roots_near_one() {
        // 1e-300 x³ - 1 has its root at 1e100.
        let (k, [d, c, b, a]) = balance([-1.0, 0.0, 0.0, 1e-300]);
        let y = (-d / a).cbrt();
        assert!(y > 0.5 && y < 4.0);
        assert_eq!((c, b), (0.0, 0.0));
        assert!((scalb(y, k) / 1e100 - 1.0).abs() < 1e-14);
        assert_eq!(balance([2.0, 3.0, 0.0]), (0, [1.0, 1.5, 0.0]));
    }

    #[test]
    fn dedup() {
        let mut v = [3.0, 1.0, 2.0, 1.0, 3.0];
        let n = sort_dedup(&mut v);
        assert_eq!(&v[..n], &[1.0, 2.0, 3.0]);
    }
}
