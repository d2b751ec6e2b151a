// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Real roots of polynomials.
//!
//! The polyroot library finds every real root of a polynomial given either in
//! the monomial basis or in the Bernstein (Bezier) basis on the unit interval.
//! Each distinct root is reported once, in increasing order, and every reported
//! root passes an ULP-scaled residual test against the input polynomial.
//!
//! It has three layers:
//!
//! - closed-form solvers for degree one through four ([`solve_linear`],
//!   [`solve_quadratic`], [`solve_cubic`], [`solve_quartic`]), with exact
//!   discriminant signs for integer coefficients;
//! - a control-polygon subdivision solver for Bernstein polynomials
//!   ([`solve_bezier`]);
//! - the scalar refiners [`Newton`], [`Halley`] and [`Brent`], which also work
//!   on arbitrary functions.
//!
//! [`solve_polynomial`] picks the right layer for any degree.
//!
//! # Examples
//!
//! Solving a polynomial of any degree:
//! ```
//! use polyroot::solve_polynomial;
//!
//! // (x - 1)(x - 2)(x - 3)
//! let roots = solve_polynomial(&[-6.0, 11.0, -6.0, 1.0]).unwrap();
//! assert_eq!(roots, [1.0, 2.0, 3.0]);
//! ```
//!
//! Finding where a Bezier control polygon's function crosses zero:
//! ```
//! use polyroot::BezierPolynomial;
//!
//! let b = BezierPolynomial::new([-1.0, -1.0, 1.0, 1.0]);
//! let roots = b.roots().unwrap();
//! assert_eq!(roots.len(), 1);
//! assert!((roots[0] - 0.5).abs() < 1e-12);
//! ```
//!
//! Refining the root of an arbitrary function:
//! ```
//! use polyroot::{Newton, RootFinder};
//!
//! let newton = Newton::new(|x: f64, _: &()| x.cos(), |x: f64, _: &()| -x.sin());
//! let x = newton.find_root(1.5).unwrap();
//! assert!((x - core::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! ```
//!
//! # Features
//!
//! This crate either uses the standard library or the [`libm`] crate for
//! math functionality. The `std` feature is enabled by default, but can be
//! disabled, as long as the `libm` feature is enabled. This is useful for
//! `no_std` environments. However, note that the `libm` crate is not as
//! efficient as the standard library, and that this crate still uses the
//! `alloc` crate regardless.
//!
//! [`libm`]: https://docs.rs/libm

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision,
    reason = "numeric code reads better with the usual math names and literals"
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("polyroot requires either the `std` or `libm` feature");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use libm as _;

extern crate alloc;

mod bezier;
mod brent;
pub mod common;
mod cubic;
mod error;
mod halley;
mod isolate;
mod newton;
mod poly;
mod quadratic;
mod quartic;
mod refine;
mod solve;
mod subdivision;

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;

pub use crate::bezier::*;
pub use crate::brent::*;
pub use crate::common::Sign;
pub use crate::cubic::*;
pub use crate::error::*;
pub use crate::halley::*;
pub use crate::newton::*;
pub use crate::poly::*;
pub use crate::quadratic::*;
pub use crate::quartic::*;
pub use crate::refine::*;
pub use crate::solve::*;
pub use crate::subdivision::*;

/// Whether `x` and `y` lie strictly on opposite sides of zero.
///
/// Zero counts as neither side.
#[inline]
fn different_signs(x: f64, y: f64) -> bool {
    (x < 0.0 && y > 0.0) || (x > 0.0 && y < 0.0)
}
