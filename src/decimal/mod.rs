//! # Decimal Module
//!
//! Arbitrary-precision signed decimal arithmetic with an explicit scale.
//!
//! [`BigDecimal`] stores one decimal digit per element, most significant
//! first, together with a sign and the number of trailing digits that form
//! the fractional part. Values are normalized after every operation: no
//! leading zeros (except the single digit of zero) and a non-negative
//! canonical zero. Trailing fractional zeros survive arithmetic but are
//! stripped by `Display`, so `"1.50" + "0.50"` prints as `2`.
//!
//! Addition, subtraction and multiplication are exact. Division produces a
//! fixed number of fractional digits (20 by default) and truncates toward
//! zero; use [`BigDecimal::div_with_precision`] to pick the precision and
//! get a fallible result instead of the panicking `/` operator.
//!
//! Comparisons are a total order on the numeric value, not on the
//! representation: `"1.50"` and `"1.5"` compare equal.

mod core;

pub use core::{BigDecimal, DecimalError, DEFAULT_DIVISION_PRECISION};
