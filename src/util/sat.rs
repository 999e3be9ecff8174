// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Checked arithmetic helpers for sizing computations (bits, bytes, samples, channels).
//!
//! Per §7, an `ArithmeticOverflow` error must be raised *before* any allocation sized by the
//! result of one of these computations. Everywhere else inside the codec (the reductions
//! themselves) arithmetic is wrapping by design; these helpers are only for the bookkeeping
//! math around buffer sizes.

use crate::error::{overflow, Result};

#[inline]
pub fn mul_usize(a: usize, b: usize, what: &'static str) -> Result<usize> {
    a.checked_mul(b).ok_or(()).or_else(|_| overflow(what))
}

#[inline]
pub fn add_usize(a: usize, b: usize, what: &'static str) -> Result<usize> {
    a.checked_add(b).ok_or(()).or_else(|_| overflow(what))
}

#[inline]
pub fn mul_u64(a: u64, b: u64, what: &'static str) -> Result<u64> {
    a.checked_mul(b).ok_or(()).or_else(|_| overflow(what))
}

#[inline]
pub fn add_u64(a: u64, b: u64, what: &'static str) -> Result<u64> {
    a.checked_add(b).ok_or(()).or_else(|_| overflow(what))
}

/// Converts a bit count to the number of whole bytes needed to hold it, rounding up.
#[inline]
pub fn bits_to_bytes_ceil(bits: u64, what: &'static str) -> Result<usize> {
    let rounded = add_u64(bits, 7, what)?;
    usize::try_from(rounded / 8).map_err(|_| ()).or_else(|_| overflow(what))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_overflow_is_caught() {
        assert!(mul_usize(usize::MAX, 2, "test").is_err());
        assert_eq!(mul_usize(3, 4, "test").unwrap(), 12);
    }

    #[test]
    fn bits_to_bytes_rounds_up() {
        assert_eq!(bits_to_bytes_ceil(0, "t").unwrap(), 0);
        assert_eq!(bits_to_bytes_ceil(1, "t").unwrap(), 1);
        assert_eq!(bits_to_bytes_ceil(8, "t").unwrap(), 1);
        assert_eq!(bits_to_bytes_ceil(9, "t").unwrap(), 2);
    }
}
