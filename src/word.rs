// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `word` module abstracts over the four unsigned element widths (`u8`, `u16`, `u32`,
//! `u64`) the codec is monomorphized over. A [`Word`] is the unsigned, native-width
//! reinterpretation of one matrix element; the reductions, block codec, and row encoder are
//! all generic over it so the bulk of the codec is written once per operation rather than once
//! per width.

/// An unsigned machine word used as the codec's internal element representation.
///
/// All arithmetic required by the magnitude reductions (§4.2) is wrapping; there is no
/// signed/unsigned distinction at this layer, only the width and its wraparound semantics.
pub trait Word: Copy + Default + PartialEq + std::fmt::Debug {
    /// Width of this word in bits (one of 8, 16, 32, 64).
    const BITS: u32;

    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;

    /// Reinterprets a 64-bit value as this word width, truncating high bits.
    fn truncate_u64(v: u64) -> Self;

    /// Zero-extends this word to a `u64`.
    fn extend_u64(self) -> u64;

    /// The minimum signed-magnitude bit width of this word per §4.5: the number of bits
    /// needed to represent the value as a two's-complement integer, including the sign bit,
    /// with a floor of 2 so the exception marker pattern (`1 << (n-1)`) always has a spare
    /// code point below it.
    fn signed_magnitude_width(self) -> u32 {
        let bits = Self::BITS;
        let raw = self.extend_u64();
        let sign_set = (raw >> (bits - 1)) & 1 != 0;
        let magnitude = if sign_set { (!raw) & mask(bits) } else { raw };
        let used = bits - (magnitude.leading_zeros() - (64 - bits));
        (used + 1).max(2)
    }
}

#[inline(always)]
fn mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Packs a public `i64` sample into its unsigned word representation, failing if `v` does not
/// fit in `W`'s signed range. This is the boundary conversion between the crate's public,
/// width-independent wire type and the internal per-width unsigned representation.
pub fn pack_i64<W: Word>(v: i64) -> crate::error::Result<W> {
    use crate::error::invalid_dimensions;

    if W::BITS >= 64 {
        return Ok(W::truncate_u64(v as u64));
    }

    let min = -(1i64 << (W::BITS - 1));
    let max = (1i64 << (W::BITS - 1)) - 1;
    if v < min || v > max {
        return invalid_dimensions("sample value does not fit in the configured element width");
    }
    Ok(W::truncate_u64(v as u64))
}

/// Sign-extends an unsigned word back to the public `i64` wire type.
pub fn unpack_i64<W: Word>(w: W) -> i64 {
    if W::BITS >= 64 {
        return w.extend_u64() as i64;
    }

    let raw = w.extend_u64();
    let sign_bit = 1u64 << (W::BITS - 1);
    if raw & sign_bit != 0 {
        (raw | !mask(W::BITS)) as i64
    }
    else {
        raw as i64
    }
}

macro_rules! impl_word {
    ($ty:ty) => {
        impl Word for $ty {
            const BITS: u32 = <$ty>::BITS;

            #[inline(always)]
            fn wrapping_add(self, rhs: Self) -> Self {
                <$ty>::wrapping_add(self, rhs)
            }

            #[inline(always)]
            fn wrapping_sub(self, rhs: Self) -> Self {
                <$ty>::wrapping_sub(self, rhs)
            }

            #[inline(always)]
            fn truncate_u64(v: u64) -> Self {
                v as $ty
            }

            #[inline(always)]
            fn extend_u64(self) -> u64 {
                self as u64
            }
        }
    };
}

impl_word!(u8);
impl_word!(u16);
impl_word!(u32);
impl_word!(u64);
