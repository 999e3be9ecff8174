// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element widths and format disciplines (§3, §6).
//!
//! [`Format`] is the small descriptor the row encoder and block header consult for the
//! data-size code table and the `n`/`nexc` field widths. It deliberately carries no behavior
//! beyond table lookups so that the codec's hot paths (block codec, row encoder) stay free of
//! branching on format beyond a handful of array indexing operations.

use crate::error::{invalid_dimensions, Result};
use crate::util::bits::field_width_for_max;

/// One row sample's element width in bytes, fixed per codec instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    W1,
    W2,
    W4,
    W8,
}

impl Width {
    #[inline(always)]
    pub fn bytes(self) -> u32 {
        match self {
            Width::W1 => 1,
            Width::W2 => 2,
            Width::W4 => 4,
            Width::W8 => 8,
        }
    }

    #[inline(always)]
    pub fn bits(self) -> u32 {
        self.bytes() * 8
    }
}

/// Format discipline: which element widths and header size fields are in play (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// 4-byte words only; 2-bit data-size code selecting among `{2, 4}` bytes; 32-bit size
    /// fields in the outer container.
    Reflib,
    /// All four widths; 2-bit data-size code selecting among `{1, 2, 4, 8}` bytes; 64-bit size
    /// fields in the outer container.
    Extended,
}

/// One entry of a format's data-size table: a 2-bit code and the byte width it selects.
const REFLIB_TABLE: [u32; 2] = [2, 4];
const EXTENDED_TABLE: [u32; 4] = [1, 2, 4, 8];

impl Format {
    /// Validates that `width` is legal under this format discipline.
    pub fn validate_width(self, width: Width) -> Result<()> {
        match (self, width) {
            (Format::Reflib, Width::W4) => Ok(()),
            (Format::Reflib, _) => {
                invalid_dimensions("reflib format only supports a 4-byte element width")
            }
            (Format::Extended, _) => Ok(()),
        }
    }

    /// The data-size code table: `table()[code as usize]` is the byte width that code selects.
    fn table(self) -> &'static [u32] {
        match self {
            Format::Reflib => &REFLIB_TABLE,
            Format::Extended => &EXTENDED_TABLE,
        }
    }

    /// Field width, in bits, of the header's `n` and `nexc` fields for `width`.
    pub fn field_bits(self, width: Width) -> u32 {
        field_width_for_max(width.bits())
    }

    /// Decodes a 2-bit data-size code into its byte width, validating it against the table.
    pub fn decode_data_size(self, code: u8) -> Result<u32> {
        self.table()
            .get(code as usize)
            .copied()
            .ok_or(())
            .or_else(|_| crate::error::invalid_header("data_size code out of range for format"))
    }

    /// Chooses the smallest data-size code whose byte width holds `needed_bits`.
    pub fn min_data_size(self, needed_bits: u32) -> Result<(u8, u32)> {
        for (code, &bytes) in self.table().iter().enumerate() {
            if bytes * 8 >= needed_bits {
                return Ok((code as u8, bytes));
            }
        }
        invalid_dimensions("no data_size entry wide enough for the required header fields")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflib_only_accepts_w4() {
        assert!(Format::Reflib.validate_width(Width::W4).is_ok());
        assert!(Format::Reflib.validate_width(Width::W2).is_err());
    }

    #[test]
    fn extended_accepts_all_widths() {
        for w in [Width::W1, Width::W2, Width::W4, Width::W8] {
            assert!(Format::Extended.validate_width(w).is_ok());
        }
    }

    #[test]
    fn reflib_table_matches_spec() {
        assert_eq!(Format::Reflib.decode_data_size(0).unwrap(), 2);
        assert_eq!(Format::Reflib.decode_data_size(1).unwrap(), 4);
        assert!(Format::Reflib.decode_data_size(2).is_err());
        assert!(Format::Reflib.decode_data_size(3).is_err());
    }

    #[test]
    fn extended_table_matches_spec() {
        assert_eq!(Format::Extended.decode_data_size(0).unwrap(), 1);
        assert_eq!(Format::Extended.decode_data_size(1).unwrap(), 2);
        assert_eq!(Format::Extended.decode_data_size(2).unwrap(), 4);
        assert_eq!(Format::Extended.decode_data_size(3).unwrap(), 8);
    }

    #[test]
    fn min_data_size_picks_smallest_sufficient_width() {
        assert_eq!(Format::Extended.min_data_size(1).unwrap(), (0, 1));
        assert_eq!(Format::Extended.min_data_size(8).unwrap(), (0, 1));
        assert_eq!(Format::Extended.min_data_size(9).unwrap(), (1, 2));
        assert_eq!(Format::Reflib.min_data_size(16).unwrap(), (0, 2));
        assert_eq!(Format::Reflib.min_data_size(17).unwrap(), (1, 4));
    }

    #[test]
    fn field_bits_match_spec_table() {
        assert_eq!(Format::Extended.field_bits(Width::W1), 4);
        assert_eq!(Format::Extended.field_bits(Width::W2), 5);
        assert_eq!(Format::Extended.field_bits(Width::W4), 6);
        assert_eq!(Format::Extended.field_bits(Width::W8), 7);
    }
}
