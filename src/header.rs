// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-row block header (§3, §4.3): `data_size`, `method`, `n`, `nexc`, and the verbatim
//! `master` residual, written in that fixed order ahead of a row's residual stream.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{invalid_header, Result};
use crate::format::{Format, Width};
use crate::reduction::Reduction;

/// One decoded (or about-to-be-encoded) block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub data_size: u8,
    pub method: Reduction,
    pub n: u32,
    pub nexc: u32,
    pub master: u64,
}

/// Bit width of the `n` and `nexc` fields for this (format, width) pair.
#[inline(always)]
pub fn field_bits(format: Format, width: Width) -> u32 {
    format.field_bits(width)
}

/// Exact size in bits of a header carrying the given `nexc` (the `master` field is `nexc` bits
/// wide). Used once `nexc` is known, after the row encoder has chosen it.
pub fn header_bits(format: Format, width: Width, nexc: u32) -> u32 {
    let fb = field_bits(format, width);
    2 + 2 + fb + fb + nexc
}

/// Worst-case header size, assuming the widest possible `nexc` (`8W`). Used to size the matrix
/// driver's output allocation before any row has actually been encoded.
pub fn max_header_bits(format: Format, width: Width) -> u32 {
    header_bits(format, width, width.bits())
}

/// Writes a header in the fixed field order `data_size, method, n, nexc, master`.
pub fn encode_header(
    writer: &mut BitWriter<'_>,
    format: Format,
    width: Width,
    header: &Header,
) -> Result<()> {
    let fb = field_bits(format, width);
    writer.write(2, u64::from(header.data_size))?;
    writer.write(2, u64::from(header.method.tag()))?;
    writer.write(fb, u64::from(header.n))?;
    writer.write(fb, u64::from(header.nexc))?;
    writer.write(header.nexc, header.master)?;
    Ok(())
}

/// Reads and validates a header. Returns `InvalidHeader` if `method`, `data_size`, `n`, or
/// `nexc` fall outside their allowed ranges.
pub fn decode_header(reader: &mut BitReader<'_>, format: Format, width: Width) -> Result<Header> {
    let fb = field_bits(format, width);
    let max_width = width.bits();

    let data_size = reader.read(2)? as u8;
    format.decode_data_size(data_size)?;

    let method_tag = reader.read(2)? as u8;
    let method = Reduction::from_tag(method_tag)
        .ok_or(())
        .or_else(|_| invalid_header("method tag is not one of copy, time, time2, chan"))?;

    let n = reader.read(fb)? as u32;
    let nexc = reader.read(fb)? as u32;

    if n < 2 || nexc > max_width || n > nexc {
        return invalid_header("n and nexc must satisfy 2 <= n <= nexc <= 8W");
    }

    let master = reader.read(nexc)?;

    Ok(Header { data_size, method, n, nexc, master })
}
