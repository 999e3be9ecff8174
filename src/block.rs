// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The block codec (§4.4): encodes or decodes one row's header plus residual stream.
//!
//! A row's residual at index 0 (the "master") is always written verbatim at `nexc` bits, inside
//! the header. The remaining `L - 1` residuals are written at `n` bits each in fixed-width mode
//! (`n == nexc`), or at `n` bits with an escape to a full `nexc`-bit literal in variable-width
//! mode, using the reserved exception marker for any residual whose natural width is `>= n`.
//!
//! Every field narrower than the element word is a two's-complement value, not an unsigned
//! magnitude, so decode must sign-extend each field back out to the element width before handing
//! it to the reductions' inverse.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::Result;
use crate::format::{Format, Width};
use crate::header::{decode_header, encode_header, Header};
use crate::reduction::Reduction;
use crate::util::bits::{exception_marker, sign_extend};
use crate::word::Word;

/// Writes one row's header and residual stream. `encoding_map[i]` is `true` when residual `i`
/// must be escaped (its natural width is `>= n`); it is ignored when `n == nexc`. Returns the
/// number of whole bytes consumed, including any trailing zero-padding to the next byte
/// boundary.
pub fn encode_block<W: Word>(
    writer: &mut BitWriter<'_>,
    residuals: &[W],
    encoding_map: &[bool],
    format: Format,
    width: Width,
    data_size: u8,
    method: Reduction,
    n: u32,
    nexc: u32,
) -> Result<usize> {
    let before = writer.bytes_written();
    let l = residuals.len();

    let header =
        Header { data_size, method, n, nexc, master: residuals[0].extend_u64() };
    encode_header(writer, format, width, &header)?;

    if l > 1 {
        let marker = exception_marker(n);
        for i in 1..l {
            let v = residuals[i].extend_u64();
            if n == nexc || !encoding_map[i] {
                writer.write(n, v)?;
            }
            else {
                writer.write(n, marker)?;
                writer.write(nexc, v)?;
            }
        }
    }

    writer.align_to_byte()?;
    Ok(writer.bytes_written() - before)
}

/// Decodes one row's header and residual stream into `out` (already sized to `L`). Returns the
/// reduction method the caller must invert.
pub fn decode_block<W: Word>(
    reader: &mut BitReader<'_>,
    out: &mut [W],
    format: Format,
    width: Width,
) -> Result<Reduction> {
    let header = decode_header(reader, format, width)?;
    // log::trace!("row header: method={:?} n={} nexc={}", header.method, header.n, header.nexc);
    let l = out.len();
    out[0] = W::truncate_u64(sign_extend(header.master, header.nexc));

    if l > 1 {
        let marker = exception_marker(header.n);
        let escapes = header.n != header.nexc;
        for slot in out.iter_mut().take(l).skip(1) {
            let v = reader.read(header.n)?;
            let (value, value_width) = if escapes && v == marker {
                (reader.read(header.nexc)?, header.nexc)
            }
            else {
                (v, header.n)
            };
            *slot = W::truncate_u64(sign_extend(value, value_width));
        }
    }

    reader.realign();
    Ok(header.method)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(
        residuals: &[u32],
        encoding_map: &[bool],
        n: u32,
        nexc: u32,
        method: Reduction,
    ) -> (Vec<u32>, Reduction) {
        round_trip_generic(residuals, encoding_map, Format::Extended, Width::W4, n, nexc, method)
    }

    #[test]
    fn fixed_width_round_trips() {
        let residuals = vec![100u32, 5, 9, 3000];
        let map = vec![false; 4];
        let (out, method) = round_trip(&residuals, &map, 32, 32, Reduction::Copy);
        assert_eq!(out, residuals);
        assert_eq!(method, Reduction::Copy);
    }

    #[test]
    fn variable_width_with_escapes_round_trips() {
        let residuals = vec![3u32, 1, 2, 300, 0];
        let map = vec![false, false, false, true, false];
        let (out, method) = round_trip(&residuals, &map, 4, 16, Reduction::Time);
        assert_eq!(out, residuals);
        assert_eq!(method, Reduction::Time);
    }

    #[test]
    fn single_sample_row_writes_only_master() {
        let residuals = vec![0xdead_beefu32];
        let map: Vec<bool> = vec![];
        let (out, method) = round_trip(&residuals, &map, 32, 32, Reduction::Chan);
        assert_eq!(out, residuals);
        assert_eq!(method, Reduction::Chan);
    }

    #[test]
    fn negative_residuals_round_trip_at_narrow_fixed_width() {
        // residuals[3] is -15 as a 16-bit word (0xFFF1); written verbatim at n=nexc=5 its low 5
        // bits are 0b10001 = 17, which must decode back to -15 sign-extended to 16 bits, not the
        // zero-extended 17.
        let format = Format::Extended;
        let width = Width::W2;
        let residuals: Vec<u16> = vec![0, 10, 20, 0xFFF1];
        let map = vec![false; 4];
        let n = 5u32;
        let nexc = 5u32;
        let data_size = format.min_data_size(nexc).unwrap().0;

        let mut buf = vec![0u8; 16];
        let mut w = BitWriter::new(&mut buf);
        let written = encode_block(
            &mut w, &residuals, &map, format, width, data_size, Reduction::Time, n, nexc,
        )
        .unwrap();
        w.flush().unwrap();

        let mut out = vec![0u16; residuals.len()];
        let mut r = BitReader::new(&buf[..written]).unwrap();
        decode_block(&mut r, &mut out, format, width).unwrap();
        assert_eq!(out, residuals);
    }

    #[test]
    fn negative_master_round_trips() {
        let format = Format::Extended;
        let width = Width::W1;
        // -1 as an 8-bit word, written as a 4-bit master field (0xf).
        let residuals: Vec<u8> = vec![0xff];
        let map: Vec<bool> = vec![];
        let (out, _) = round_trip_generic(&residuals, &map, format, width, 4, 4, Reduction::Copy);
        assert_eq!(out, residuals);
    }

    fn round_trip_generic<W: Word>(
        residuals: &[W],
        encoding_map: &[bool],
        format: Format,
        width: Width,
        n: u32,
        nexc: u32,
        method: Reduction,
    ) -> (Vec<W>, Reduction) {
        let data_size = format.min_data_size(nexc).unwrap().0;
        let total_bytes = 16 + residuals.len() * 8;
        let mut buf = vec![0u8; total_bytes];

        let mut w = BitWriter::new(&mut buf);
        let written = encode_block(
            &mut w,
            residuals,
            encoding_map,
            format,
            width,
            data_size,
            method,
            n,
            nexc,
        )
        .unwrap();
        w.flush().unwrap();

        let mut out = vec![W::default(); residuals.len()];
        let mut r = BitReader::new(&buf[..written]).unwrap();
        let decoded_method = decode_block(&mut r, &mut out, format, width).unwrap();
        assert!(r.at_end());
        (out, decoded_method)
    }
}
