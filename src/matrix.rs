// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The matrix driver (§4.6) and the public façade, [`RowCodec`] (§6).
//!
//! [`MatrixCodec`] is the width-monomorphized engine: it owns the previous-row buffer, the row
//! encoder's scratch, and drives the row-sequential encode/decode loop. [`RowCodec`] wraps one
//! of the four width instantiations behind a single runtime-dispatched entry point, the way the
//! teacher's audio buffers hide per-sample-format storage behind one generic façade.

use crate::bitstream::{BitReader, BitWriter};
use crate::block::{decode_block, encode_block};
use crate::error::{invalid_dimensions, trailing_bytes, Result};
use crate::format::{Format, Width};
use crate::header::max_header_bits;
use crate::reduction::inverse;
use crate::row::RowEncoder;
use crate::util::sat::{add_u64, bits_to_bytes_ceil, mul_u64, mul_usize};
use crate::word::{pack_i64, unpack_i64, Word};

/// A validated permutation of `{0, ..., H-1}`: storage position `i` holds the client channel
/// `order()[i]`. The default, [`RowOrder::natural`], is the identity permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOrder(Vec<u32>);

impl RowOrder {
    pub fn natural(h: usize) -> Self {
        RowOrder((0..h as u32).collect())
    }

    /// Validates `perm` as a permutation of `0..h`: every value in range, each appearing
    /// exactly once.
    pub fn new(perm: Vec<u32>, h: usize) -> Result<Self> {
        if perm.len() != h {
            return invalid_dimensions("row permutation length must equal H");
        }
        let mut seen = vec![false; h];
        for &c in &perm {
            let idx = c as usize;
            if idx >= h || seen[idx] {
                return invalid_dimensions("row permutation must contain each of 0..H exactly once");
            }
            seen[idx] = true;
        }
        Ok(RowOrder(perm))
    }

    fn channel_at(&self, storage_pos: usize) -> usize {
        self.0[storage_pos] as usize
    }
}

fn extract_client_row<W: Word>(
    matrix: &[i64],
    h: usize,
    l: usize,
    channel: usize,
    row_major: bool,
    out: &mut [W],
) -> Result<()> {
    if row_major {
        let base = channel * l;
        for t in 0..l {
            out[t] = pack_i64(matrix[base + t])?;
        }
    }
    else {
        for t in 0..l {
            out[t] = pack_i64(matrix[t * h + channel])?;
        }
    }
    Ok(())
}

fn write_client_row<W: Word>(
    out: &mut [i64],
    h: usize,
    l: usize,
    channel: usize,
    row_major: bool,
    row: &[W],
) {
    if row_major {
        let base = channel * l;
        for (t, &v) in row.iter().enumerate() {
            out[base + t] = unpack_i64(v);
        }
    }
    else {
        for (t, &v) in row.iter().enumerate() {
            out[t * h + channel] = unpack_i64(v);
        }
    }
}

/// The width-monomorphized matrix driver: one owned instance encodes or decodes whole epochs of
/// a fixed (H, L) shape.
struct MatrixCodec<W: Word> {
    h: usize,
    l: usize,
    format: Format,
    width: Width,
    row_order: RowOrder,
    encoder: RowEncoder<W>,
    previous_row: Vec<W>,
    row_buf: Vec<W>,
}

impl<W: Word> MatrixCodec<W> {
    fn new(h: usize, l: usize, format: Format, width: Width) -> Result<Self> {
        if h == 0 || l == 0 {
            return invalid_dimensions("H and L must each be at least 1");
        }
        format.validate_width(width)?;

        Ok(MatrixCodec {
            h,
            l,
            format,
            width,
            row_order: RowOrder::natural(h),
            encoder: RowEncoder::new(),
            previous_row: vec![W::default(); l],
            row_buf: vec![W::default(); l],
        })
    }

    fn set_row_order(&mut self, order: RowOrder) -> Result<()> {
        if order.0.len() != self.h {
            return invalid_dimensions("row permutation length must equal H");
        }
        self.row_order = order;
        Ok(())
    }

    fn max_output_bytes(&self) -> Result<usize> {
        let header = u64::from(max_header_bits(self.format, self.width));
        let w_bits = u64::from(self.width.bits());
        let tail = (self.l - 1) as u64;
        let worst_residual = mul_u64(2 * w_bits - 1, tail, "row size upper bound")?;
        let per_row = add_u64(header, worst_residual, "row size upper bound")?;
        let total_bits = mul_u64(self.h as u64, per_row, "matrix size upper bound")?;
        bits_to_bytes_ceil(total_bits, "matrix size upper bound")
    }

    fn encode(&mut self, matrix: &[i64], row_major: bool) -> Result<Vec<u8>> {
        let expected_len = mul_usize(self.h, self.l, "matrix length H*L")?;
        if matrix.len() != expected_len {
            return invalid_dimensions("matrix length does not match H*L");
        }

        log::debug!("encoding {}x{} matrix, row_major={row_major}", self.h, self.l);
        let mut out = vec![0u8; self.max_output_bytes()?];
        for v in &mut self.previous_row {
            *v = W::default();
        }

        {
            let mut writer = BitWriter::new(&mut out);
            for i in 0..self.h {
                let channel = self.row_order.channel_at(i);
                extract_client_row(matrix, self.h, self.l, channel, row_major, &mut self.row_buf)?;

                let plan =
                    self.encoder.encode_row(&self.previous_row, &self.row_buf, self.format, self.width)?;
                encode_block(
                    &mut writer,
                    plan.residuals,
                    plan.encoding_map,
                    self.format,
                    self.width,
                    plan.data_size,
                    plan.method,
                    plan.n,
                    plan.nexc,
                )?;

                self.previous_row.copy_from_slice(&self.row_buf);
            }
            let written = writer.flush()?;
            out.truncate(written);
        }

        Ok(out)
    }

    fn decode(&mut self, bytes: &[u8], row_major: bool) -> Result<Vec<i64>> {
        log::debug!("decoding {}x{} matrix from {} bytes, row_major={row_major}", self.h, self.l, bytes.len());
        let mut out = vec![0i64; self.h * self.l];
        for v in &mut self.previous_row {
            *v = W::default();
        }

        let mut reader = BitReader::new(bytes)?;
        for i in 0..self.h {
            let channel = self.row_order.channel_at(i);
            let method = decode_block(&mut reader, &mut self.row_buf, self.format, self.width)?;
            inverse(method, &self.previous_row, &mut self.row_buf);
            self.previous_row.copy_from_slice(&self.row_buf);
            write_client_row(&mut out, self.h, self.l, channel, row_major, &self.row_buf);
        }

        if !reader.at_end() {
            return trailing_bytes();
        }

        Ok(out)
    }
}

enum Engine {
    W1(MatrixCodec<u8>),
    W2(MatrixCodec<u16>),
    W4(MatrixCodec<u32>),
    W8(MatrixCodec<u64>),
}

/// The crate's public entry point: a codec instance fixed to one (width, format, H, L)
/// combination, reusing its scratch buffers across calls. Sample values cross the public API as
/// `i64` regardless of the configured element width.
pub struct RowCodec {
    engine: Engine,
}

impl RowCodec {
    /// Creates a codec for an `H`-channel, `L`-sample epoch under the given element width and
    /// format discipline. Fails if `width` is not legal under `format` (reflib only permits
    /// `Width::W4`), or if `H` or `L` is zero.
    pub fn new(width: Width, format: Format, num_rows: usize, num_cols: usize) -> Result<Self> {
        let engine = match width {
            Width::W1 => Engine::W1(MatrixCodec::new(num_rows, num_cols, format, width)?),
            Width::W2 => Engine::W2(MatrixCodec::new(num_rows, num_cols, format, width)?),
            Width::W4 => Engine::W4(MatrixCodec::new(num_rows, num_cols, format, width)?),
            Width::W8 => Engine::W8(MatrixCodec::new(num_rows, num_cols, format, width)?),
        };
        Ok(RowCodec { engine })
    }

    /// Installs a row permutation: storage position `i` encodes/decodes client channel
    /// `order[i]`. Fails with `InvalidDimensions` if `order`'s length does not equal `H`.
    pub fn set_row_order(&mut self, order: RowOrder) -> Result<()> {
        match &mut self.engine {
            Engine::W1(c) => c.set_row_order(order),
            Engine::W2(c) => c.set_row_order(order),
            Engine::W4(c) => c.set_row_order(order),
            Engine::W8(c) => c.set_row_order(order),
        }
    }

    pub fn encode_column_major(&mut self, matrix: &[i64]) -> Result<Vec<u8>> {
        match &mut self.engine {
            Engine::W1(c) => c.encode(matrix, false),
            Engine::W2(c) => c.encode(matrix, false),
            Engine::W4(c) => c.encode(matrix, false),
            Engine::W8(c) => c.encode(matrix, false),
        }
    }

    pub fn encode_row_major(&mut self, matrix: &[i64]) -> Result<Vec<u8>> {
        match &mut self.engine {
            Engine::W1(c) => c.encode(matrix, true),
            Engine::W2(c) => c.encode(matrix, true),
            Engine::W4(c) => c.encode(matrix, true),
            Engine::W8(c) => c.encode(matrix, true),
        }
    }

    pub fn decode_column_major(&mut self, bytes: &[u8]) -> Result<Vec<i64>> {
        match &mut self.engine {
            Engine::W1(c) => c.decode(bytes, false),
            Engine::W2(c) => c.decode(bytes, false),
            Engine::W4(c) => c.decode(bytes, false),
            Engine::W8(c) => c.decode(bytes, false),
        }
    }

    pub fn decode_row_major(&mut self, bytes: &[u8]) -> Result<Vec<i64>> {
        match &mut self.engine {
            Engine::W1(c) => c.decode(bytes, true),
            Engine::W2(c) => c.decode(bytes, true),
            Engine::W4(c) => c.decode(bytes, true),
            Engine::W8(c) => c.decode(bytes, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_row_major_extended_w4() {
        let mut codec = RowCodec::new(Width::W4, Format::Extended, 3, 4).unwrap();
        let matrix: Vec<i64> = vec![11, 12, 13, 14, 21, 22, 23, 24, 31, 32, 33, 34];
        let bytes = codec.encode_row_major(&matrix).unwrap();
        let decoded = codec.decode_row_major(&bytes).unwrap();
        assert_eq!(decoded, matrix);
    }

    #[test]
    fn round_trips_column_major_reflib_w4() {
        let mut codec = RowCodec::new(Width::W4, Format::Reflib, 3, 4).unwrap();
        let matrix: Vec<i64> = vec![11, 21, 31, 12, 22, 32, 13, 23, 33, 14, 24, 34];
        let bytes = codec.encode_column_major(&matrix).unwrap();
        let decoded = codec.decode_column_major(&bytes).unwrap();
        assert_eq!(decoded, matrix);
    }

    #[test]
    fn single_row_single_sample_extreme_values_round_trip() {
        for (width, min) in
            [(Width::W1, i8::MIN as i64), (Width::W2, i16::MIN as i64), (Width::W8, i64::MIN)]
        {
            let mut codec = RowCodec::new(width, Format::Extended, 1, 1).unwrap();
            let bytes = codec.encode_row_major(&[min]).unwrap();
            let decoded = codec.decode_row_major(&bytes).unwrap();
            assert_eq!(decoded, vec![min]);
        }
    }

    #[test]
    fn permutation_round_trips_in_client_layout() {
        let mut codec = RowCodec::new(Width::W4, Format::Extended, 3, 2).unwrap();
        codec.set_row_order(RowOrder::new(vec![2, 0, 1], 3)).unwrap();
        let matrix: Vec<i64> = vec![1, 2, 10, 20, 100, 200];
        let bytes = codec.encode_row_major(&matrix).unwrap();
        let decoded = codec.decode_row_major(&bytes).unwrap();
        assert_eq!(decoded, matrix);
    }

    #[test]
    fn rejects_incomplete_permutation() {
        assert!(RowOrder::new(vec![0, 0, 1], 3).is_err());
        assert!(RowOrder::new(vec![0, 1], 3).is_err());
        assert!(RowOrder::new(vec![0, 1, 3], 3).is_err());
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut codec = RowCodec::new(Width::W4, Format::Extended, 1, 1).unwrap();
        let mut bytes = codec.encode_row_major(&[42]).unwrap();
        bytes.push(0);
        assert!(codec.decode_row_major(&bytes).is_err());
    }

    #[test]
    fn rejects_mismatched_matrix_length() {
        let mut codec = RowCodec::new(Width::W4, Format::Extended, 2, 2).unwrap();
        assert!(codec.encode_row_major(&[1, 2, 3]).is_err());
    }

    #[test]
    fn reflib_rejects_non_w4_width() {
        assert!(RowCodec::new(Width::W2, Format::Reflib, 1, 1).is_err());
    }
}
