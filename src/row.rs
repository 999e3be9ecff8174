// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The row encoder (§4.5): for one row, tries all four reductions and picks the cheapest
//! `(method, n, nexc)` combination by building a per-reduction histogram of residual bit widths.

use crate::error::{invalid_dimensions, Result};
use crate::format::{Format, Width};
use crate::header::header_bits;
use crate::reduction::{forward, Reduction};
use crate::util::sat::{add_u64, mul_u64};
use crate::word::Word;

/// The winning encoding for one row, borrowing the encoder's reusable scratch buffers.
pub struct RowPlan<'a, W: Word> {
    pub method: Reduction,
    pub data_size: u8,
    pub n: u32,
    pub nexc: u32,
    pub residuals: &'a [W],
    pub encoding_map: &'a [bool],
}

/// Owns the scratch buffers reused across rows: one residual buffer per reduction, the
/// escape-encoding bitmap for the winning reduction, and a fixed-size bit-width histogram.
pub struct RowEncoder<W: Word> {
    residuals: [Vec<W>; 4],
    encoding_map: Vec<bool>,
    // One bucket per possible bit width 0..=64. The original's equivalent histogram also
    // tracks an `exceptions` count per bucket; that count is unneeded here because this
    // implementation's escape rule already follows from width alone (§ DESIGN.md), so a plain
    // count is sufficient.
    histogram: Vec<u32>,
}

impl<W: Word> RowEncoder<W> {
    pub fn new() -> Self {
        RowEncoder {
            residuals: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
            encoding_map: Vec::new(),
            histogram: vec![0u32; 65],
        }
    }

    fn ensure_capacity(&mut self, l: usize) {
        for buf in &mut self.residuals {
            if buf.len() != l {
                buf.resize(l, W::default());
            }
        }
        if self.encoding_map.len() != l {
            self.encoding_map.resize(l, false);
        }
    }

    /// Computes residuals under all four reductions and selects the cheapest `(method, n,
    /// nexc)`. `previous_row` and `row` must both have length `L >= 1`.
    pub fn encode_row(
        &mut self,
        previous_row: &[W],
        row: &[W],
        format: Format,
        width: Width,
    ) -> Result<RowPlan<'_, W>> {
        let l = row.len();
        if l == 0 {
            return invalid_dimensions("row length L must be at least 1");
        }
        self.ensure_capacity(l);

        for (idx, &method) in Reduction::ALL.iter().enumerate() {
            let buf = &mut self.residuals[idx];
            forward(method, previous_row, row, buf);
        }

        let mut winner: Option<(usize, Reduction, u8, u32, u32, u64)> = None;

        for (idx, &method) in Reduction::ALL.iter().enumerate() {
            let (n, nexc, total_bits) = self.best_n_for(idx, method, l, format, width)?;
            let (data_size, _) = format.min_data_size(nexc)?;

            let better = match &winner {
                None => true,
                Some((_, _, _, _, _, best_bits)) => total_bits < *best_bits,
            };
            if better {
                winner = Some((idx, method, data_size, n, nexc, total_bits));
            }
        }

        let (idx, method, data_size, n, nexc, total_bits) =
            winner.expect("Reduction::ALL is non-empty");
        log::trace!("row encoder picked {method:?} n={n} nexc={nexc} total_bits={total_bits}");

        if n < nexc {
            for i in 1..l {
                let w = self.residuals[idx][i].signed_magnitude_width();
                self.encoding_map[i] = w >= n;
            }
        }
        else {
            self.encoding_map[..l].fill(false);
        }

        Ok(RowPlan {
            method,
            data_size,
            n,
            nexc,
            residuals: &self.residuals[idx],
            encoding_map: &self.encoding_map,
        })
    }

    /// Builds the bit-width histogram for reduction `idx` (skipping the master at index 0),
    /// determines `nexc`, then searches `n` in `[2, nexc]` for the minimum total size.
    ///
    /// `Reduction::Copy` is pinned to `n = nexc = 8W`: its residuals area is defined to degenerate
    /// to `L` verbatim words, not a candidate for variable-width packing.
    fn best_n_for(
        &mut self,
        idx: usize,
        method: Reduction,
        l: usize,
        format: Format,
        width: Width,
    ) -> Result<(u32, u32, u64)> {
        let max_width = width.bits();

        if method == Reduction::Copy {
            let header = u64::from(header_bits(format, width, max_width));
            let tail = (l - 1) as u64;
            let bits = add_u64(
                header,
                mul_u64(max_width as u64, tail, "row fixed-width size")?,
                "row fixed-width size",
            )?;
            return Ok((max_width, max_width, bits));
        }

        for b in self.histogram.iter_mut() {
            *b = 0;
        }

        let buf = &self.residuals[idx];
        let master_width = buf[0].signed_magnitude_width();
        let mut max_nonmaster_width = 0u32;
        for v in buf.iter().skip(1) {
            let w = v.signed_magnitude_width();
            self.histogram[w as usize] += 1;
            if w > max_nonmaster_width {
                max_nonmaster_width = w;
            }
        }

        // nexc must be wide enough to hold both the widest non-master residual and the master
        // itself verbatim, since the master is written as an nexc-bit word in the header.
        let nexc = master_width.max(max_nonmaster_width).max(2).min(max_width);
        let header = u64::from(header_bits(format, width, nexc));

        let tail = (l - 1) as u64;
        let mut exceeds = tail;
        let mut best: Option<(u32, u64)> = None;

        for n in 2..=nexc {
            if n > 2 {
                exceeds -= u64::from(self.histogram[(n - 1) as usize]);
            }

            let bits = if n == nexc {
                add_u64(header, mul_u64(nexc as u64, tail, "row fixed-width size")?, "row fixed-width size")?
            }
            else {
                let plain = mul_u64(n as u64, tail, "row variable-width size")?;
                let escapes = mul_u64(nexc as u64, exceeds, "row variable-width escapes")?;
                let data = add_u64(plain, escapes, "row variable-width size")?;
                add_u64(header, data, "row variable-width size")?
            };

            let better = match best {
                None => true,
                Some((_, best_bits)) => bits < best_bits,
            };
            if better {
                best = Some((n, bits));
            }
        }

        let (n, bits) = best.expect("n range 2..=nexc is non-empty since nexc >= 2");
        Ok((n, nexc, bits))
    }
}

impl<W: Word> Default for RowEncoder<W> {
    fn default() -> Self {
        Self::new()
    }
}
