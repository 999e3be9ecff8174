// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Magnitude reductions: the four predictive transforms a row may be encoded under (§4.2).
//!
//! Each reduction is a lossless, invertible transform chosen to concentrate a row's energy at
//! small magnitudes before bit-packing. All arithmetic is unsigned and wraps; that is what
//! makes the transforms invertible regardless of the input's original sign.

use crate::word::Word;

/// The reduction tag written into the block header's 2-bit `method` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Copy = 0,
    Time = 1,
    Time2 = 2,
    Chan = 3,
}

impl Reduction {
    pub const ALL: [Reduction; 4] = [Reduction::Copy, Reduction::Time, Reduction::Time2, Reduction::Chan];

    pub fn from_tag(tag: u8) -> Option<Reduction> {
        match tag {
            0 => Some(Reduction::Copy),
            1 => Some(Reduction::Time),
            2 => Some(Reduction::Time2),
            3 => Some(Reduction::Chan),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Computes the residuals of `row` under `method` into `out`. `previous_row` is only consulted
/// by [`Reduction::Chan`] (row -1 is defined as all-zero, so it is always available).
pub fn forward<W: Word>(method: Reduction, previous_row: &[W], row: &[W], out: &mut [W]) {
    debug_assert_eq!(row.len(), out.len());
    debug_assert_eq!(previous_row.len(), row.len());

    match method {
        Reduction::Copy => out.copy_from_slice(row),
        Reduction::Time => forward_time(row, out),
        Reduction::Time2 => forward_time2(row, out),
        Reduction::Chan => forward_chan(previous_row, row, out),
    }
}

/// Inverts `buf` (holding residuals under `method`) back into the original row, in place.
/// `previous_row` is only consulted by [`Reduction::Chan`].
pub fn inverse<W: Word>(method: Reduction, previous_row: &[W], buf: &mut [W]) {
    debug_assert_eq!(previous_row.len(), buf.len());

    match method {
        Reduction::Copy => {}
        Reduction::Time => inverse_time(buf),
        Reduction::Time2 => inverse_time2(buf),
        Reduction::Chan => inverse_chan(previous_row, buf),
    }
}

fn forward_time<W: Word>(row: &[W], out: &mut [W]) {
    if row.is_empty() {
        return;
    }
    out[0] = row[0];
    for i in 1..row.len() {
        out[i] = row[i].wrapping_sub(row[i - 1]);
    }
}

fn inverse_time<W: Word>(buf: &mut [W]) {
    for i in 1..buf.len() {
        buf[i] = buf[i].wrapping_add(buf[i - 1]);
    }
}

fn forward_time2<W: Word>(row: &[W], out: &mut [W]) {
    let l = row.len();
    if l == 0 {
        return;
    }
    out[0] = row[0];
    if l == 1 {
        return;
    }
    out[1] = row[1].wrapping_sub(row[0]);
    for i in 2..l {
        let d_i = row[i].wrapping_sub(row[i - 1]);
        let d_im1 = row[i - 1].wrapping_sub(row[i - 2]);
        out[i] = d_i.wrapping_sub(d_im1);
    }
}

/// Two prefix sums in sequence: the first recovers the first-difference stream from index 1
/// onward, the second recovers the row itself. The second pass must run over the *output* of
/// the first, never over the original residuals.
fn inverse_time2<W: Word>(buf: &mut [W]) {
    let l = buf.len();
    for i in 2..l {
        buf[i] = buf[i].wrapping_add(buf[i - 1]);
    }
    for i in 1..l {
        buf[i] = buf[i].wrapping_add(buf[i - 1]);
    }
}

fn forward_chan<W: Word>(previous_row: &[W], row: &[W], out: &mut [W]) {
    let l = row.len();
    if l == 0 {
        return;
    }
    out[0] = row[0];
    for i in 1..l {
        let d = row[i].wrapping_sub(row[i - 1]);
        let pd = previous_row[i - 1].wrapping_sub(previous_row[i]);
        out[i] = d.wrapping_add(pd);
    }
}

fn inverse_chan<W: Word>(previous_row: &[W], buf: &mut [W]) {
    for i in 1..buf.len() {
        let t = buf[i - 1].wrapping_add(buf[i]);
        let t = t.wrapping_sub(previous_row[i - 1]);
        buf[i] = t.wrapping_add(previous_row[i]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prev_zero(l: usize) -> Vec<u32> {
        vec![0u32; l]
    }

    #[test]
    fn time_round_trips() {
        let row: Vec<u32> = vec![11, 21, 5, 5000, 0xffff_ffff];
        let prev = prev_zero(row.len());
        let mut residuals = vec![0u32; row.len()];
        forward(Reduction::Time, &prev, &row, &mut residuals);
        let mut restored = residuals.clone();
        inverse(Reduction::Time, &prev, &mut restored);
        assert_eq!(restored, row);
    }

    #[test]
    fn time2_round_trips_including_short_rows() {
        for l in [1usize, 2, 3, 8] {
            let row: Vec<u32> = (0..l).map(|i| (i as u32).wrapping_mul(777).wrapping_add(3)).collect();
            let prev = prev_zero(l);
            let mut residuals = vec![0u32; l];
            forward(Reduction::Time2, &prev, &row, &mut residuals);
            let mut restored = residuals.clone();
            inverse(Reduction::Time2, &prev, &mut restored);
            assert_eq!(restored, row, "length {l}");
        }
    }

    #[test]
    fn chan_round_trips_against_nonzero_previous_row() {
        let prev: Vec<u32> = vec![100, 90, 80, 70, 60];
        let row: Vec<u32> = vec![105, 96, 81, 65, 50];
        let mut residuals = vec![0u32; row.len()];
        forward(Reduction::Chan, &prev, &row, &mut residuals);
        let mut restored = residuals.clone();
        inverse(Reduction::Chan, &prev, &mut restored);
        assert_eq!(restored, row);
    }

    #[test]
    fn copy_is_identity() {
        let row: Vec<u32> = vec![1, 2, 3];
        let prev = prev_zero(row.len());
        let mut residuals = vec![0u32; row.len()];
        forward(Reduction::Copy, &prev, &row, &mut residuals);
        assert_eq!(residuals, row);
        let mut restored = residuals.clone();
        inverse(Reduction::Copy, &prev, &mut restored);
        assert_eq!(restored, row);
    }

    #[test]
    fn single_sample_row() {
        let row: Vec<u32> = vec![42];
        let prev: Vec<u32> = vec![7];
        for method in Reduction::ALL {
            let mut residuals = vec![0u32; 1];
            forward(method, &prev, &row, &mut residuals);
            let mut restored = residuals.clone();
            inverse(method, &prev, &mut restored);
            assert_eq!(restored, row, "{method:?}");
        }
    }
}
