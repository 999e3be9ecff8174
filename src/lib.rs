// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `tracecodec` compresses and decompresses a (channels × samples) matrix of signed integer
//! measurements using predictive, invertible per-row reductions and a variable-width bit-packed
//! residual stream.
//!
//! The crate operates purely on caller-owned byte and sample buffers: it has no notion of
//! files, containers, or event archives. An outer format that needs those is expected to store
//! the epoch's dimensions and invoke [`RowCodec`] once per epoch.
//!
//! ```
//! use tracecodec::{Format, RowCodec, Width};
//!
//! let mut codec = RowCodec::new(Width::W4, Format::Extended, 2, 3).unwrap();
//! let matrix: Vec<i64> = vec![1, 2, 3, 4, 5, 6];
//! let bytes = codec.encode_row_major(&matrix).unwrap();
//! let decoded = codec.decode_row_major(&bytes).unwrap();
//! assert_eq!(decoded, matrix);
//! ```

mod bitstream;
mod block;
mod error;
mod format;
mod header;
mod matrix;
mod reduction;
mod row;
mod util;
mod word;

pub use error::CodecError;
pub use format::{Format, Width};
pub use matrix::{RowCodec, RowOrder};
pub use reduction::Reduction;

/// Convenience alias used throughout the public API.
pub type Result<T> = std::result::Result<T, CodecError>;
