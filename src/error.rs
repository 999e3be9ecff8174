// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `error` module defines the common error type returned at the codec's operation
//! boundaries (encode/decode calls). Errors are all-or-nothing per call: the codec holds no
//! partial state across a failed operation.

use std::fmt;

/// `CodecError` enumerates every way an encode or decode call can fail.
#[derive(Debug)]
pub enum CodecError {
    /// `H`, `L`, or a row permutation did not satisfy its invariants, or did not match the
    /// dimensions configured on the codec instance.
    InvalidDimensions(&'static str),
    /// A decoded method, `n`, `nexc`, or `data_size` fell outside its allowed range.
    InvalidHeader(&'static str),
    /// The byte stream ended mid-word or mid-header.
    Truncated,
    /// The decoder finished all rows with bytes left over in the input.
    TrailingBytes,
    /// A size computation would not have fit in its target type; caught before allocation.
    ArithmeticOverflow(&'static str),
    /// The writer ran out of output space in a caller-supplied buffer.
    BufferOverflow,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CodecError::InvalidDimensions(msg) => write!(f, "invalid dimensions: {}", msg),
            CodecError::InvalidHeader(msg) => write!(f, "invalid block header: {}", msg),
            CodecError::Truncated => write!(f, "truncated bit stream"),
            CodecError::TrailingBytes => write!(f, "trailing bytes after last row"),
            CodecError::ArithmeticOverflow(msg) => write!(f, "arithmetic overflow: {}", msg),
            CodecError::BufferOverflow => write!(f, "output buffer overflow"),
        }
    }
}

impl std::error::Error for CodecError {}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Convenience function to create an invalid-dimensions error.
pub fn invalid_dimensions<T>(msg: &'static str) -> Result<T> {
    Err(CodecError::InvalidDimensions(msg))
}

/// Convenience function to create an invalid-header error.
pub fn invalid_header<T>(msg: &'static str) -> Result<T> {
    Err(CodecError::InvalidHeader(msg))
}

/// Convenience function to create a truncated-stream error.
pub fn truncated<T>() -> Result<T> {
    Err(CodecError::Truncated)
}

/// Convenience function to create a trailing-bytes error.
pub fn trailing_bytes<T>() -> Result<T> {
    Err(CodecError::TrailingBytes)
}

/// Convenience function to create an arithmetic-overflow error.
pub fn overflow<T>(msg: &'static str) -> Result<T> {
    Err(CodecError::ArithmeticOverflow(msg))
}

/// Convenience function to create a buffer-overflow error.
pub fn buffer_overflow<T>() -> Result<T> {
    Err(CodecError::BufferOverflow)
}
