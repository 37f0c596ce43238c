//! Error type for the 608 decoder.
//!
//! Per spec.md §7, almost every malformed-input case in line-21 data is
//! locally recovered (bad parity substitutes a glyph, odd-length input
//! drops the trailing byte) rather than surfaced to the caller — this
//! enum exists for genuine misuse of the API, not for stream noise.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Cc608Error {
    #[error("byte-pair buffer has odd length: {0}")]
    OddLength(usize),

    #[error("channel must be 1 or 2, got {0}")]
    InvalidChannel(u8),
}

pub type Result<T> = std::result::Result<T, Cc608Error>;
