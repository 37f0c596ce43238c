//! Error type for the VOBSUB SPU decoder.
//!
//! Per spec.md §7, a bad display area or an RLE run that overruns the
//! plane is `BitmapOutOfBounds` — a recoverable condition, tracked in
//! `DecoderStats` and dropped without propagating. `VobsubError` covers
//! only the one call a caller can genuinely get wrong: handing in a
//! buffer too short to even contain the 4-byte packet header.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VobsubError {
    #[error("SPU packet truncated: need at least a 4-byte header, got {len} bytes")]
    Truncated { len: usize },
}

pub type Result<T> = std::result::Result<T, VobsubError>;
