//! Error type for the XDS parser.
//!
//! Per spec.md §7, a bad XDS checksum is a recoverable condition (the
//! packet is dropped silently, tracked in `DecoderStats`) — it never
//! reaches this type. `XdsError` instead covers the one genuinely
//! fallible entry point this crate exposes: parsing a complete,
//! already-framed packet buffer directly (used by tooling that has a
//! whole XDS packet in hand rather than a byte-pair stream).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XdsError {
    #[error("XDS packet truncated: need at least a header pair and a terminator pair")]
    Truncated,
}

pub type Result<T> = std::result::Result<T, XdsError>;
