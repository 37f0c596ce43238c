//! Error type for the 708 decoder.
//!
//! Per spec.md §7, almost every malformed-packet condition is a
//! recoverable event (discard in-flight state, bump a counter, keep
//! going): only a truly unparsable variable-length C3 command is
//! fatal, because the spec reserves that range for font/graphics
//! downloads this decoder has no way to skip past safely.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Cc708Error {
    #[error("unsupported sample: unparsable variable-length C3 command in service {service}")]
    UnsupportedSample { service: u8 },
}

pub type Result<T> = std::result::Result<T, Cc708Error>;
