//! Error type for the CC data router.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("608 decoder error: {0}")]
    Cc608(#[from] cc608::Cc608Error),
    #[error("708 decoder error: {0}")]
    Cc708(#[from] cc708::Cc708Error),
    #[error("RCWT stream truncated: need at least {need} bytes, got {got}")]
    RcwtTruncated { need: usize, got: usize },
    #[error("RCWT magic mismatch")]
    RcwtBadMagic,
}

pub type Result<T> = std::result::Result<T, RouterError>;
