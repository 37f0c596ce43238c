//! Error type for the timing engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimingError {
    #[error("invalid max_dif: {0} seconds (must be positive)")]
    InvalidMaxDif(i64),
}

pub type Result<T> = std::result::Result<T, TimingError>;
