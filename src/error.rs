//! Error types for the scaletempo crate.

use std::fmt;

/// Errors that can occur when constructing or configuring the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TempoError {
    /// Channel count outside the supported range.
    InvalidChannelCount { provided: usize, maximum: usize },
    /// Sample rate is zero.
    InvalidSampleRate { provided: u32 },
    /// Option values that cannot yield a usable configuration.
    InvalidOptions(String),
}

impl fmt::Display for TempoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TempoError::InvalidChannelCount { provided, maximum } => {
                write!(
                    f,
                    "invalid channel count: {} provided, 1..={} supported",
                    provided, maximum
                )
            }
            TempoError::InvalidSampleRate { provided } => {
                write!(f, "invalid sample rate: {} Hz", provided)
            }
            TempoError::InvalidOptions(msg) => write!(f, "invalid options: {}", msg),
        }
    }
}

impl std::error::Error for TempoError {}
