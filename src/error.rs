//! Error types for control-thread operations.
//!
//! Nothing on the render path returns these. Audio processing clamps and
//! guards instead of failing; only configuration, text entry and persisted
//! state handling can report an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    #[error("Invalid block size: {0}. Must be between 1 and {max}", max = crate::MAX_BLOCK_SIZE)]
    InvalidBlockSize(usize),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Cannot parse '{text}' as a value for '{id}'")]
    UnparsableValue { id: String, text: String },

    #[error("Unknown node kind: {0}")]
    UnknownNodeKind(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
