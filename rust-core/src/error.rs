//! Error taxonomy shared by every engine stage

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or out-of-range filter parameters
    #[error("Invalid filter specification: {0}")]
    InvalidSpec(String),

    /// Buffer too short for forward-backward filtering
    #[error("Buffer of {samples} samples is too short for zero-phase filtering (needs more than {required})")]
    InsufficientLength { samples: usize, required: usize },

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode {path}: {reason}")]
    DecodeFailure { path: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    WriteFailure { path: String, reason: String },

    #[error("Buffer contains no samples")]
    EmptyBuffer,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No processed signal is available yet")]
    NoProcessedSignal,

    #[error("Spectral transform failed: {0}")]
    Transform(String),

    #[error("Operation was cancelled")]
    Cancelled,

    /// A background job panicked before producing a result
    #[error("Worker thread panicked: {0}")]
    WorkerPanicked(String),
}

impl EngineError {
    pub(crate) fn invalid_spec(msg: impl Into<String>) -> Self {
        EngineError::InvalidSpec(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
