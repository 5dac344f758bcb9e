//! # MiniRDS Error Handling
//!
//! This module defines the `RdsError` enum, which represents the different
//! error taxonomies described in the error handling design: configuration
//! errors, resource-init failures, transient I/O, sink failures, and
//! field-level validation rejections.

use thiserror::Error;

/// Represents the different error types that can occur in the MiniRDS crate.
#[derive(Debug, Error)]
pub enum RdsError {
    /// Malformed CLI argument or control-channel command line.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Audio output device could not be opened.
    #[error("audio init failure: {0}")]
    AudioInit(String),

    /// The polyphase resampler could not be constructed for the requested rates.
    #[error("resampler init failure: {0}")]
    ResamplerInit(String),

    /// The RDS group sequencer or program information store failed to initialize.
    #[error("RDS init failure: {0}")]
    RdsInit(String),

    /// Control-transport read error (broken pipe, EOF, reset connection).
    /// The caller reconnects; the generator is not stopped.
    #[error("transient I/O error: {0}")]
    TransientIo(String),

    /// The audio sink's blocking write returned an error; the generator stops cleanly.
    #[error("sink failure: {0}")]
    SinkFailure(String),

    /// A setter rejected an out-of-range or malformed value. The previous
    /// value is retained.
    #[error("invalid value for {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },
}

impl RdsError {
    /// Maps the resource-init failure variants onto the CLI's documented
    /// process exit codes. Returns `None` for variants that are always
    /// handled in place (logged and skipped, or reconnected) and therefore
    /// never reach `main`.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RdsError::AudioInit(_) => Some(1),
            RdsError::ResamplerInit(_) => Some(2),
            RdsError::RdsInit(_) => Some(3),
            _ => None,
        }
    }
}
