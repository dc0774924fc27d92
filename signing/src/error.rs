//! Signing-flow errors.

use airlock_gateway::SubmissionError;
use airlock_tx::BinaryError;
use airlock_ur::{DecodeError, EncodeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("another signing flow is already in progress")]
    FlowInProgress,

    #[error("operation not valid in state {actual}: expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: String,
    },

    #[error("cannot cancel while submitting")]
    CannotCancelWhileSubmitting,

    #[error("failed to encode sign request: {0}")]
    Encode(#[from] EncodeError),

    #[error("failed to decode scanned response: {0}")]
    Decode(#[from] DecodeError),

    #[error("binary codec error: {0}")]
    Binary(#[from] BinaryError),

    #[error("scanned blob does not match the pending transaction")]
    BlobMismatch,

    #[error("submission failed: {0}")]
    Submission(#[from] SubmissionError),

    #[error("scan stream ended before a complete response")]
    ScanStreamEnded,
}
