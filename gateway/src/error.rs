use airlock_types::NetworkId;
use thiserror::Error;

/// Network or ledger rejection of a submission attempt.
///
/// Recoverable by rebuilding the transaction when caused by stale
/// sequence/ledger bounds; otherwise surfaced verbatim. Never retried
/// automatically.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("blob was signed for {blob} but submitted to a {client} client")]
    NetworkMismatch { blob: NetworkId, client: NetworkId },

    #[error("node request failed: {0}")]
    Transport(String),

    #[error("node returned HTTP {0}")]
    HttpStatus(u16),

    #[error("invalid node response: {0}")]
    BadResponse(String),

    #[error("node error: {0}")]
    Node(String),

    #[error("transaction rejected: {engine_result}: {message}")]
    Rejected {
        engine_result: String,
        message: String,
    },
}
