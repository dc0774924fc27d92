//! Nullable submitter — a scripted node.

use airlock_gateway::{EngineResult, SignedBlob, SubmissionError, SubmitOutcome};
use airlock_signing::Submitter;
use async_trait::async_trait;
use std::sync::Mutex;

/// A submitter that replays scripted outcomes and records every blob it was
/// handed, without any network I/O.
pub struct NullSubmitter {
    outcomes: Mutex<Vec<Result<SubmitOutcome, SubmissionError>>>,
    submitted: Mutex<Vec<SignedBlob>>,
}

impl NullSubmitter {
    /// Replays `outcomes` front to back; panics if asked for more.
    pub fn with_outcomes(outcomes: Vec<Result<SubmitOutcome, SubmissionError>>) -> Self {
        let mut outcomes = outcomes;
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `tesSUCCESS` with the given hash.
    pub fn succeeding(tx_hash: &str) -> Self {
        Self::with_outcomes(vec![Ok(SubmitOutcome {
            engine_result: EngineResult("tesSUCCESS".into()),
            engine_result_message: "The transaction was applied.".into(),
            tx_hash: Some(tx_hash.to_string()),
        })])
    }

    /// Answers once with the given engine result code.
    pub fn rejecting(code: &str) -> Self {
        Self::with_outcomes(vec![Ok(SubmitOutcome {
            engine_result: EngineResult(code.into()),
            engine_result_message: String::new(),
            tx_hash: None,
        })])
    }

    /// Every blob submitted so far, in order.
    pub fn submitted(&self) -> Vec<SignedBlob> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Submitter for NullSubmitter {
    async fn submit(&self, blob: &SignedBlob) -> Result<SubmitOutcome, SubmissionError> {
        self.submitted.lock().unwrap().push(blob.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop()
            .expect("NullSubmitter script exhausted")
    }
}
