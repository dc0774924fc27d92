//! The signing-session state machine.

use crate::error::SigningError;
use airlock_gateway::{NodeClient, SignedBlob, SubmissionError, SubmitOutcome};
use airlock_tx::{
    deserialize_blob, serialize_signed, transaction_hash, UnsignedTransaction,
};
use airlock_types::NetworkId;
use airlock_ur::{
    decode_response, encode_sign_request, Decoded, SignRequest, SignaturePayload, UrAccumulator,
};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a handshake currently stands.
///
/// `Complete`, `Cancelled`, and `Failed` are terminal. A failed submission
/// is not terminal: the session rolls back to `QrDisplay` with the unsigned
/// transaction intact so the user can re-sign after a rebuild or retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandshakeState {
    /// The request QR is on screen, waiting for the user to sign on-device.
    QrDisplay,
    /// The camera is live, collecting response frames.
    Signing,
    /// A signed blob is in flight to the node. Cancellation is refused here;
    /// the transaction may already be in a validated ledger.
    Submitting,
    Complete { tx_hash: String },
    Cancelled,
    Failed { reason: String },
}

impl HandshakeState {
    fn name(&self) -> &'static str {
        match self {
            HandshakeState::QrDisplay => "QrDisplay",
            HandshakeState::Signing => "Signing",
            HandshakeState::Submitting => "Submitting",
            HandshakeState::Complete { .. } => "Complete",
            HandshakeState::Cancelled => "Cancelled",
            HandshakeState::Failed { .. } => "Failed",
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Admission control: at most one handshake at a time per wallet process.
///
/// A second `begin` while a session is alive returns
/// [`SigningError::FlowInProgress`]; the slot frees automatically when the
/// session (and its guard) drops.
#[derive(Clone, Default)]
pub struct SigningFlows {
    active: Arc<AtomicBool>,
}

impl SigningFlows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for the given unsigned transaction.
    pub fn begin(
        &self,
        unsigned: UnsignedTransaction,
        network: NetworkId,
    ) -> Result<SigningSession, SigningError> {
        let guard = self.acquire()?;
        SigningSession::start(unsigned, network, guard)
    }

    fn acquire(&self) -> Result<FlowGuard, SigningError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SigningError::FlowInProgress);
        }
        Ok(FlowGuard {
            active: Arc::clone(&self.active),
        })
    }
}

/// Releases the single-flow slot on drop, whatever state the session died in.
pub struct FlowGuard {
    active: Arc<AtomicBool>,
}

impl Drop for FlowGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Progress of one scan step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanProgress {
    /// Multi-part response still assembling; keep the camera running.
    NeedMoreFragments { received: u32, total: u32 },
    /// A verified signed blob, ready to submit. The session is now in
    /// `Submitting`.
    Ready(SignedBlob),
}

/// Anything that can push a signed blob to a validator network.
///
/// [`NodeClient`] is the production implementation; tests substitute
/// scripted doubles.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, blob: &SignedBlob) -> Result<SubmitOutcome, SubmissionError>;
}

#[async_trait]
impl Submitter for NodeClient {
    async fn submit(&self, blob: &SignedBlob) -> Result<SubmitOutcome, SubmissionError> {
        NodeClient::submit(self, blob).await
    }
}

/// One signing handshake, from QR display through submission.
pub struct SigningSession {
    state: HandshakeState,
    network: NetworkId,
    unsigned: UnsignedTransaction,
    request: SignRequest,
    accumulator: Option<UrAccumulator>,
    signed: Option<SignedBlob>,
    _guard: FlowGuard,
}

impl SigningSession {
    fn start(
        unsigned: UnsignedTransaction,
        network: NetworkId,
        guard: FlowGuard,
    ) -> Result<Self, SigningError> {
        let request = encode_sign_request(&unsigned)?;
        info!(
            request_id = %request.request_id,
            %network,
            sequence = unsigned.sequence,
            "signing session started"
        );
        Ok(Self {
            state: HandshakeState::QrDisplay,
            network,
            unsigned,
            request,
            accumulator: None,
            signed: None,
            _guard: guard,
        })
    }

    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn unsigned(&self) -> &UnsignedTransaction {
        &self.unsigned
    }

    /// The request to render as a QR code.
    pub fn request(&self) -> &SignRequest {
        &self.request
    }

    /// The user confirmed signing on-device; open the camera.
    pub fn confirm_signed(&mut self) -> Result<(), SigningError> {
        match self.state {
            HandshakeState::QrDisplay => {
                self.state = HandshakeState::Signing;
                Ok(())
            }
            ref other => Err(SigningError::InvalidState {
                expected: "QrDisplay",
                actual: other.to_string(),
            }),
        }
    }

    /// Feed one scanned string from the camera.
    ///
    /// A decode failure leaves the session in `Signing` with any collected
    /// fragments intact; camera noise must never kill a handshake. Only a
    /// fully decoded, verified blob moves the session to `Submitting`.
    pub fn handle_scan(&mut self, raw: &str) -> Result<ScanProgress, SigningError> {
        if self.state != HandshakeState::Signing {
            return Err(SigningError::InvalidState {
                expected: "Signing",
                actual: self.state.to_string(),
            });
        }

        let pending = self.accumulator.take();
        let decoded = match decode_response(raw, pending.clone()) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.accumulator = pending;
                return Err(e.into());
            }
        };

        match decoded {
            Decoded::Incomplete(acc) => {
                let (received, total) = (acc.received(), acc.total());
                self.accumulator = Some(acc);
                Ok(ScanProgress::NeedMoreFragments { received, total })
            }
            Decoded::Complete(result) => {
                if let Some(echoed) = &result.request_id {
                    if *echoed != self.request.request_id.to_string() {
                        // Firmware versions differ on echoing the token;
                        // the field-match check below is the real gate.
                        warn!(%echoed, expected = %self.request.request_id, "request id mismatch");
                    }
                }
                let blob_bytes = match result.payload {
                    SignaturePayload::Signature(sig) => {
                        serialize_signed(&self.unsigned, &sig)?
                    }
                    SignaturePayload::SignedBlob(bytes) => {
                        let parsed = deserialize_blob(&bytes)?;
                        if !parsed.matches(&self.unsigned) {
                            return Err(SigningError::BlobMismatch);
                        }
                        bytes
                    }
                };
                let blob = SignedBlob::new(&blob_bytes, self.network);
                debug!(bytes = blob_bytes.len(), "signed blob verified");
                self.accumulator = None;
                self.signed = Some(blob.clone());
                self.state = HandshakeState::Submitting;
                Ok(ScanProgress::Ready(blob))
            }
        }
    }

    /// Record the node's verdict on the submitted blob.
    ///
    /// Success is terminal. Rejection rolls back to `QrDisplay`, keeping the
    /// unsigned transaction so the caller can rebuild (stale sequence or
    /// expired ledger window) or retry as-is.
    pub fn record_outcome(&mut self, outcome: &SubmitOutcome) -> Result<(), SigningError> {
        if self.state != HandshakeState::Submitting {
            return Err(SigningError::InvalidState {
                expected: "Submitting",
                actual: self.state.to_string(),
            });
        }
        if outcome.is_success() {
            let tx_hash = match (&outcome.tx_hash, &self.signed) {
                (Some(hash), _) => hash.clone(),
                (None, Some(blob)) => {
                    let bytes = hex::decode(blob.as_hex())
                        .map_err(|_| SigningError::BlobMismatch)?;
                    transaction_hash(&bytes)
                }
                (None, None) => String::new(),
            };
            info!(%tx_hash, "transaction accepted");
            self.state = HandshakeState::Complete { tx_hash };
        } else {
            warn!(
                engine_result = %outcome.engine_result,
                stale = outcome.engine_result.is_stale_state(),
                "submission rejected; rolling back"
            );
            self.rollback();
        }
        Ok(())
    }

    /// A transport-level failure during submission: roll back to `QrDisplay`.
    pub fn record_transport_failure(&mut self, error: &SubmissionError) -> Result<(), SigningError> {
        if self.state != HandshakeState::Submitting {
            return Err(SigningError::InvalidState {
                expected: "Submitting",
                actual: self.state.to_string(),
            });
        }
        warn!(%error, "submission transport failure; rolling back");
        self.rollback();
        Ok(())
    }

    fn rollback(&mut self) {
        self.signed = None;
        self.accumulator = None;
        self.state = HandshakeState::QrDisplay;
    }

    /// Abort the handshake. Refused once the blob is in flight.
    pub fn cancel(&mut self) -> Result<(), SigningError> {
        match self.state {
            HandshakeState::QrDisplay | HandshakeState::Signing => {
                info!(request_id = %self.request.request_id, "signing session cancelled");
                self.state = HandshakeState::Cancelled;
                Ok(())
            }
            HandshakeState::Submitting => Err(SigningError::CannotCancelWhileSubmitting),
            ref other => Err(SigningError::InvalidState {
                expected: "QrDisplay or Signing",
                actual: other.to_string(),
            }),
        }
    }

    /// Drive the session to a verdict: consume scans until a blob is ready,
    /// submit it, and record the outcome.
    ///
    /// Unreadable scans are logged and skipped; the camera keeps running. A
    /// stream that ends before a complete response fails the attempt. After
    /// a rejected submission the session is back in `QrDisplay` and this can
    /// be called again once the user re-signs.
    pub async fn run<S, T>(
        &mut self,
        scans: &mut S,
        submitter: &T,
    ) -> Result<SubmitOutcome, SigningError>
    where
        S: Stream<Item = String> + Unpin,
        T: Submitter,
    {
        self.confirm_signed()?;
        let blob = loop {
            let Some(raw) = scans.next().await else {
                self.state = HandshakeState::Failed {
                    reason: "scan stream ended".into(),
                };
                return Err(SigningError::ScanStreamEnded);
            };
            match self.handle_scan(&raw) {
                Ok(ScanProgress::Ready(blob)) => break blob,
                Ok(ScanProgress::NeedMoreFragments { received, total }) => {
                    debug!(received, total, "awaiting more fragments");
                }
                Err(SigningError::Decode(e)) => {
                    debug!(%e, "unreadable scan; continuing");
                }
                Err(other) => return Err(other),
            }
        };

        match submitter.submit(&blob).await {
            Ok(outcome) => {
                self.record_outcome(&outcome)?;
                Ok(outcome)
            }
            Err(e) => {
                self.record_transport_failure(&e)?;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airlock_gateway::EngineResult;
    use airlock_tx::TransactionType;
    use airlock_types::{Address, Amount, Drops};
    use airlock_ur::cbor;
    use futures_util::stream;
    use std::sync::Mutex;

    fn sample_tx() -> UnsignedTransaction {
        UnsignedTransaction {
            transaction_type: TransactionType::Payment,
            account: Address::parse("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh").unwrap(),
            fee: Drops::new(12),
            sequence: 5,
            last_ledger_sequence: 80_001_000,
            flags: Some(0x8000_0000),
            signing_pub_key: "ED9434799226374926EDA3B54B1B461B4ABF7237962EAE18528FEA67595397FA32"
                .into(),
            amount: Some(Amount::Xrp(Drops::new(1_000_000))),
            destination: Some(Address::parse("rrrrrrrrrrrrrrrrrrrrrhoLvTp").unwrap()),
            destination_tag: None,
            limit_amount: None,
            taker_gets: None,
            taker_pays: None,
            offer_sequence: None,
            expiration: None,
        }
    }

    fn signature_scan() -> String {
        let json = r#"{"signature":"7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e"}"#;
        let wrapped = cbor::wrap_bytes(json.as_bytes()).unwrap();
        format!("ur:bytes/{}", hex::encode(wrapped))
    }

    struct ScriptedSubmitter {
        outcomes: Mutex<Vec<Result<SubmitOutcome, SubmissionError>>>,
    }

    impl ScriptedSubmitter {
        fn returning(outcome: Result<SubmitOutcome, SubmissionError>) -> Self {
            Self {
                outcomes: Mutex::new(vec![outcome]),
            }
        }
    }

    #[async_trait]
    impl Submitter for ScriptedSubmitter {
        async fn submit(&self, _blob: &SignedBlob) -> Result<SubmitOutcome, SubmissionError> {
            self.outcomes.lock().unwrap().pop().expect("script exhausted")
        }
    }

    fn success_outcome() -> SubmitOutcome {
        SubmitOutcome {
            engine_result: EngineResult("tesSUCCESS".into()),
            engine_result_message: "The transaction was applied.".into(),
            tx_hash: Some("ABC123".into()),
        }
    }

    fn rejected_outcome(code: &str) -> SubmitOutcome {
        SubmitOutcome {
            engine_result: EngineResult(code.into()),
            engine_result_message: String::new(),
            tx_hash: None,
        }
    }

    #[test]
    fn begin_starts_in_qr_display() {
        let flows = SigningFlows::new();
        let session = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        assert_eq!(*session.state(), HandshakeState::QrDisplay);
        assert!(session.request().to_ur_string().starts_with("ur:bytes/"));
    }

    #[test]
    fn second_concurrent_flow_refused() {
        let flows = SigningFlows::new();
        let first = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        assert!(matches!(
            flows.begin(sample_tx(), NetworkId::Testnet),
            Err(SigningError::FlowInProgress)
        ));
        drop(first);
        assert!(flows.begin(sample_tx(), NetworkId::Testnet).is_ok());
    }

    #[test]
    fn scan_refused_before_confirmation() {
        let flows = SigningFlows::new();
        let mut session = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        assert!(matches!(
            session.handle_scan(&signature_scan()),
            Err(SigningError::InvalidState { .. })
        ));
    }

    #[test]
    fn signature_scan_moves_to_submitting() {
        let flows = SigningFlows::new();
        let mut session = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        session.confirm_signed().unwrap();
        let progress = session.handle_scan(&signature_scan()).unwrap();
        match progress {
            ScanProgress::Ready(blob) => {
                assert_eq!(blob.network(), NetworkId::Testnet);
                assert!(blob.as_hex().starts_with("12"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(*session.state(), HandshakeState::Submitting);
    }

    #[test]
    fn unreadable_scan_keeps_collected_fragments() {
        let json = r#"{"signature":"deadbeef"}"#;
        let wrapped = cbor::wrap_bytes(json.as_bytes()).unwrap();
        let mid = wrapped.len() / 2;
        let frame1 = format!("ur:bytes/1-2/{}", hex::encode(&wrapped[..mid]));
        let frame2 = format!("ur:bytes/2-2/{}", hex::encode(&wrapped[mid..]));

        let flows = SigningFlows::new();
        let mut session = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        session.confirm_signed().unwrap();

        assert_eq!(
            session.handle_scan(&frame1).unwrap(),
            ScanProgress::NeedMoreFragments {
                received: 1,
                total: 2
            }
        );
        assert!(session.handle_scan("garbage, not a ur").is_err());
        assert_eq!(*session.state(), HandshakeState::Signing);
        // The first fragment survived the bad scan.
        assert!(matches!(
            session.handle_scan(&frame2).unwrap(),
            ScanProgress::Ready(_)
        ));
    }

    #[test]
    fn foreign_blob_rejected_as_mismatch() {
        let mut other = sample_tx();
        other.sequence = 99;
        let blob = serialize_signed(&other, &[0x7E; 64]).unwrap();
        let wrapped = cbor::wrap_bytes(&blob).unwrap();
        let scan = format!("ur:bytes/{}", hex::encode(wrapped));

        let flows = SigningFlows::new();
        let mut session = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        session.confirm_signed().unwrap();
        assert!(matches!(
            session.handle_scan(&scan),
            Err(SigningError::BlobMismatch)
        ));
        assert_eq!(*session.state(), HandshakeState::Signing);
    }

    #[test]
    fn cancel_allowed_before_submitting_only() {
        let flows = SigningFlows::new();
        let mut session = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        session.confirm_signed().unwrap();
        session.handle_scan(&signature_scan()).unwrap();
        assert!(matches!(
            session.cancel(),
            Err(SigningError::CannotCancelWhileSubmitting)
        ));

        let mut fresh = SigningFlows::new()
            .begin(sample_tx(), NetworkId::Testnet)
            .unwrap();
        fresh.cancel().unwrap();
        assert_eq!(*fresh.state(), HandshakeState::Cancelled);
    }

    #[test]
    fn rejection_rolls_back_with_unsigned_intact() {
        let flows = SigningFlows::new();
        let mut session = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        session.confirm_signed().unwrap();
        session.handle_scan(&signature_scan()).unwrap();

        session
            .record_outcome(&rejected_outcome("tefMAX_LEDGER"))
            .unwrap();
        assert_eq!(*session.state(), HandshakeState::QrDisplay);
        assert_eq!(*session.unsigned(), sample_tx());
    }

    #[tokio::test]
    async fn run_happy_path_completes_with_hash() {
        let flows = SigningFlows::new();
        let mut session = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        let submitter = ScriptedSubmitter::returning(Ok(success_outcome()));
        let mut scans = stream::iter(vec!["noise".to_string(), signature_scan()]);

        let outcome = session.run(&mut scans, &submitter).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(
            *session.state(),
            HandshakeState::Complete {
                tx_hash: "ABC123".into()
            }
        );
    }

    #[tokio::test]
    async fn run_transport_failure_rolls_back() {
        let flows = SigningFlows::new();
        let mut session = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        let submitter = ScriptedSubmitter::returning(Err(SubmissionError::Transport(
            "connection refused".into(),
        )));
        let mut scans = stream::iter(vec![signature_scan()]);

        assert!(matches!(
            session.run(&mut scans, &submitter).await,
            Err(SigningError::Submission(_))
        ));
        assert_eq!(*session.state(), HandshakeState::QrDisplay);
    }

    #[tokio::test]
    async fn run_fails_when_scans_end_early() {
        let flows = SigningFlows::new();
        let mut session = flows.begin(sample_tx(), NetworkId::Testnet).unwrap();
        let submitter = ScriptedSubmitter::returning(Ok(success_outcome()));
        let mut scans = stream::iter(Vec::<String>::new());

        assert!(matches!(
            session.run(&mut scans, &submitter).await,
            Err(SigningError::ScanStreamEnded)
        ));
        assert!(matches!(*session.state(), HandshakeState::Failed { .. }));
    }
}
