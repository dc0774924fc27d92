//! The two-device signing handshake.
//!
//! The app and the hardware signer share no channel except QR codes: the
//! app displays an encoded sign request, the user carries it to the device,
//! signs on-device, and the app's camera scans the response. This crate
//! orchestrates that flow as an explicit state machine:
//!
//! ```text
//! QrDisplay ──confirm──▶ Signing ──scan ok──▶ Submitting ──▶ Complete
//!     ▲                     │                      │
//!     └────── rollback on submit failure ──────────┘
//! (Cancelled reachable from QrDisplay/Signing; never from Submitting)
//! ```
//!
//! One flow at a time: sessions are created through [`SigningFlows`], whose
//! guard refuses a second concurrent handshake.

pub mod error;
pub mod session;

pub use error::SigningError;
pub use session::{
    FlowGuard, HandshakeState, ScanProgress, SigningFlows, SigningSession, Submitter,
};
