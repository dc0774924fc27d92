//! XRPL JSON-RPC gateway.
//!
//! Wraps `reqwest::Client` with the network's endpoint and provides typed
//! methods for each RPC the wallet needs: `account_info`, `account_offers`,
//! `account_lines`, `book_offers`, `ledger_current`, `server_state`, and
//! `submit`.
//!
//! Network selection is explicit on every client: a signed blob carries the
//! network it was built for, and submitting it through a client bound to a
//! different network is rejected before any bytes leave the process.

pub mod client;
pub mod engine;
pub mod error;

pub use client::{
    AccountInfoResult, AccountLine, AccountOffer, BookOffer, NodeClient, ServerReserves,
    SignedBlob, SubmitOutcome,
};
pub use engine::EngineResult;
pub use error::SubmissionError;
