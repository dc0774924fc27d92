//! XRPL transaction model, builder, and canonical binary codec.
//!
//! Transaction kinds supported by the wallet:
//! - **Payment**: native or issued-currency transfer
//! - **TrustSet**: open/adjust a trustline to an issuer
//! - **OfferCreate**: place a DEX order
//! - **OfferCancel**: withdraw a DEX order
//!
//! The builder turns user intent plus live account state into an immutable
//! [`UnsignedTransaction`]; the binary codec merges a device signature back
//! into the ledger's canonical wire form and verifies scanned blobs against
//! the pending transaction.

pub mod binary;
pub mod builder;
pub mod error;
pub mod flags;
pub mod model;

pub use binary::{deserialize_blob, serialize_signed, transaction_hash, BinaryError, ParsedBlob};
pub use builder::{build, AccountState, IntentKind, Reserves, TxIntent, FEE_DROPS, LEDGER_WINDOW};
pub use error::ValidationError;
pub use flags::{OfferFlags, TF_FULLY_CANONICAL_SIG};
pub use model::{TransactionType, UnsignedTransaction};
