//! Locally stored DEX offers and their ledger reconciliation.
//!
//! The wallet records every offer it places. The ledger then consumes those
//! offers piecemeal through other people's transactions, so local state is
//! only ever a lower bound: reconciliation compares the stored original
//! amounts against the live Offer ledger entry (or its absence) and appends
//! fills discovered in transaction metadata.

pub mod metadata;
pub mod model;
pub mod reconcile;

pub use metadata::{record_fill_from_metadata, MetadataError};
pub use model::{OfferFill, StoredOffer};
pub use reconcile::{reconcile, LedgerOffer, OfferStatus, OfferWithStatus};
