//! Abstract storage traits for the wallet.
//!
//! Every backend (platform keychain-adjacent stores, in-memory for testing)
//! implements these traits. The rest of the codebase depends only on the
//! traits. Records are replaced whole: no partial updates, no merge logic in
//! the store.

pub mod error;
pub mod memory;
pub mod offer;
pub mod wallet;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use offer::OfferStore;
pub use wallet::{WalletKind, WalletRecord, WalletStore};
