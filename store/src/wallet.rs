//! Wallet record storage trait.

use crate::StoreError;
use airlock_types::{Address, NetworkId};
use serde::{Deserialize, Serialize};

/// Whether the wallet can produce signatures (through the paired device) or
/// only observe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletKind {
    /// Paired with a hardware signer; the record never holds key material.
    Signing,
    WatchOnly,
}

/// One tracked wallet on one network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub address: Address,
    pub network: NetworkId,
    pub kind: WalletKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Trait for wallet record storage.
///
/// `put_wallet` replaces the whole record for (address, network); there is
/// no field-level update.
pub trait WalletStore {
    fn get_wallet(
        &self,
        address: &Address,
        network: NetworkId,
    ) -> Result<WalletRecord, StoreError>;
    fn put_wallet(&self, record: &WalletRecord) -> Result<(), StoreError>;
    fn delete_wallet(&self, address: &Address, network: NetworkId) -> Result<(), StoreError>;
    fn iter_wallets(&self, network: NetworkId) -> Result<Vec<WalletRecord>, StoreError>;

    fn wallet_exists(&self, address: &Address, network: NetworkId) -> Result<bool, StoreError> {
        match self.get_wallet(address, network) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
