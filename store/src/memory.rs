//! In-memory store backend.

use crate::error::StoreError;
use crate::offer::OfferStore;
use crate::wallet::{WalletRecord, WalletStore};
use airlock_offers::StoredOffer;
use airlock_types::{Address, NetworkId};
use std::collections::HashMap;
use std::sync::RwLock;

type WalletKey = (String, NetworkId);
type OfferKey = (String, NetworkId, u32);

/// Thread-safe in-memory implementation of every store trait. Used by tests
/// and as the session-scoped cache in front of platform persistence.
#[derive(Default)]
pub struct MemoryStore {
    wallets: RwLock<HashMap<WalletKey, WalletRecord>>,
    offers: RwLock<HashMap<OfferKey, StoredOffer>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryStore {
    fn get_wallet(
        &self,
        address: &Address,
        network: NetworkId,
    ) -> Result<WalletRecord, StoreError> {
        self.wallets
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .get(&(address.as_str().to_string(), network))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{address}@{network}")))
    }

    fn put_wallet(&self, record: &WalletRecord) -> Result<(), StoreError> {
        self.wallets
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .insert(
                (record.address.as_str().to_string(), record.network),
                record.clone(),
            );
        Ok(())
    }

    fn delete_wallet(&self, address: &Address, network: NetworkId) -> Result<(), StoreError> {
        self.wallets
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .remove(&(address.as_str().to_string(), network))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{address}@{network}")))
    }

    fn iter_wallets(&self, network: NetworkId) -> Result<Vec<WalletRecord>, StoreError> {
        let mut records: Vec<WalletRecord> = self
            .wallets
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .values()
            .filter(|r| r.network == network)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.address.as_str().cmp(b.address.as_str()));
        Ok(records)
    }
}

impl OfferStore for MemoryStore {
    fn get_offer(
        &self,
        wallet: &Address,
        network: NetworkId,
        sequence: u32,
    ) -> Result<StoredOffer, StoreError> {
        self.offers
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .get(&(wallet.as_str().to_string(), network, sequence))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{wallet}@{network}#{sequence}")))
    }

    fn put_offer(&self, offer: &StoredOffer) -> Result<(), StoreError> {
        self.offers
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .insert(
                (
                    offer.wallet_address.as_str().to_string(),
                    offer.network,
                    offer.sequence,
                ),
                offer.clone(),
            );
        Ok(())
    }

    fn delete_offer(
        &self,
        wallet: &Address,
        network: NetworkId,
        sequence: u32,
    ) -> Result<(), StoreError> {
        self.offers
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .remove(&(wallet.as_str().to_string(), network, sequence))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{wallet}@{network}#{sequence}")))
    }

    fn iter_offers(
        &self,
        wallet: &Address,
        network: NetworkId,
    ) -> Result<Vec<StoredOffer>, StoreError> {
        let mut offers: Vec<StoredOffer> = self
            .offers
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .values()
            .filter(|o| o.wallet_address == *wallet && o.network == network)
            .cloned()
            .collect();
        offers.sort_by_key(|o| o.sequence);
        Ok(offers)
    }
}
