//! Stored-offer storage trait.

use crate::StoreError;
use airlock_offers::StoredOffer;
use airlock_types::{Address, NetworkId};

/// Trait for stored-offer persistence.
///
/// Offers are keyed by (wallet, network, sequence). Appending a fill goes
/// through read-modify-`put_offer`: the store replaces the whole record and
/// never interprets the fill list.
pub trait OfferStore {
    fn get_offer(
        &self,
        wallet: &Address,
        network: NetworkId,
        sequence: u32,
    ) -> Result<StoredOffer, StoreError>;
    fn put_offer(&self, offer: &StoredOffer) -> Result<(), StoreError>;
    fn delete_offer(
        &self,
        wallet: &Address,
        network: NetworkId,
        sequence: u32,
    ) -> Result<(), StoreError>;
    /// All stored offers for one wallet on one network, ordered by sequence.
    fn iter_offers(
        &self,
        wallet: &Address,
        network: NetworkId,
    ) -> Result<Vec<StoredOffer>, StoreError>;
}
