//! Offer status against the live ledger.

use crate::model::StoredOffer;
use airlock_types::Amount;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The live Offer ledger entry's remaining amounts, when the entry still
/// exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerOffer {
    pub taker_gets: Amount,
    pub taker_pays: Amount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferStatus {
    Open,
    PartiallyFilled,
    FullyFilled,
    CancelledOrExpired,
}

/// A stored offer annotated with its reconciled status.
#[derive(Clone, Debug, PartialEq)]
pub struct OfferWithStatus {
    pub offer: StoredOffer,
    pub status: OfferStatus,
    /// Fraction of the original TakerGets already consumed, in [0, 1].
    pub fill_percentage: f64,
}

/// Tolerance for "the fills add up to the original amount": issued-currency
/// arithmetic passes through decimal strings, so exact equality is not
/// available.
const FILL_EPSILON: f64 = 1e-6;

/// Reconcile a stored offer against the live ledger entry, if any.
///
/// A live entry yields a direct fill percentage from the remaining
/// TakerGets. A missing entry is ambiguous: the offer was either consumed
/// entirely or cancelled/expired, and only the recorded fills can tell the
/// two apart.
pub fn reconcile(offer: StoredOffer, ledger_entry: Option<&LedgerOffer>) -> OfferWithStatus {
    let original = offer.original_taker_gets.magnitude();

    let (status, fill_percentage) = match ledger_entry {
        Some(entry) => {
            let remaining = entry.taker_gets.magnitude();
            let pct = if original > 0.0 {
                (1.0 - remaining / original).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let status = if pct <= FILL_EPSILON {
                OfferStatus::Open
            } else {
                OfferStatus::PartiallyFilled
            };
            (status, pct)
        }
        None => {
            let filled = offer.total_filled();
            if original > 0.0 && filled >= original * (1.0 - FILL_EPSILON) {
                (OfferStatus::FullyFilled, 1.0)
            } else {
                let pct = if original > 0.0 {
                    (filled / original).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                (OfferStatus::CancelledOrExpired, pct)
            }
        }
    };

    debug!(
        sequence = offer.sequence,
        ?status,
        fill_percentage,
        "offer reconciled"
    );
    OfferWithStatus {
        offer,
        status,
        fill_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OfferFill;
    use airlock_types::{Address, Drops, NetworkId};

    fn stored(fills: Vec<OfferFill>) -> StoredOffer {
        StoredOffer {
            sequence: 7,
            wallet_address: Address::parse("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh").unwrap(),
            network: NetworkId::Testnet,
            original_taker_gets: Amount::Xrp(Drops::new(10_000_000)),
            original_taker_pays: Amount::Xrp(Drops::new(5_000_000)),
            created_at: 0,
            created_tx_hash: "CREATE".into(),
            created_ledger_index: 100,
            fills,
            expiration: None,
            flags: None,
        }
    }

    fn fill(hash: &str, got_drops: u64) -> OfferFill {
        OfferFill::new(
            hash,
            1,
            101,
            Amount::Xrp(Drops::new(got_drops)),
            Amount::Xrp(Drops::new(got_drops / 2)),
        )
    }

    #[test]
    fn untouched_live_entry_is_open() {
        let entry = LedgerOffer {
            taker_gets: Amount::Xrp(Drops::new(10_000_000)),
            taker_pays: Amount::Xrp(Drops::new(5_000_000)),
        };
        let result = reconcile(stored(vec![]), Some(&entry));
        assert_eq!(result.status, OfferStatus::Open);
        assert_eq!(result.fill_percentage, 0.0);
    }

    #[test]
    fn half_consumed_live_entry_is_partially_filled() {
        let entry = LedgerOffer {
            taker_gets: Amount::Xrp(Drops::new(5_000_000)),
            taker_pays: Amount::Xrp(Drops::new(2_500_000)),
        };
        let result = reconcile(stored(vec![]), Some(&entry));
        assert_eq!(result.status, OfferStatus::PartiallyFilled);
        assert!((result.fill_percentage - 0.5).abs() < 1e-9);
    }

    #[test]
    fn missing_entry_with_full_fills_is_fully_filled() {
        let fills = vec![fill("AA", 4_000_000), fill("BB", 6_000_000)];
        let result = reconcile(stored(fills), None);
        assert_eq!(result.status, OfferStatus::FullyFilled);
        assert_eq!(result.fill_percentage, 1.0);
    }

    #[test]
    fn missing_entry_with_partial_fills_is_cancelled_or_expired() {
        let result = reconcile(stored(vec![fill("AA", 3_000_000)]), None);
        assert_eq!(result.status, OfferStatus::CancelledOrExpired);
        assert!((result.fill_percentage - 0.3).abs() < 1e-9);
    }

    #[test]
    fn missing_entry_with_no_fills_is_cancelled_or_expired() {
        let result = reconcile(stored(vec![]), None);
        assert_eq!(result.status, OfferStatus::CancelledOrExpired);
        assert_eq!(result.fill_percentage, 0.0);
    }
}
