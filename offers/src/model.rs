//! Persistent offer records.

use airlock_types::{Address, Amount, NetworkId};
use serde::{Deserialize, Serialize};

/// One locally placed DEX offer.
///
/// Created when the OfferCreate confirms; afterwards the only permitted
/// mutation is appending fills. Keyed by (wallet, network, sequence), the
/// same triple the ledger uses to identify the Offer entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredOffer {
    pub sequence: u32,
    pub wallet_address: Address,
    pub network: NetworkId,
    pub original_taker_gets: Amount,
    pub original_taker_pays: Amount,
    /// Ripple-epoch seconds at creation.
    pub created_at: u32,
    pub created_tx_hash: String,
    pub created_ledger_index: u32,
    /// Fills in discovery order. Append-only, deduplicated by `tx_hash`.
    pub fills: Vec<OfferFill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
}

impl StoredOffer {
    pub fn has_fill(&self, tx_hash: &str) -> bool {
        self.fills.iter().any(|f| f.tx_hash == tx_hash)
    }

    /// Sum of all recorded taker-got amounts, in the offer's gets unit.
    pub fn total_filled(&self) -> f64 {
        self.fills.iter().map(|f| f.taker_got.magnitude()).sum()
    }
}

/// One partial (or final) execution of an offer, derived from transaction
/// metadata deltas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfferFill {
    pub tx_hash: String,
    /// Ripple-epoch seconds of the executing ledger's close.
    pub timestamp: u32,
    pub ledger_index: u32,
    /// What the taker received, i.e. how much of our TakerGets was consumed.
    pub taker_got: Amount,
    /// What the taker paid us against it.
    pub taker_paid: Amount,
    /// taker_paid per unit taker_got, when both magnitudes are nonzero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_price: Option<f64>,
}

impl OfferFill {
    pub fn new(
        tx_hash: impl Into<String>,
        timestamp: u32,
        ledger_index: u32,
        taker_got: Amount,
        taker_paid: Amount,
    ) -> Self {
        let got = taker_got.magnitude();
        let paid = taker_paid.magnitude();
        let execution_price = (got > 0.0 && paid > 0.0).then(|| paid / got);
        Self {
            tx_hash: tx_hash.into(),
            timestamp,
            ledger_index,
            taker_got,
            taker_paid,
            execution_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airlock_types::Drops;

    fn offer_with_fills(fills: Vec<OfferFill>) -> StoredOffer {
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

    #[test]
    fn fill_dedup_key_is_tx_hash() {
        let offer = offer_with_fills(vec![OfferFill::new(
            "AA11",
            1,
            101,
            Amount::Xrp(Drops::new(1_000_000)),
            Amount::Xrp(Drops::new(500_000)),
        )]);
        assert!(offer.has_fill("AA11"));
        assert!(!offer.has_fill("BB22"));
    }

    #[test]
    fn execution_price_is_paid_per_got() {
        let fill = OfferFill::new(
            "AA11",
            1,
            101,
            Amount::Xrp(Drops::new(2_000_000)),
            Amount::Xrp(Drops::new(1_000_000)),
        );
        assert_eq!(fill.execution_price, Some(0.5));
    }

    #[test]
    fn zero_leg_has_no_price() {
        let fill = OfferFill::new(
            "AA11",
            1,
            101,
            Amount::Xrp(Drops::new(0)),
            Amount::Xrp(Drops::new(1)),
        );
        assert_eq!(fill.execution_price, None);
    }
}
