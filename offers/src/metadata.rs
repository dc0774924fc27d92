//! Fill extraction from transaction metadata.
//!
//! Validated transactions carry metadata listing every ledger entry they
//! touched. When a transaction consumes part of one of our offers, the
//! metadata shows the Offer node with `PreviousFields` holding the
//! pre-transaction TakerGets/TakerPays and `FinalFields` the remainder; the
//! difference is what the taker got and paid.

use crate::model::{OfferFill, StoredOffer};
use airlock_types::{Amount, Drops, IssuedAmount};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    #[error("metadata has no AffectedNodes array")]
    NoAffectedNodes,
    #[error("invalid amount in metadata: {0}")]
    BadAmount(String),
    #[error("offer delta mixes currencies")]
    CurrencyMismatch,
}

/// Scan transaction metadata for a fill on the given offer and append it.
///
/// Returns `true` if a new fill was recorded. A transaction already present
/// in the fill list is skipped: re-processing the same validated
/// transaction must not double-count.
pub fn record_fill_from_metadata(
    offer: &mut StoredOffer,
    tx_hash: &str,
    timestamp: u32,
    ledger_index: u32,
    metadata: &Value,
) -> Result<bool, MetadataError> {
    if offer.has_fill(tx_hash) {
        debug!(tx_hash, "fill already recorded");
        return Ok(false);
    }

    let nodes = metadata
        .get("AffectedNodes")
        .and_then(Value::as_array)
        .ok_or(MetadataError::NoAffectedNodes)?;

    for wrapper in nodes {
        // Consumption appears as a ModifiedNode (partial) or DeletedNode
        // (final crumb) on the Offer entry.
        let Some(node) = wrapper
            .get("ModifiedNode")
            .or_else(|| wrapper.get("DeletedNode"))
        else {
            continue;
        };
        if node.get("LedgerEntryType").and_then(Value::as_str) != Some("Offer") {
            continue;
        }
        let Some(fields) = node.get("FinalFields") else {
            continue;
        };
        let matches_offer = fields.get("Account").and_then(Value::as_str)
            == Some(offer.wallet_address.as_str())
            && fields.get("Sequence").and_then(Value::as_u64) == Some(u64::from(offer.sequence));
        if !matches_offer {
            continue;
        }

        let previous = node.get("PreviousFields");
        let taker_got = field_delta(previous, fields, "TakerGets", wrapper)?;
        let taker_paid = field_delta(previous, fields, "TakerPays", wrapper)?;
        let (Some(taker_got), Some(taker_paid)) = (taker_got, taker_paid) else {
            // Touched but no amount movement (e.g. a bookkeeping change).
            continue;
        };

        let fill = OfferFill::new(tx_hash, timestamp, ledger_index, taker_got, taker_paid);
        debug!(
            tx_hash,
            sequence = offer.sequence,
            taker_got = %fill.taker_got,
            taker_paid = %fill.taker_paid,
            "recording offer fill"
        );
        offer.fills.push(fill);
        return Ok(true);
    }

    Ok(false)
}

/// The amount consumed from one field: previous minus final when the field
/// changed, the whole final value when the node was deleted without a
/// recorded previous value, nothing otherwise.
fn field_delta(
    previous: Option<&Value>,
    final_fields: &Value,
    field: &str,
    wrapper: &Value,
) -> Result<Option<Amount>, MetadataError> {
    let final_amount = parse_amount(final_fields.get(field))?;
    match previous.and_then(|p| p.get(field)) {
        Some(prev) => {
            let prev_amount = parse_amount(Some(prev))?;
            match (prev_amount, final_amount) {
                (Some(prev), Some(fin)) => amount_sub(&prev, &fin).map(Some),
                _ => Ok(None),
            }
        }
        None if wrapper.get("DeletedNode").is_some() => Ok(final_amount),
        None => Ok(None),
    }
}

fn parse_amount(value: Option<&Value>) -> Result<Option<Amount>, MetadataError> {
    match value {
        None => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|_| MetadataError::BadAmount(v.to_string())),
    }
}

fn amount_sub(prev: &Amount, fin: &Amount) -> Result<Amount, MetadataError> {
    match (prev, fin) {
        (Amount::Xrp(p), Amount::Xrp(f)) => {
            let delta = p.checked_sub(*f).unwrap_or_else(|| {
                warn!(prev = p.raw(), fin = f.raw(), "amount grew across fill; clamping");
                Drops::new(0)
            });
            Ok(Amount::Xrp(delta))
        }
        (Amount::Issued(p), Amount::Issued(f))
            if p.currency == f.currency && p.issuer == f.issuer =>
        {
            let prev_v: f64 = p
                .value
                .parse()
                .map_err(|_| MetadataError::BadAmount(p.value.clone()))?;
            let fin_v: f64 = f
                .value
                .parse()
                .map_err(|_| MetadataError::BadAmount(f.value.clone()))?;
            Ok(Amount::Issued(IssuedAmount {
                currency: p.currency.clone(),
                issuer: p.issuer.clone(),
                value: format!("{}", (prev_v - fin_v).max(0.0)),
            }))
        }
        _ => Err(MetadataError::CurrencyMismatch),
    }
}
