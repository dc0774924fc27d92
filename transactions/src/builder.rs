//! Transaction builder: user intent + live account state → unsigned
//! transaction.
//!
//! All input validation happens here; nothing invalid reaches the codec or
//! the wire. The builder never partially constructs a transaction.

use crate::error::ValidationError;
use crate::flags::{OfferFlags, TF_FULLY_CANONICAL_SIG};
use crate::model::{TransactionType, UnsignedTransaction};
use airlock_types::{Address, Amount, Drops, IssuedAmount, RippleTime};
use tracing::debug;

/// Fixed network fee in drops. No dynamic fee-market bidding.
pub const FEE_DROPS: u64 = 12;

/// Ledger-index expiry margin: a transaction not validated within this many
/// ledgers of build time is rejected by the network, bounding how long a
/// pending signature request stays live.
pub const LEDGER_WINDOW: u32 = 1000;

/// Live account state, fetched from the ledger immediately before building.
#[derive(Clone, Copy, Debug)]
pub struct AccountState {
    pub sequence: u32,
    pub balance: Drops,
    pub owner_count: u32,
    /// The node's current ledger index.
    pub ledger_index: u32,
}

/// Network reserve parameters, fetched from `server_state`.
#[derive(Clone, Copy, Debug)]
pub struct Reserves {
    pub base: Drops,
    pub increment: Drops,
}

impl Reserves {
    /// Drops locked for an account with the given owner count.
    pub fn required(&self, owner_count: u32) -> Drops {
        Drops::new(
            self.base
                .raw()
                .saturating_add(self.increment.raw().saturating_mul(u64::from(owner_count))),
        )
    }
}

/// What the user asked for.
#[derive(Clone, Debug)]
pub struct TxIntent {
    pub account: Address,
    /// Hex public key of the signing device, from the imported account QR.
    pub signing_pub_key: String,
    pub kind: IntentKind,
}

#[derive(Clone, Debug)]
pub enum IntentKind {
    Payment {
        destination: Address,
        amount: Amount,
        destination_tag: Option<u32>,
    },
    TrustSet {
        limit: IssuedAmount,
    },
    OfferCreate {
        taker_gets: Amount,
        taker_pays: Amount,
        flags: OfferFlags,
        /// Expiry as days from now; converted to the ledger epoch.
        expiration_days: Option<u32>,
        /// Replace an existing offer atomically.
        replace_offer_sequence: Option<u32>,
    },
    OfferCancel {
        offer_sequence: u32,
    },
}

/// Build an unsigned transaction from intent and account state.
///
/// `now_unix` is threaded in rather than read from the system clock so tests
/// and retries are deterministic.
pub fn build(
    intent: &TxIntent,
    state: &AccountState,
    reserves: &Reserves,
    now_unix: u64,
) -> Result<UnsignedTransaction, ValidationError> {
    let mut tx = match &intent.kind {
        IntentKind::Payment {
            destination,
            amount,
            destination_tag,
        } => {
            validate_amount(amount, "Amount")?;
            if destination == &intent.account {
                return Err(ValidationError::SelfPayment);
            }
            if let Amount::Xrp(drops) = amount {
                check_spendable(*drops, state, reserves)?;
            }
            let mut tx = common(intent, state, TransactionType::Payment, TF_FULLY_CANONICAL_SIG);
            tx.amount = Some(amount.clone());
            tx.destination = Some(destination.clone());
            tx.destination_tag = *destination_tag;
            tx
        }
        IntentKind::TrustSet { limit } => {
            limit
                .validate()
                .map_err(|source| ValidationError::Amount {
                    field: "LimitAmount",
                    source,
                })?;
            let mut tx = common(intent, state, TransactionType::TrustSet, TF_FULLY_CANONICAL_SIG);
            tx.limit_amount = Some(limit.clone());
            tx
        }
        IntentKind::OfferCreate {
            taker_gets,
            taker_pays,
            flags,
            expiration_days,
            replace_offer_sequence,
        } => {
            validate_amount(taker_gets, "TakerGets")?;
            validate_amount(taker_pays, "TakerPays")?;
            if let Some(days) = expiration_days {
                if *days == 0 {
                    return Err(ValidationError::BadExpiration);
                }
            }
            if let Some(seq) = replace_offer_sequence {
                if *seq == 0 {
                    return Err(ValidationError::BadOfferSequence);
                }
            }
            let mut tx = common(intent, state, TransactionType::OfferCreate, flags.bits());
            tx.taker_gets = Some(taker_gets.clone());
            tx.taker_pays = Some(taker_pays.clone());
            tx.expiration =
                expiration_days.map(|days| RippleTime::days_from(now_unix, days).as_secs());
            tx.offer_sequence = *replace_offer_sequence;
            tx
        }
        IntentKind::OfferCancel { offer_sequence } => {
            if *offer_sequence == 0 {
                return Err(ValidationError::BadOfferSequence);
            }
            let mut tx =
                common(intent, state, TransactionType::OfferCancel, TF_FULLY_CANONICAL_SIG);
            tx.offer_sequence = Some(*offer_sequence);
            tx
        }
    };

    tx.signing_pub_key = intent.signing_pub_key.to_uppercase();
    debug!(
        tx_type = ?tx.transaction_type,
        sequence = tx.sequence,
        last_ledger = tx.last_ledger_sequence,
        "built unsigned transaction"
    );
    Ok(tx)
}

fn common(
    intent: &TxIntent,
    state: &AccountState,
    ty: TransactionType,
    flags: u32,
) -> UnsignedTransaction {
    UnsignedTransaction::common(
        ty,
        intent.account.clone(),
        Drops::new(FEE_DROPS),
        state.sequence,
        state.ledger_index + LEDGER_WINDOW,
        flags,
        intent.signing_pub_key.clone(),
    )
}

/// Positive, finite, non-zero; XRP sides of an offer or payment must not
/// have rounded to zero drops upstream.
fn validate_amount(amount: &Amount, field: &'static str) -> Result<(), ValidationError> {
    match amount {
        Amount::Xrp(drops) => {
            if drops.is_zero() {
                return Err(ValidationError::RoundsToZero { field });
            }
        }
        Amount::Issued(issued) => {
            issued
                .validate()
                .map_err(|source| ValidationError::Amount { field, source })?;
        }
    }
    Ok(())
}

fn check_spendable(
    amount: Drops,
    state: &AccountState,
    reserves: &Reserves,
) -> Result<(), ValidationError> {
    let locked = reserves.required(state.owner_count);
    let spendable = state.balance.saturating_sub(locked);
    let needed = amount
        .checked_add(Drops::new(FEE_DROPS))
        .unwrap_or(Drops::new(u64::MAX));
    if needed > spendable {
        return Err(ValidationError::InsufficientSpendable {
            needed: needed.raw(),
            available: spendable.raw(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
    const DEST: &str = "rrrrrrrrrrrrrrrrrrrrrhoLvTp";
    const ISSUER: &str = "rvYAfWj5gh67oV6fW32ZzP3Aw4Eubs59B";

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn state() -> AccountState {
        AccountState {
            sequence: 5,
            balance: Drops::new(20_000_000),
            owner_count: 0,
            ledger_index: 80_000_000,
        }
    }

    fn reserves() -> Reserves {
        Reserves {
            base: Drops::new(10_000_000),
            increment: Drops::new(2_000_000),
        }
    }

    fn payment_intent(amount: Amount) -> TxIntent {
        TxIntent {
            account: addr(SENDER),
            signing_pub_key: "ed0279f".into(),
            kind: IntentKind::Payment {
                destination: addr(DEST),
                amount,
                destination_tag: None,
            },
        }
    }

    #[test]
    fn one_xrp_payment_scenario() {
        // Sequence=5, Balance=20000000 drops, 1 XRP payment.
        let intent = payment_intent(Amount::Xrp(Drops::from_xrp_str("1").unwrap()));
        let tx = build(&intent, &state(), &reserves(), 1_700_000_000).unwrap();

        assert_eq!(tx.amount, Some(Amount::Xrp(Drops::new(1_000_000))));
        assert_eq!(tx.fee, Drops::new(12));
        assert_eq!(tx.sequence, 5);
        assert_eq!(tx.last_ledger_sequence, 80_000_000 + LEDGER_WINDOW);
        assert_eq!(tx.flags, Some(TF_FULLY_CANONICAL_SIG));
        assert_eq!(tx.signing_pub_key, "ED0279F");

        let json: serde_json::Value =
            serde_json::from_str(&tx.to_field_map().unwrap()).unwrap();
        assert_eq!(json["Amount"], "1000000");
        assert_eq!(json["Fee"], "12");
        assert_eq!(json["Sequence"], 5);
    }

    #[test]
    fn payment_exceeding_spendable_rejected() {
        // 20 XRP balance minus 10 XRP base reserve leaves 10 XRP spendable.
        let intent = payment_intent(Amount::Xrp(Drops::new(15_000_000)));
        let err = build(&intent, &state(), &reserves(), 0).unwrap_err();
        assert!(matches!(err, ValidationError::InsufficientSpendable { .. }));
    }

    #[test]
    fn reserve_scales_with_owner_count() {
        let mut st = state();
        st.owner_count = 3; // 10 + 3*2 = 16 XRP locked, 4 XRP spendable
        let intent = payment_intent(Amount::Xrp(Drops::new(5_000_000)));
        assert!(build(&intent, &st, &reserves(), 0).is_err());
        let intent = payment_intent(Amount::Xrp(Drops::new(3_000_000)));
        assert!(build(&intent, &st, &reserves(), 0).is_ok());
    }

    #[test]
    fn zero_drop_amount_rejected() {
        let intent = payment_intent(Amount::Xrp(Drops::ZERO));
        assert_eq!(
            build(&intent, &state(), &reserves(), 0),
            Err(ValidationError::RoundsToZero { field: "Amount" })
        );
    }

    #[test]
    fn self_payment_rejected() {
        let intent = TxIntent {
            account: addr(SENDER),
            signing_pub_key: String::new(),
            kind: IntentKind::Payment {
                destination: addr(SENDER),
                amount: Amount::Xrp(Drops::new(1)),
                destination_tag: None,
            },
        };
        assert_eq!(
            build(&intent, &state(), &reserves(), 0),
            Err(ValidationError::SelfPayment)
        );
    }

    #[test]
    fn offer_expiration_uses_ledger_epoch() {
        let now_unix = airlock_types::time::RIPPLE_EPOCH_OFFSET + 1_000;
        let intent = TxIntent {
            account: addr(SENDER),
            signing_pub_key: String::new(),
            kind: IntentKind::OfferCreate {
                taker_gets: Amount::Xrp(Drops::new(1_000_000)),
                taker_pays: Amount::Issued(IssuedAmount {
                    currency: airlock_types::CurrencyCode::parse("USD").unwrap(),
                    issuer: addr(ISSUER),
                    value: "10".into(),
                }),
                flags: OfferFlags {
                    sell: true,
                    ..Default::default()
                },
                expiration_days: Some(2),
                replace_offer_sequence: None,
            },
        };
        let tx = build(&intent, &state(), &reserves(), now_unix).unwrap();
        assert_eq!(tx.expiration, Some(1_000 + 2 * 86_400));
        assert_eq!(
            tx.flags,
            Some(TF_FULLY_CANONICAL_SIG | crate::flags::TF_SELL)
        );
    }

    #[test]
    fn offer_cancel_requires_sequence() {
        let intent = TxIntent {
            account: addr(SENDER),
            signing_pub_key: String::new(),
            kind: IntentKind::OfferCancel { offer_sequence: 0 },
        };
        assert_eq!(
            build(&intent, &state(), &reserves(), 0),
            Err(ValidationError::BadOfferSequence)
        );
    }

    #[test]
    fn trustset_carries_limit() {
        let intent = TxIntent {
            account: addr(SENDER),
            signing_pub_key: String::new(),
            kind: IntentKind::TrustSet {
                limit: IssuedAmount {
                    currency: airlock_types::CurrencyCode::parse("USD").unwrap(),
                    issuer: addr(ISSUER),
                    value: "1000000".into(),
                },
            },
        };
        let tx = build(&intent, &state(), &reserves(), 0).unwrap();
        assert_eq!(tx.transaction_type, TransactionType::TrustSet);
        assert!(tx.limit_amount.is_some());
        assert!(tx.amount.is_none());
    }
}
