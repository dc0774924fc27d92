//! The unsigned transaction field map.
//!
//! Field names and value shapes match the ledger's JSON convention exactly:
//! this struct's serde form is the byte-for-byte payload the hardware device
//! receives inside the QR, so renames here are wire-format changes.

use airlock_types::{Address, Amount, Drops, IssuedAmount};
use serde::{Deserialize, Serialize};

/// Transaction type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Payment,
    TrustSet,
    OfferCreate,
    OfferCancel,
}

impl TransactionType {
    /// The numeric type code used in the binary form.
    pub fn code(&self) -> u16 {
        match self {
            Self::Payment => 0,
            Self::OfferCreate => 7,
            Self::OfferCancel => 8,
            Self::TrustSet => 20,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Payment),
            7 => Some(Self::OfferCreate),
            8 => Some(Self::OfferCancel),
            20 => Some(Self::TrustSet),
            _ => None,
        }
    }
}

/// An unsigned XRPL transaction.
///
/// Immutable once handed to the codec: the device signs these exact field
/// values, and the signature is void if any of them change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnsignedTransaction {
    pub transaction_type: TransactionType,
    pub account: Address,
    pub fee: Drops,
    pub sequence: u32,
    pub last_ledger_sequence: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    /// Hex-encoded public key of the signing device. Empty until the wallet
    /// has imported the device's account QR.
    pub signing_pub_key: String,

    // Payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_tag: Option<u32>,

    // TrustSet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_amount: Option<IssuedAmount>,

    // OfferCreate / OfferCancel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taker_gets: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taker_pays: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_sequence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u32>,
}

impl UnsignedTransaction {
    /// Skeleton with only the common fields set.
    pub(crate) fn common(
        transaction_type: TransactionType,
        account: Address,
        fee: Drops,
        sequence: u32,
        last_ledger_sequence: u32,
        flags: u32,
        signing_pub_key: String,
    ) -> Self {
        Self {
            transaction_type,
            account,
            fee,
            sequence,
            last_ledger_sequence,
            flags: Some(flags),
            signing_pub_key,
            amount: None,
            destination: None,
            destination_tag: None,
            limit_amount: None,
            taker_gets: None,
            taker_pays: None,
            offer_sequence: None,
            expiration: None,
        }
    }

    /// The JSON field map the device consumes.
    pub fn to_field_map(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
