//! Canonical XRPL binary serialization for the field subset the wallet
//! builds.
//!
//! Used in two places: merging a bare device signature into the pending
//! transaction to produce a submittable blob, and deserializing a scanned
//! full blob to verify it matches the pending transaction before submission.
//!
//! Fields are emitted in canonical order — sorted by (type code, field
//! code) — with single- or two-byte field headers, VL-prefixed blobs, and
//! the ledger's native/issued amount forms.

use crate::model::{TransactionType, UnsignedTransaction};
use airlock_types::{Address, Amount, IssuedAmount};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BinaryError {
    #[error("signing public key is missing; import the device account first")]
    MissingSigningKey,

    #[error("field value is not valid hex: {0}")]
    BadHex(String),

    #[error("issued amount value is not a valid decimal: {0}")]
    BadIssuedValue(String),

    #[error("issued amount out of representable range: {0}")]
    ValueRange(String),

    #[error("issued amount has more than 16 significant digits: {0}")]
    Precision(String),

    #[error("blob truncated while reading field {0}")]
    Truncated(&'static str),

    #[error("unknown field in blob: type {type_code}, field {field_code}")]
    UnknownField { type_code: u8, field_code: u8 },

    #[error("unknown transaction type code {0}")]
    UnknownTransactionType(u16),

    #[error("blob length field is malformed")]
    BadLength,
}

// Serialization type codes.
const ST_UINT16: u8 = 1;
const ST_UINT32: u8 = 2;
const ST_AMOUNT: u8 = 6;
const ST_BLOB: u8 = 7;
const ST_ACCOUNT: u8 = 8;

// Field codes within each type.
const FLD_TRANSACTION_TYPE: u8 = 2; // UInt16
const FLD_FLAGS: u8 = 2; // UInt32
const FLD_SEQUENCE: u8 = 4;
const FLD_EXPIRATION: u8 = 10;
const FLD_DESTINATION_TAG: u8 = 14;
const FLD_OFFER_SEQUENCE: u8 = 25;
const FLD_LAST_LEDGER_SEQUENCE: u8 = 27;
const FLD_AMOUNT: u8 = 1; // Amount
const FLD_LIMIT_AMOUNT: u8 = 3;
const FLD_TAKER_PAYS: u8 = 4;
const FLD_TAKER_GETS: u8 = 5;
const FLD_FEE: u8 = 8;
const FLD_SIGNING_PUB_KEY: u8 = 3; // Blob
const FLD_TXN_SIGNATURE: u8 = 4;
const FLD_ACCOUNT: u8 = 1; // AccountID
const FLD_DESTINATION: u8 = 3;

/// Positive/native bit layout for 64-bit drops amounts.
const NATIVE_POSITIVE_BIT: u64 = 0x4000_0000_0000_0000;
/// Not-native marker for issued amounts.
const ISSUED_BIT: u64 = 0x8000_0000_0000_0000;

/// Serialize the transaction with the device's signature merged in as
/// `TxnSignature`, producing the canonical signed blob.
pub fn serialize_signed(
    tx: &UnsignedTransaction,
    txn_signature: &[u8],
) -> Result<Vec<u8>, BinaryError> {
    if tx.signing_pub_key.is_empty() {
        return Err(BinaryError::MissingSigningKey);
    }
    let pub_key = hex::decode(&tx.signing_pub_key)
        .map_err(|_| BinaryError::BadHex(tx.signing_pub_key.clone()))?;

    let mut out = Vec::with_capacity(256);

    // Canonical (type, field) order over our field subset.
    field_header(&mut out, ST_UINT16, FLD_TRANSACTION_TYPE);
    out.extend_from_slice(&tx.transaction_type.code().to_be_bytes());

    if let Some(flags) = tx.flags {
        push_u32(&mut out, FLD_FLAGS, flags);
    }
    push_u32(&mut out, FLD_SEQUENCE, tx.sequence);
    if let Some(expiration) = tx.expiration {
        push_u32(&mut out, FLD_EXPIRATION, expiration);
    }
    if let Some(tag) = tx.destination_tag {
        push_u32(&mut out, FLD_DESTINATION_TAG, tag);
    }
    if let Some(seq) = tx.offer_sequence {
        push_u32(&mut out, FLD_OFFER_SEQUENCE, seq);
    }
    push_u32(&mut out, FLD_LAST_LEDGER_SEQUENCE, tx.last_ledger_sequence);

    if let Some(amount) = &tx.amount {
        push_amount(&mut out, FLD_AMOUNT, amount)?;
    }
    if let Some(limit) = &tx.limit_amount {
        push_amount(&mut out, FLD_LIMIT_AMOUNT, &Amount::Issued(limit.clone()))?;
    }
    if let Some(pays) = &tx.taker_pays {
        push_amount(&mut out, FLD_TAKER_PAYS, pays)?;
    }
    if let Some(gets) = &tx.taker_gets {
        push_amount(&mut out, FLD_TAKER_GETS, gets)?;
    }
    push_amount(&mut out, FLD_FEE, &Amount::Xrp(tx.fee))?;

    push_blob(&mut out, FLD_SIGNING_PUB_KEY, &pub_key);
    push_blob(&mut out, FLD_TXN_SIGNATURE, txn_signature);

    push_account(&mut out, FLD_ACCOUNT, &tx.account);
    if let Some(dest) = &tx.destination {
        push_account(&mut out, FLD_DESTINATION, dest);
    }

    Ok(out)
}

fn field_header(out: &mut Vec<u8>, type_code: u8, field_code: u8) {
    if field_code < 16 {
        out.push((type_code << 4) | field_code);
    } else {
        out.push(type_code << 4);
        out.push(field_code);
    }
}

fn push_u32(out: &mut Vec<u8>, field_code: u8, value: u32) {
    field_header(out, ST_UINT32, field_code);
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_amount(out: &mut Vec<u8>, field_code: u8, amount: &Amount) -> Result<(), BinaryError> {
    field_header(out, ST_AMOUNT, field_code);
    match amount {
        Amount::Xrp(drops) => {
            out.extend_from_slice(&(NATIVE_POSITIVE_BIT | drops.raw()).to_be_bytes());
        }
        Amount::Issued(issued) => {
            out.extend_from_slice(&issued_value_bits(&issued.value)?.to_be_bytes());
            out.extend_from_slice(&issued.currency.to_bytes());
            out.extend_from_slice(&issued.issuer.account_id());
        }
    }
    Ok(())
}

fn push_blob(out: &mut Vec<u8>, field_code: u8, data: &[u8]) {
    field_header(out, ST_BLOB, field_code);
    push_vl_length(out, data.len());
    out.extend_from_slice(data);
}

fn push_account(out: &mut Vec<u8>, field_code: u8, address: &Address) {
    field_header(out, ST_ACCOUNT, field_code);
    push_vl_length(out, 20);
    out.extend_from_slice(&address.account_id());
}

/// Variable-length prefix. Our fields never exceed the two-byte form.
fn push_vl_length(out: &mut Vec<u8>, len: usize) {
    if len <= 192 {
        out.push(len as u8);
    } else {
        let adjusted = len - 193;
        out.push(193 + (adjusted >> 8) as u8);
        out.push((adjusted & 0xff) as u8);
    }
}

/// Encode an issued-currency decimal value into the 64-bit IOU form:
/// not-native bit, sign bit, exponent biased by 97, mantissa normalized to
/// `[10^15, 10^16)`.
fn issued_value_bits(value: &str) -> Result<u64, BinaryError> {
    let s = value.trim();
    let (negative, digits_part) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (whole, frac) = match digits_part.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits_part, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(BinaryError::BadIssuedValue(value.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(BinaryError::BadIssuedValue(value.to_string()));
    }

    let mut digits: String = format!("{whole}{frac}");
    let mut exponent: i32 = -(frac.len() as i32);

    // Strip leading zeros; strip trailing zeros into the exponent.
    let trimmed = digits.trim_start_matches('0').to_string();
    digits = trimmed;
    while digits.ends_with('0') {
        digits.pop();
        exponent += 1;
    }

    if digits.is_empty() {
        // Canonical zero.
        return Ok(ISSUED_BIT);
    }
    if digits.len() > 16 {
        return Err(BinaryError::Precision(value.to_string()));
    }

    let mut mantissa: u64 = digits
        .parse()
        .map_err(|_| BinaryError::BadIssuedValue(value.to_string()))?;
    while mantissa < 1_000_000_000_000_000 {
        mantissa *= 10;
        exponent -= 1;
    }

    if !(-96..=80).contains(&exponent) {
        return Err(BinaryError::ValueRange(value.to_string()));
    }

    let sign_bit = if negative { 0 } else { 1u64 << 62 };
    let exp_bits = ((exponent + 97) as u64) << 54;
    Ok(ISSUED_BIT | sign_bit | exp_bits | mantissa)
}

/// Compute the transaction hash of a signed blob: the first half of
/// SHA-512 over the signed-transaction prefix and the blob.
pub fn transaction_hash(blob: &[u8]) -> String {
    use sha2::{Digest, Sha512};
    // "TXN\0" — the single-signed transaction hash prefix.
    const PREFIX: [u8; 4] = [0x54, 0x58, 0x4E, 0x00];
    let mut hasher = Sha512::new();
    hasher.update(PREFIX);
    hasher.update(blob);
    let digest = hasher.finalize();
    hex::encode_upper(&digest[..32])
}

// ── Deserialization ─────────────────────────────────────────────────────

/// The fields recovered from a serialized blob that matter for verifying it
/// against the pending unsigned transaction.
#[derive(Clone, Debug, Default)]
pub struct ParsedBlob {
    pub transaction_type: Option<TransactionType>,
    pub flags: Option<u32>,
    pub sequence: Option<u32>,
    pub last_ledger_sequence: Option<u32>,
    /// Fee in drops.
    pub fee: Option<u64>,
    pub account: Option<Address>,
    pub destination: Option<Address>,
    pub signing_pub_key: Option<Vec<u8>>,
    pub txn_signature: Option<Vec<u8>>,
}

impl ParsedBlob {
    /// Whether this blob carries the same identity-critical fields as the
    /// pending unsigned transaction. A mismatch means the scanned blob was
    /// signed over different values and must not be submitted.
    pub fn matches(&self, tx: &UnsignedTransaction) -> bool {
        self.transaction_type == Some(tx.transaction_type)
            && self.sequence == Some(tx.sequence)
            && self.fee == Some(tx.fee.raw())
            && self.account.as_ref() == Some(&tx.account)
    }
}

/// Deserialize the field subset this wallet produces. Unknown fields are a
/// hard error: the device signs exactly the map we sent, so anything else
/// is not our transaction.
pub fn deserialize_blob(bytes: &[u8]) -> Result<ParsedBlob, BinaryError> {
    let mut parsed = ParsedBlob::default();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let header = bytes[pos];
        pos += 1;
        let type_code = header >> 4;
        let field_code = if header & 0x0f != 0 {
            header & 0x0f
        } else {
            let fc = *bytes.get(pos).ok_or(BinaryError::Truncated("header"))?;
            pos += 1;
            fc
        };

        match (type_code, field_code) {
            (ST_UINT16, FLD_TRANSACTION_TYPE) => {
                let raw = read_array::<2>(bytes, &mut pos, "TransactionType")?;
                let code = u16::from_be_bytes(raw);
                parsed.transaction_type = Some(
                    TransactionType::from_code(code)
                        .ok_or(BinaryError::UnknownTransactionType(code))?,
                );
            }
            (ST_UINT32, FLD_FLAGS) => {
                parsed.flags = Some(read_u32(bytes, &mut pos, "Flags")?);
            }
            (ST_UINT32, FLD_SEQUENCE) => {
                parsed.sequence = Some(read_u32(bytes, &mut pos, "Sequence")?);
            }
            (ST_UINT32, FLD_EXPIRATION)
            | (ST_UINT32, FLD_DESTINATION_TAG)
            | (ST_UINT32, FLD_OFFER_SEQUENCE) => {
                read_u32(bytes, &mut pos, "UInt32")?;
            }
            (ST_UINT32, FLD_LAST_LEDGER_SEQUENCE) => {
                parsed.last_ledger_sequence = Some(read_u32(bytes, &mut pos, "LastLedgerSequence")?);
            }
            (ST_AMOUNT, FLD_FEE) => {
                let raw = read_amount(bytes, &mut pos)?;
                if let AmountBits::Native(drops) = raw {
                    parsed.fee = Some(drops);
                }
            }
            (ST_AMOUNT, FLD_AMOUNT)
            | (ST_AMOUNT, FLD_LIMIT_AMOUNT)
            | (ST_AMOUNT, FLD_TAKER_PAYS)
            | (ST_AMOUNT, FLD_TAKER_GETS) => {
                read_amount(bytes, &mut pos)?;
            }
            (ST_BLOB, FLD_SIGNING_PUB_KEY) => {
                parsed.signing_pub_key = Some(read_vl(bytes, &mut pos, "SigningPubKey")?);
            }
            (ST_BLOB, FLD_TXN_SIGNATURE) => {
                parsed.txn_signature = Some(read_vl(bytes, &mut pos, "TxnSignature")?);
            }
            (ST_ACCOUNT, FLD_ACCOUNT) => {
                parsed.account = Some(read_account(bytes, &mut pos, "Account")?);
            }
            (ST_ACCOUNT, FLD_DESTINATION) => {
                parsed.destination = Some(read_account(bytes, &mut pos, "Destination")?);
            }
            _ => {
                return Err(BinaryError::UnknownField {
                    type_code,
                    field_code,
                })
            }
        }
    }

    Ok(parsed)
}

enum AmountBits {
    Native(u64),
    Issued,
}

fn read_array<const N: usize>(
    bytes: &[u8],
    pos: &mut usize,
    field: &'static str,
) -> Result<[u8; N], BinaryError> {
    let end = pos.checked_add(N).ok_or(BinaryError::BadLength)?;
    let slice = bytes.get(*pos..end).ok_or(BinaryError::Truncated(field))?;
    *pos = end;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

fn read_u32(bytes: &[u8], pos: &mut usize, field: &'static str) -> Result<u32, BinaryError> {
    Ok(u32::from_be_bytes(read_array::<4>(bytes, pos, field)?))
}

fn read_amount(bytes: &[u8], pos: &mut usize) -> Result<AmountBits, BinaryError> {
    let first = *bytes.get(*pos).ok_or(BinaryError::Truncated("Amount"))?;
    if first & 0x80 == 0 {
        let raw = u64::from_be_bytes(read_array::<8>(bytes, pos, "Amount")?);
        Ok(AmountBits::Native(raw & !NATIVE_POSITIVE_BIT))
    } else {
        // 8-byte value + 20-byte currency + 20-byte issuer.
        read_array::<48>(bytes, pos, "Amount")?;
        Ok(AmountBits::Issued)
    }
}

fn read_vl(bytes: &[u8], pos: &mut usize, field: &'static str) -> Result<Vec<u8>, BinaryError> {
    let first = *bytes.get(*pos).ok_or(BinaryError::Truncated(field))?;
    *pos += 1;
    let len = if first <= 192 {
        first as usize
    } else if first <= 240 {
        let second = *bytes.get(*pos).ok_or(BinaryError::Truncated(field))?;
        *pos += 1;
        193 + ((first as usize - 193) << 8) + second as usize
    } else {
        return Err(BinaryError::BadLength);
    };
    let end = pos.checked_add(len).ok_or(BinaryError::BadLength)?;
    let data = bytes
        .get(*pos..end)
        .ok_or(BinaryError::Truncated(field))?
        .to_vec();
    *pos = end;
    Ok(data)
}

fn read_account(bytes: &[u8], pos: &mut usize, field: &'static str) -> Result<Address, BinaryError> {
    let raw = read_vl(bytes, pos, field)?;
    if raw.len() != 20 {
        return Err(BinaryError::BadLength);
    }
    let mut id = [0u8; 20];
    id.copy_from_slice(&raw);
    Ok(Address::from_account_id(&id))
}
