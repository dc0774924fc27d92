//! UR encode/decode entry points.

use crate::bytewords;
use crate::cbor;
use crate::error::{DecodeError, EncodeError};
use crate::fragment::UrAccumulator;
use airlock_tx::UnsignedTransaction;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// The UR type tag the firmware accepts for sign requests.
pub const REQUEST_UR_TYPE: &str = "bytes";

/// An encoded sign request, ready for QR rendering.
///
/// Lives for a single handshake attempt; the `request_id` is an opaque
/// correlation token echoed (when the firmware cooperates) in the response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRequest {
    pub ur_type: String,
    /// Hex-encoded CBOR byte string wrapping the transaction field map.
    pub cbor_hex: String,
    pub request_id: Uuid,
}

impl SignRequest {
    /// The full QR payload string.
    pub fn to_ur_string(&self) -> String {
        format!("ur:{}/{}", self.ur_type, self.cbor_hex)
    }
}

/// Encode an unsigned transaction for the device.
///
/// The encode completes fully before anything is displayed; there is no
/// streaming form.
pub fn encode_sign_request(tx: &UnsignedTransaction) -> Result<SignRequest, EncodeError> {
    let json = tx.to_field_map()?;
    let wrapped = cbor::wrap_bytes(json.as_bytes())?;
    let request = SignRequest {
        ur_type: REQUEST_UR_TYPE.to_string(),
        cbor_hex: hex::encode(wrapped),
        request_id: Uuid::new_v4(),
    };
    debug!(
        request_id = %request.request_id,
        payload_bytes = json.len(),
        "encoded sign request"
    );
    Ok(request)
}

/// One parsed UR string: either a complete single-part message or one
/// fragment of a multi-part message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrPart {
    Single {
        ur_type: String,
        message: Vec<u8>,
    },
    Fragment {
        ur_type: String,
        index: u32,
        total: u32,
        data: Vec<u8>,
    },
}

/// Parse a scanned UR string into its single-part or fragment form.
///
/// The payload segment is pure hex in the firmware's minimal encoding;
/// anything containing characters outside the hex alphabet routes through
/// the Bytewords decoder instead.
pub fn parse_ur(raw: &str) -> Result<UrPart, DecodeError> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let body = lower.strip_prefix("ur:").ok_or(DecodeError::BadScheme)?;

    let mut segments = body.split('/');
    let ur_type = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(DecodeError::EmptyPayload)?
        .to_string();
    let second = segments.next().ok_or(DecodeError::EmptyPayload)?;

    match segments.next() {
        None => {
            // ur:<type>/<payload>
            let message = decode_payload_segment(second)?;
            Ok(UrPart::Single { ur_type, message })
        }
        Some(payload) => {
            // ur:<type>/<i>-<n>/<payload>
            let (index, total) = parse_part_segment(second)?;
            if segments.next().is_some() {
                return Err(DecodeError::BadPartSegment(second.to_string()));
            }
            let data = decode_payload_segment(payload)?;
            Ok(UrPart::Fragment {
                ur_type,
                index,
                total,
                data,
            })
        }
    }
}

fn parse_part_segment(segment: &str) -> Result<(u32, u32), DecodeError> {
    let (index, total) = segment
        .split_once('-')
        .ok_or_else(|| DecodeError::BadPartSegment(segment.to_string()))?;
    let index: u32 = index
        .parse()
        .map_err(|_| DecodeError::BadPartSegment(segment.to_string()))?;
    let total: u32 = total
        .parse()
        .map_err(|_| DecodeError::BadPartSegment(segment.to_string()))?;
    if total == 0 {
        return Err(DecodeError::BadPartIndex { index, total });
    }
    Ok((index, total))
}

fn decode_payload_segment(segment: &str) -> Result<Vec<u8>, DecodeError> {
    if segment.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    let is_hex = segment.len() % 2 == 0 && segment.chars().all(|c| c.is_ascii_hexdigit());
    if is_hex {
        hex::decode(segment).map_err(|_| DecodeError::BadHex)
    } else {
        bytewords::decode(segment)
    }
}

/// What a decoded response payload actually is. The distinction decides
/// whether the caller must re-serialize (bare signature) or may submit the
/// bytes verbatim (full signed blob).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignaturePayload {
    /// A raw ECDSA/EdDSA signature to merge into the pending transaction.
    Signature(Vec<u8>),
    /// A fully serialized signed-transaction blob.
    SignedBlob(Vec<u8>),
}

/// A decoded device response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureResult {
    /// Correlation token, if the firmware echoed one.
    pub request_id: Option<String>,
    pub payload: SignaturePayload,
}

/// Outcome of feeding one scanned string to the decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    Complete(SignatureResult),
    /// Multi-part assembly still in progress; hold the accumulator and feed
    /// it the next scan.
    Incomplete(UrAccumulator),
}

/// Decode one scanned string, threading any in-progress multi-part
/// accumulator through as a value.
///
/// Pure: identical inputs yield identical results, so re-decoding the same
/// scan twice is harmless.
pub fn decode_response(
    raw: &str,
    pending: Option<UrAccumulator>,
) -> Result<Decoded, DecodeError> {
    match parse_ur(raw)? {
        UrPart::Single { ur_type, message } => {
            if ur_type != REQUEST_UR_TYPE && ur_type != "xrp-signature" {
                warn!(%ur_type, "unexpected UR type in response; attempting decode anyway");
            }
            let embedded = cbor::unwrap_bytes(&message)?;
            Ok(Decoded::Complete(classify_payload(embedded)?))
        }
        UrPart::Fragment {
            ur_type,
            index,
            total,
            data,
        } => {
            let mut acc =
                pending.unwrap_or_else(|| UrAccumulator::new(ur_type.clone(), total));
            acc.add_fragment(&ur_type, index, total, data)?;
            if acc.is_complete() {
                let message = acc.message()?;
                let embedded = cbor::unwrap_bytes(&message)?;
                Ok(Decoded::Complete(classify_payload(embedded)?))
            } else {
                debug!(
                    received = acc.received(),
                    total = acc.total(),
                    "multi-part response incomplete"
                );
                Ok(Decoded::Incomplete(acc))
            }
        }
    }
}

/// Minimum hex length for the serialized-blob heuristic: anything shorter
/// is at most a bare signature.
const BLOB_MIN_HEX_CHARS: usize = 200;

/// Leading byte of every serialized transaction: the TransactionType field
/// header (UInt16 type 1, field 2).
const TRANSACTION_TYPE_HEADER: u8 = 0x12;

#[derive(Deserialize)]
struct SignatureJson {
    #[serde(alias = "requestId")]
    request_id: Option<String>,
    signature: String,
}

/// Decide whether decoded payload bytes are a bare signature or a full
/// signed-transaction blob.
///
/// This is the single place the shape heuristic lives. The primary,
/// well-formed path is a JSON object carrying a `signature` field. The
/// fallback — observed when the firmware skips the JSON wrapper — is a
/// serialized blob, recognized by length (over 200 hex chars) and the
/// leading TransactionType field header. Anything matching neither shape is
/// an error, never a guess; a misclassified blob is additionally caught by
/// the field-match check before submission.
pub fn classify_payload(embedded: &[u8]) -> Result<SignatureResult, DecodeError> {
    if let Ok(text) = std::str::from_utf8(embedded) {
        let text = text.trim();
        if let Ok(parsed) = serde_json::from_str::<SignatureJson>(text) {
            let signature =
                hex::decode(parsed.signature.trim()).map_err(|_| DecodeError::BadHex)?;
            return Ok(SignatureResult {
                request_id: parsed.request_id,
                payload: SignaturePayload::Signature(signature),
            });
        }
        let is_hex = text.len() % 2 == 0 && text.chars().all(|c| c.is_ascii_hexdigit());
        if is_hex && text.len() > BLOB_MIN_HEX_CHARS {
            let blob = hex::decode(text).map_err(|_| DecodeError::BadHex)?;
            if blob.first() == Some(&TRANSACTION_TYPE_HEADER) {
                return Ok(SignatureResult {
                    request_id: None,
                    payload: SignaturePayload::SignedBlob(blob),
                });
            }
        }
    } else if embedded.len() * 2 > BLOB_MIN_HEX_CHARS
        && embedded.first() == Some(&TRANSACTION_TYPE_HEADER)
    {
        return Ok(SignatureResult {
            request_id: None,
            payload: SignaturePayload::SignedBlob(embedded.to_vec()),
        });
    }
    Err(DecodeError::UnrecognizedPayload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use airlock_tx::{serialize_signed, TransactionType};
    use airlock_types::{Address, Amount, Drops};

    fn sample_tx() -> UnsignedTransaction {
        UnsignedTransaction {
            transaction_type: TransactionType::Payment,
            account: Address::parse("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh").unwrap(),
            fee: Drops::new(12),
            sequence: 5,
            last_ledger_sequence: 80_001_000,
            flags: Some(0x8000_0000),
            signing_pub_key: "ED9434799226374926EDA3B54B1B461B4ABF7237962EAE18528FEA67595397FA32"
                .into(),
            amount: Some(Amount::Xrp(Drops::new(1_000_000))),
            destination: Some(Address::parse("rrrrrrrrrrrrrrrrrrrrrhoLvTp").unwrap()),
            destination_tag: None,
            limit_amount: None,
            taker_gets: None,
            taker_pays: None,
            offer_sequence: None,
            expiration: None,
        }
    }

    fn wrap_in_ur(payload: &[u8]) -> String {
        let wrapped = cbor::wrap_bytes(payload).unwrap();
        format!("ur:bytes/{}", hex::encode(wrapped))
    }

    #[test]
    fn encode_produces_ur_bytes_hex() {
        let request = encode_sign_request(&sample_tx()).unwrap();
        assert_eq!(request.ur_type, "bytes");
        let ur = request.to_ur_string();
        assert!(ur.starts_with("ur:bytes/"));
        assert!(ur["ur:bytes/".len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn declared_cbor_length_matches_json_utf8_length() {
        let tx = sample_tx();
        let json = tx.to_field_map().unwrap();
        let request = encode_sign_request(&tx).unwrap();
        let wrapped = hex::decode(&request.cbor_hex).unwrap();

        assert_eq!(wrapped[0], 0x59); // field map exceeds 255 bytes
        let declared = u16::from_be_bytes([wrapped[1], wrapped[2]]) as usize;
        assert_eq!(declared, json.len());
    }

    #[test]
    fn encode_decode_recovers_field_map_byte_for_byte() {
        let tx = sample_tx();
        let json = tx.to_field_map().unwrap();
        let request = encode_sign_request(&tx).unwrap();

        let part = parse_ur(&request.to_ur_string()).unwrap();
        let message = match part {
            UrPart::Single { message, .. } => message,
            other => panic!("expected single part, got {other:?}"),
        };
        assert_eq!(cbor::unwrap_bytes(&message).unwrap(), json.as_bytes());
    }

    #[test]
    fn hex_payload_skips_bytewords() {
        // Digits are outside the Bytewords alphabet, so a successful decode
        // proves the hex branch ran.
        let ur = wrap_in_ur(br#"{"signature":"30440220aa"}"#);
        let decoded = decode_response(&ur, None).unwrap();
        match decoded {
            Decoded::Complete(result) => {
                assert_eq!(
                    result.payload,
                    SignaturePayload::Signature(hex::decode("30440220aa").unwrap())
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bytewords_payload_routes_through_bytewords_decoder() {
        let wrapped = cbor::wrap_bytes(br#"{"signature":"30440220aa"}"#).unwrap();
        let encoded = bytewords::encode(&wrapped);
        // The minimal alphabet is letters only; prove we are not hex.
        assert!(encoded.chars().any(|c| !c.is_ascii_hexdigit()));
        let ur = format!("ur:xrp-signature/{encoded}");

        let decoded = decode_response(&ur, None).unwrap();
        assert!(matches!(
            decoded,
            Decoded::Complete(SignatureResult {
                payload: SignaturePayload::Signature(_),
                ..
            })
        ));
    }

    #[test]
    fn signature_json_with_request_id() {
        let ur = wrap_in_ur(br#"{"requestId":"9b1deb4d","signature":"aabb"}"#);
        match decode_response(&ur, None).unwrap() {
            Decoded::Complete(result) => {
                assert_eq!(result.request_id.as_deref(), Some("9b1deb4d"));
                assert_eq!(result.payload, SignaturePayload::Signature(vec![0xaa, 0xbb]));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn full_blob_payload_classified_as_signed_blob() {
        let blob = serialize_signed(&sample_tx(), &[0x7E; 64]).unwrap();
        let blob_hex = hex::encode_upper(&blob);
        assert!(blob_hex.len() > 200);
        let ur = wrap_in_ur(blob_hex.as_bytes());

        match decode_response(&ur, None).unwrap() {
            Decoded::Complete(result) => {
                assert_eq!(result.payload, SignaturePayload::SignedBlob(blob));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn raw_binary_blob_classified_as_signed_blob() {
        let blob = serialize_signed(&sample_tx(), &[0x7E; 64]).unwrap();
        let ur = wrap_in_ur(&blob);
        match decode_response(&ur, None).unwrap() {
            Decoded::Complete(result) => {
                assert_eq!(result.payload, SignaturePayload::SignedBlob(blob));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unrecognizable_payload_is_an_error() {
        let ur = wrap_in_ur(b"not json, not a blob");
        assert_eq!(
            decode_response(&ur, None),
            Err(DecodeError::UnrecognizedPayload)
        );
    }

    #[test]
    fn multi_part_assembles_across_scans() {
        let wrapped = cbor::wrap_bytes(br#"{"signature":"deadbeef"}"#).unwrap();
        let mid = wrapped.len() / 2;
        let frame1 = format!("ur:bytes/1-2/{}", hex::encode(&wrapped[..mid]));
        let frame2 = format!("ur:bytes/2-2/{}", hex::encode(&wrapped[mid..]));

        // Frames arrive out of order.
        let acc = match decode_response(&frame2, None).unwrap() {
            Decoded::Incomplete(acc) => acc,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(acc.received(), 1);
        match decode_response(&frame1, Some(acc)).unwrap() {
            Decoded::Complete(result) => {
                assert_eq!(
                    result.payload,
                    SignaturePayload::Signature(hex::decode("deadbeef").unwrap())
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_prefix_rejected() {
        assert_eq!(parse_ur("bytes/aabb"), Err(DecodeError::BadScheme));
        assert_eq!(parse_ur("ur:"), Err(DecodeError::EmptyPayload));
        assert_eq!(parse_ur("ur:bytes"), Err(DecodeError::EmptyPayload));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let ur = wrap_in_ur(br#"{"signature":"aa"}"#).to_uppercase();
        assert!(decode_response(&ur, None).is_ok());
    }

    #[test]
    fn decoding_is_idempotent() {
        let ur = wrap_in_ur(br#"{"signature":"aabbcc"}"#);
        let first = decode_response(&ur, None).unwrap();
        let second = decode_response(&ur, None).unwrap();
        assert_eq!(first, second);
    }
}
