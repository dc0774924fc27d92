//! The UR/CBOR QR codec.
//!
//! Encode direction: an unsigned transaction's JSON field map is UTF-8
//! encoded, wrapped in a CBOR definite-length byte string, hex encoded, and
//! prefixed `ur:bytes/`. This is the exact wire form the signing firmware
//! consumes.
//!
//! Decode direction: scanned response URs arrive as single-part payloads
//! (hex or Bytewords-minimal encoded) or as multi-part animated fragments
//! (`ur:<type>/<i>-<n>/<payload>`) that must all be collected before any
//! byte is trusted. The decoded payload is classified into an explicit
//! tagged type — bare signature vs full signed blob — in one place,
//! [`codec::classify_payload`].
//!
//! Decoding is pure: the same scanned string always yields the same result.

pub mod bytewords;
pub mod cbor;
pub mod codec;
pub mod error;
pub mod fragment;

pub use codec::{
    classify_payload, decode_response, encode_sign_request, parse_ur, Decoded, SignRequest,
    SignaturePayload, SignatureResult, UrPart,
};
pub use error::{DecodeError, EncodeError};
pub use fragment::UrAccumulator;
