//! XRPL classic addresses.

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with 'r': {0}")]
    BadPrefix(String),

    #[error("address length must be 25-34 characters: {0}")]
    BadLength(String),

    #[error("address is not valid base58: {0}")]
    BadBase58(String),

    #[error("address payload malformed: {0}")]
    BadPayload(String),

    #[error("address checksum mismatch: {0}")]
    BadChecksum(String),
}

/// An XRPL classic address.
///
/// Base58 (RIPPLE alphabet) encoding of: version byte 0x00, 20-byte account
/// id, 4-byte double-SHA256 checksum. Always starts with `r`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse and validate a classic address.
    pub fn parse(raw: impl Into<String>) -> Result<Self, AddressError> {
        let s = raw.into();
        if !s.starts_with('r') {
            return Err(AddressError::BadPrefix(s));
        }
        if s.len() < 25 || s.len() > 34 {
            return Err(AddressError::BadLength(s));
        }

        let data = bs58::decode(&s)
            .with_alphabet(bs58::Alphabet::RIPPLE)
            .into_vec()
            .map_err(|_| AddressError::BadBase58(s.clone()))?;

        if data.len() != 25 || data[0] != 0 {
            return Err(AddressError::BadPayload(s));
        }

        let expected = &double_sha256(&data[..21])[..4];
        if expected != &data[21..] {
            return Err(AddressError::BadChecksum(s));
        }

        Ok(Self(s))
    }

    /// Reconstruct an address from a raw 20-byte account id.
    pub fn from_account_id(id: &[u8; 20]) -> Self {
        let mut data = Vec::with_capacity(25);
        data.push(0u8);
        data.extend_from_slice(id);
        let checksum = double_sha256(&data);
        data.extend_from_slice(&checksum[..4]);
        Self(
            bs58::encode(data)
                .with_alphabet(bs58::Alphabet::RIPPLE)
                .into_string(),
        )
    }

    /// The raw 20-byte account id this address encodes.
    pub fn account_id(&self) -> [u8; 20] {
        // Validated at construction, so the decode cannot fail.
        let data = bs58::decode(&self.0)
            .with_alphabet(bs58::Alphabet::RIPPLE)
            .into_vec()
            .unwrap_or_default();
        let mut id = [0u8; 20];
        if data.len() == 25 {
            id.copy_from_slice(&data[1..21]);
        }
        id
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}
