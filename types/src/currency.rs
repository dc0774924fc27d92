//! Currency codes: standard 3-character ASCII and 40-hex nonstandard forms.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("invalid currency code: {0}")]
    Invalid(String),

    #[error("\"XRP\" is not a valid issued-currency code")]
    ReservedXrp,
}

/// An issued-currency code.
///
/// Either a standard 3-character ASCII code ("USD") or a 40-character hex
/// code for nonstandard currencies. The native currency never appears here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(raw: impl Into<String>) -> Result<Self, CurrencyError> {
        let s = raw.into();
        if s == "XRP" {
            return Err(CurrencyError::ReservedXrp);
        }
        let standard = s.len() == 3
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || "?!@#$%^&*<>(){}[]|".contains(c));
        let nonstandard = s.len() == 40 && s.chars().all(|c| c.is_ascii_hexdigit());
        if standard || nonstandard {
            Ok(Self(s))
        } else {
            Err(CurrencyError::Invalid(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_standard(&self) -> bool {
        self.0.len() == 3
    }

    /// The 20-byte wire form: standard codes occupy bytes 12..15 of a
    /// zeroed buffer; nonstandard codes are the raw hex bytes.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        if self.is_standard() {
            out[12..15].copy_from_slice(self.0.as_bytes());
        } else if let Ok(raw) = hex::decode(&self.0) {
            out.copy_from_slice(&raw);
        }
        out
    }

    /// Human-readable form: hex codes whose payload is a printable ASCII
    /// triple in the standard slot render as that ASCII, everything else
    /// renders verbatim.
    pub fn display_name(&self) -> String {
        if self.is_standard() {
            return self.0.clone();
        }
        let bytes = self.to_bytes();
        let triple = &bytes[12..15];
        let rest_zero = bytes[..12].iter().all(|&b| b == 0) && bytes[15..].iter().all(|&b| b == 0);
        if rest_zero && triple.iter().all(|&b| b.is_ascii_graphic()) {
            return String::from_utf8_lossy(triple).into_owned();
        }
        self.0.clone()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_codes_parse() {
        assert!(CurrencyCode::parse("USD").is_ok());
        assert!(CurrencyCode::parse("EUR").is_ok());
        assert!(CurrencyCode::parse("BTC").is_ok());
    }

    #[test]
    fn xrp_is_reserved() {
        assert_eq!(CurrencyCode::parse("XRP"), Err(CurrencyError::ReservedXrp));
    }

    #[test]
    fn bad_codes_rejected() {
        assert!(CurrencyCode::parse("USDT").is_err());
        assert!(CurrencyCode::parse("US").is_err());
        assert!(CurrencyCode::parse("0000").is_err());
    }

    #[test]
    fn hex_codes_parse_and_display_ascii() {
        // "USD" placed in the standard slot of a 20-byte code.
        let hex = "0000000000000000000000005553440000000000";
        let code = CurrencyCode::parse(hex).unwrap();
        assert!(!code.is_standard());
        assert_eq!(code.display_name(), "USD");
    }

    #[test]
    fn hex_codes_with_nonzero_padding_display_verbatim() {
        let hex = "0158415500000000C1F76FF6ECB0BAC600000000";
        let code = CurrencyCode::parse(hex).unwrap();
        assert_eq!(code.display_name(), hex);
    }

    #[test]
    fn standard_wire_bytes() {
        let code = CurrencyCode::parse("USD").unwrap();
        let bytes = code.to_bytes();
        assert_eq!(&bytes[12..15], b"USD");
        assert!(bytes[..12].iter().all(|&b| b == 0));
        assert!(bytes[15..].iter().all(|&b| b == 0));
    }
}
