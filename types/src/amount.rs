//! Native and issued-currency amounts.
//!
//! Native amounts are stored as integer drops (1 XRP = 1,000,000 drops) to
//! avoid floating-point errors. Issued-currency amounts keep their decimal
//! value as a string, as the ledger's JSON convention does.

use crate::address::Address;
use crate::currency::CurrencyCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Drops per XRP.
pub const DROPS_PER_XRP: u64 = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is not a valid decimal number: {0}")]
    NotANumber(String),

    #[error("amount must be positive: {0}")]
    NotPositive(String),

    #[error("amount {0} is below 1 drop (1e-6 XRP)")]
    BelowOneDrop(String),

    #[error("drops value out of range: {0}")]
    OutOfRange(String),
}

/// A native-currency amount in drops.
///
/// Serializes as a decimal string, matching the ledger's wire convention
/// for `Amount` and `Fee` fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Drops(u64);

impl Drops {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Parse a decimal XRP string ("1.5") into drops.
    ///
    /// Rejects negatives, non-numbers, and anything with more than six
    /// fractional digits — sub-drop amounts must fail here, never be
    /// silently rounded to zero.
    pub fn from_xrp_str(s: &str) -> Result<Self, AmountError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::NotANumber(s.to_string()));
        }
        if s.starts_with('-') || s.starts_with('+') {
            return Err(AmountError::NotPositive(s.to_string()));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::NotANumber(s.to_string()));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountError::NotANumber(s.to_string()));
        }
        if frac.len() > 6 && frac[6..].chars().any(|c| c != '0') {
            return Err(AmountError::BelowOneDrop(s.to_string()));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountError::OutOfRange(s.to_string()))?
        };
        let frac_padded = format!("{:0<6}", frac.get(..frac.len().min(6)).unwrap_or(""));
        let frac: u64 = frac_padded
            .parse()
            .map_err(|_| AmountError::OutOfRange(s.to_string()))?;

        whole
            .checked_mul(DROPS_PER_XRP)
            .and_then(|d| d.checked_add(frac))
            .map(Self)
            .ok_or_else(|| AmountError::OutOfRange(s.to_string()))
    }

    /// Render as a decimal XRP string with trailing zeros trimmed.
    pub fn to_xrp_string(&self) -> String {
        let whole = self.0 / DROPS_PER_XRP;
        let frac = self.0 % DROPS_PER_XRP;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{frac:06}");
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl fmt::Display for Drops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} drops", self.0)
    }
}

impl Serialize for Drops {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Drops {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| serde::de::Error::custom(format!("invalid drops string: {s}")))
    }
}

/// An issued-currency amount triple: currency, issuer, decimal value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedAmount {
    pub currency: CurrencyCode,
    pub issuer: Address,
    pub value: String,
}

impl IssuedAmount {
    /// Validate the decimal value: positive, finite, numeric.
    pub fn validate(&self) -> Result<(), AmountError> {
        let v: f64 = self
            .value
            .parse()
            .map_err(|_| AmountError::NotANumber(self.value.clone()))?;
        if !v.is_finite() {
            return Err(AmountError::NotANumber(self.value.clone()));
        }
        if v <= 0.0 {
            return Err(AmountError::NotPositive(self.value.clone()));
        }
        Ok(())
    }
}

/// A ledger amount: either native drops (wire form: decimal string) or an
/// issued-currency triple (wire form: JSON object). Never both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Xrp(Drops),
    Issued(IssuedAmount),
}

impl Amount {
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Xrp(_))
    }

    /// The amount's numeric magnitude, for display and ratio math only.
    /// Wire encoding never goes through this.
    pub fn magnitude(&self) -> f64 {
        match self {
            Self::Xrp(d) => d.raw() as f64 / DROPS_PER_XRP as f64,
            Self::Issued(i) => i.value.parse().unwrap_or(0.0),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xrp(d) => write!(f, "{} XRP", d.to_xrp_string()),
            Self::Issued(i) => write!(f, "{} {}", i.value, i.currency),
        }
    }
}
