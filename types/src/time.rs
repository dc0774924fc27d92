//! Ledger time.
//!
//! Time-denominated transaction fields (offer `Expiration`) use the ledger's
//! custom epoch: seconds since 2000-01-01T00:00:00Z, offset 946684800 from
//! Unix time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds between the Unix epoch and the ledger epoch.
pub const RIPPLE_EPOCH_OFFSET: u64 = 946_684_800;

const SECS_PER_DAY: u64 = 86_400;

/// A point in time in ledger-epoch seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RippleTime(u32);

impl RippleTime {
    pub fn new(secs: u32) -> Self {
        Self(secs)
    }

    /// Convert from Unix seconds. Times before the ledger epoch clamp to zero.
    pub fn from_unix(unix_secs: u64) -> Self {
        Self(unix_secs.saturating_sub(RIPPLE_EPOCH_OFFSET) as u32)
    }

    /// The current time in ledger-epoch seconds.
    pub fn now() -> Self {
        let unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::from_unix(unix)
    }

    /// A point `days` days after `now_unix`, in ledger-epoch seconds.
    pub fn days_from(now_unix: u64, days: u32) -> Self {
        Self::from_unix(now_unix + u64::from(days) * SECS_PER_DAY)
    }

    pub fn as_secs(&self) -> u32 {
        self.0
    }

    pub fn to_unix(&self) -> u64 {
        u64::from(self.0) + RIPPLE_EPOCH_OFFSET
    }
}

impl fmt::Display for RippleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s (ledger epoch)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_offset_round_trips() {
        let t = RippleTime::from_unix(1_700_000_000);
        assert_eq!(t.as_secs() as u64, 1_700_000_000 - RIPPLE_EPOCH_OFFSET);
        assert_eq!(t.to_unix(), 1_700_000_000);
    }

    #[test]
    fn ledger_epoch_is_zero() {
        assert_eq!(RippleTime::from_unix(RIPPLE_EPOCH_OFFSET).as_secs(), 0);
        assert_eq!(RippleTime::from_unix(0).as_secs(), 0);
    }

    #[test]
    fn days_from_now() {
        let t = RippleTime::days_from(RIPPLE_EPOCH_OFFSET, 7);
        assert_eq!(t.as_secs(), 7 * 86_400);
    }
}
