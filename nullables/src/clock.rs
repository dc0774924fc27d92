//! Nullable clock — deterministic time for testing.

use airlock_types::RippleTime;
use std::cell::Cell;

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current_unix: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_unix_secs: u64) -> Self {
        Self {
            current_unix: Cell::new(initial_unix_secs),
        }
    }

    /// The current time in Unix seconds, as the builder consumes it.
    pub fn now_unix(&self) -> u64 {
        self.current_unix.get()
    }

    /// The current time in ledger-epoch seconds.
    pub fn now_ripple(&self) -> RippleTime {
        RippleTime::from_unix(self.current_unix.get())
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current_unix.set(self.current_unix.get() + secs);
    }

    /// Set the time to a specific value.
    pub fn set(&self, unix_secs: u64) {
        self.current_unix.set(unix_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airlock_types::RIPPLE_EPOCH_OFFSET;

    #[test]
    fn time_is_frozen_until_advanced() {
        let clock = NullClock::new(RIPPLE_EPOCH_OFFSET + 100);
        assert_eq!(clock.now_ripple().as_secs(), 100);
        assert_eq!(clock.now_ripple().as_secs(), 100);
        clock.advance(50);
        assert_eq!(clock.now_ripple().as_secs(), 150);
    }
}
