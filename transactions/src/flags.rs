//! Transaction flag bitmasks.

/// Require a fully canonical signature. Always set on every transaction the
/// wallet builds: the signing firmware demands it for malleability
/// protection, and the ledger ignores it where irrelevant.
pub const TF_FULLY_CANONICAL_SIG: u32 = 0x8000_0000;

/// OfferCreate: do not consume matching offers, only make a new one.
pub const TF_PASSIVE: u32 = 0x0001_0000;

/// OfferCreate: execute immediately against the book, never rest.
pub const TF_IMMEDIATE_OR_CANCEL: u32 = 0x0002_0000;

/// OfferCreate: execute fully and immediately or not at all.
pub const TF_FILL_OR_KILL: u32 = 0x0004_0000;

/// OfferCreate: sell semantics (spend all of TakerGets).
pub const TF_SELL: u32 = 0x0008_0000;

/// Independently toggleable OfferCreate options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OfferFlags {
    pub passive: bool,
    pub immediate_or_cancel: bool,
    pub fill_or_kill: bool,
    pub sell: bool,
}

impl OfferFlags {
    /// The wire bitmask. The fully-canonical bit is unconditional.
    pub fn bits(&self) -> u32 {
        let mut bits = TF_FULLY_CANONICAL_SIG;
        if self.passive {
            bits |= TF_PASSIVE;
        }
        if self.immediate_or_cancel {
            bits |= TF_IMMEDIATE_OR_CANCEL;
        }
        if self.fill_or_kill {
            bits |= TF_FILL_OR_KILL;
        }
        if self.sell {
            bits |= TF_SELL;
        }
        bits
    }
}
