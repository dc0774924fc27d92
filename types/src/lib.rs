//! Fundamental value types for the Airlock wallet.
//!
//! These are pure data types with no I/O:
//! - [`Drops`] / [`Amount`] — native and issued-currency amounts
//! - [`CurrencyCode`] — standard 3-char and 40-hex nonstandard codes
//! - [`Address`] — XRPL classic addresses with checksum validation
//! - [`NetworkId`] — mainnet/testnet selection, never defaulted
//! - [`RippleTime`] — the ledger's custom epoch (2000-01-01T00:00:00Z)

pub mod address;
pub mod amount;
pub mod currency;
pub mod network;
pub mod time;

pub use address::{Address, AddressError};
pub use amount::{Amount, AmountError, Drops, IssuedAmount};
pub use currency::{CurrencyCode, CurrencyError};
pub use network::NetworkId;
pub use time::{RippleTime, RIPPLE_EPOCH_OFFSET};
