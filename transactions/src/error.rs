use airlock_types::{AddressError, AmountError};
use thiserror::Error;

/// Rejected user input. Field-specific, raised before anything reaches the
/// codec or the wire; a transaction is never partially constructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("destination address: {0}")]
    Destination(AddressError),

    #[error("{field}: {source}")]
    Amount {
        field: &'static str,
        source: AmountError,
    },

    #[error("{field} must be greater than zero")]
    ZeroAmount { field: &'static str },

    #[error("{field} rounds to zero drops (minimum is 1 drop = 1e-6 XRP)")]
    RoundsToZero { field: &'static str },

    #[error("insufficient spendable balance: need {needed} drops, have {available} drops after reserve")]
    InsufficientSpendable { needed: u64, available: u64 },

    #[error("destination must differ from the sending account")]
    SelfPayment,

    #[error("offer sequence must be greater than zero")]
    BadOfferSequence,

    #[error("expiration must be at least one day from now")]
    BadExpiration,
}
