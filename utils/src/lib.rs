//! Shared utilities for the wallet.

pub mod logging;

pub use logging::init_tracing;
