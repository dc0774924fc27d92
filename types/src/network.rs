//! Network identifier.
//!
//! Mainnet and testnet are strictly separate: account sequence and fee state
//! diverge between them, so a payload signed for one must never reach the
//! other. Every RPC call and every signed blob carries a `NetworkId`
//! explicitly; there is deliberately no `Default` impl.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which XRPL network a call targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production ledger.
    Mainnet,
    /// The public test ledger.
    Testnet,
}

impl NetworkId {
    /// Default JSON-RPC endpoint for this network.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://s1.ripple.com:51234/",
            Self::Testnet => "https://s.altnet.rippletest.net:51234/",
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
