//! Engine-result interpretation.
//!
//! The ledger answers a `submit` with an engine result code. Only
//! `tesSUCCESS` means the transaction was provisionally applied; every
//! other class is a failure of this attempt. Local rejection (`tem*`,
//! malformed before broadcast) and provisional network failure (`tec*`,
//! `ter*`, `tef*`) are deliberately surfaced the same way — the state
//! machine treats both as terminal for the attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResult(pub String);

impl EngineResult {
    pub fn is_success(&self) -> bool {
        self.0 == "tesSUCCESS"
    }

    /// Result class prefix: "tes", "tec", "tef", "ter", "tel", "tem".
    pub fn class(&self) -> &str {
        self.0.get(..3).unwrap_or("")
    }

    /// Failures caused by stale sequence or expired ledger bounds; the only
    /// fix is rebuilding the transaction from fresh account state.
    pub fn is_stale_state(&self) -> bool {
        matches!(
            self.0.as_str(),
            "tefPAST_SEQ" | "tefMAX_LEDGER" | "terPRE_SEQ" | "tefALREADY"
        )
    }
}

impl fmt::Display for EngineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_tes_success_is_success() {
        assert!(EngineResult("tesSUCCESS".into()).is_success());
        for code in ["tecUNFUNDED_PAYMENT", "tefPAST_SEQ", "temBAD_FEE", "terRETRY"] {
            assert!(!EngineResult(code.into()).is_success(), "{code}");
        }
    }

    #[test]
    fn stale_state_codes() {
        assert!(EngineResult("tefPAST_SEQ".into()).is_stale_state());
        assert!(EngineResult("tefMAX_LEDGER".into()).is_stale_state());
        assert!(!EngineResult("tecUNFUNDED_PAYMENT".into()).is_stale_state());
    }

    #[test]
    fn class_prefix() {
        assert_eq!(EngineResult("tecKILLED".into()).class(), "tec");
        assert_eq!(EngineResult("x".into()).class(), "");
    }
}
