//! Multi-part UR fragment accumulation.
//!
//! The signing device splits large responses across animated QR frames:
//! `ur:<type>/<i>-<n>/<payload>`. Fragments may be scanned in any order and
//! any number of times; nothing downstream may see a byte until every
//! fragment is present. The observed firmware cycles plain indexed
//! fragments (`i <= n`); rateless XOR-mixed parts (`i > n`) are rejected
//! rather than mis-assembled.

use crate::error::DecodeError;
use std::collections::BTreeMap;

/// An order-independent collector for multi-part UR fragments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrAccumulator {
    ur_type: String,
    total: u32,
    parts: BTreeMap<u32, Vec<u8>>,
}

impl UrAccumulator {
    pub fn new(ur_type: impl Into<String>, total: u32) -> Self {
        Self {
            ur_type: ur_type.into(),
            total,
            parts: BTreeMap::new(),
        }
    }

    pub fn ur_type(&self) -> &str {
        &self.ur_type
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn received(&self) -> u32 {
        self.parts.len() as u32
    }

    /// Add one fragment. Re-scanning an already-held index is a no-op.
    pub fn add_fragment(
        &mut self,
        ur_type: &str,
        index: u32,
        total: u32,
        data: Vec<u8>,
    ) -> Result<(), DecodeError> {
        if ur_type != self.ur_type {
            return Err(DecodeError::PartTypeMismatch {
                expected: self.ur_type.clone(),
                got: ur_type.to_string(),
            });
        }
        if total != self.total {
            return Err(DecodeError::PartTotalMismatch {
                expected: self.total,
                got: total,
            });
        }
        if index > total {
            return Err(DecodeError::MixedPartUnsupported);
        }
        if index == 0 {
            return Err(DecodeError::BadPartIndex { index, total });
        }
        self.parts.entry(index).or_insert(data);
        Ok(())
    }

    /// All fragments 1..=total present.
    pub fn is_complete(&self) -> bool {
        self.received() == self.total
    }

    /// The reassembled message, once complete.
    pub fn message(&self) -> Result<Vec<u8>, DecodeError> {
        if !self.is_complete() {
            return Err(DecodeError::Incomplete {
                received: self.received(),
                total: self.total,
            });
        }
        let mut out = Vec::new();
        for data in self.parts.values() {
            out.extend_from_slice(data);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_assemble_in_index_order_regardless_of_arrival() {
        let mut acc = UrAccumulator::new("bytes", 3);
        acc.add_fragment("bytes", 3, 3, b"cc".to_vec()).unwrap();
        assert!(!acc.is_complete());
        acc.add_fragment("bytes", 1, 3, b"aa".to_vec()).unwrap();
        acc.add_fragment("bytes", 2, 3, b"bb".to_vec()).unwrap();
        assert!(acc.is_complete());
        assert_eq!(acc.message().unwrap(), b"aabbcc");
    }

    #[test]
    fn rescanning_a_fragment_is_idempotent() {
        let mut acc = UrAccumulator::new("bytes", 2);
        acc.add_fragment("bytes", 1, 2, b"xx".to_vec()).unwrap();
        acc.add_fragment("bytes", 1, 2, b"yy".to_vec()).unwrap();
        acc.add_fragment("bytes", 2, 2, b"zz".to_vec()).unwrap();
        // First-scanned content wins; a device never varies fragment content.
        assert_eq!(acc.message().unwrap(), b"xxzz");
    }

    #[test]
    fn incomplete_message_is_unavailable() {
        let mut acc = UrAccumulator::new("bytes", 2);
        acc.add_fragment("bytes", 1, 2, b"xx".to_vec()).unwrap();
        assert_eq!(
            acc.message(),
            Err(DecodeError::Incomplete {
                received: 1,
                total: 2
            })
        );
    }

    #[test]
    fn mixed_fountain_parts_rejected() {
        let mut acc = UrAccumulator::new("bytes", 3);
        assert_eq!(
            acc.add_fragment("bytes", 4, 3, vec![]),
            Err(DecodeError::MixedPartUnsupported)
        );
    }

    #[test]
    fn disagreeing_totals_rejected() {
        let mut acc = UrAccumulator::new("bytes", 3);
        assert_eq!(
            acc.add_fragment("bytes", 1, 4, vec![]),
            Err(DecodeError::PartTotalMismatch {
                expected: 3,
                got: 4
            })
        );
    }

    #[test]
    fn wrong_type_rejected() {
        let mut acc = UrAccumulator::new("xrp-signature", 2);
        assert!(matches!(
            acc.add_fragment("bytes", 1, 2, vec![]),
            Err(DecodeError::PartTypeMismatch { .. })
        ));
    }
}
