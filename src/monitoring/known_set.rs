//! Snapshot of the signatures seen at the most recent poll
//!
//! Replaced wholesale after each cycle: entries that drop out of the
//! provider's window are forgotten, and nothing is persisted across restarts.

use std::collections::HashSet;

use crate::models::SignatureRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownSignatureSet {
    signatures: HashSet<String>,
}

impl KnownSignatureSet {
    pub fn from_records(records: &[SignatureRecord]) -> Self {
        Self {
            signatures: records.iter().map(|r| r.signature.clone()).collect(),
        }
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.signatures.contains(signature)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Records in `fresh` not present in this snapshot, in provider order
    ///
    /// A signature repeated within `fresh` is returned once.
    pub fn new_records<'a>(&self, fresh: &'a [SignatureRecord]) -> Vec<&'a SignatureRecord> {
        let mut emitted = HashSet::new();
        fresh
            .iter()
            .filter(|r| !self.contains(&r.signature))
            .filter(|r| emitted.insert(r.signature.as_str()))
            .collect()
    }

    /// Replace the snapshot with the latest poll
    pub fn replace(&mut self, fresh: &[SignatureRecord]) {
        *self = Self::from_records(fresh);
    }
}
