use std::collections::HashSet;
use crate::aggregate::record::RecordFingerprint;

/// Fingerprints accepted so far in one run.
///
/// A fresh instance is created per run and shared by every batch of that
/// run, so repeats are caught across batch boundaries but never leak
/// between runs.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<RecordFingerprint>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_duplicate(&self, fingerprint: &RecordFingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    pub fn record_seen(&mut self, fingerprint: RecordFingerprint) {
        self.seen.insert(fingerprint);
    }

    /// Marks the fingerprint as seen. Returns `true` on its first
    /// occurrence and `false` for a repeat.
    pub fn check_and_record(&mut self, fingerprint: RecordFingerprint) -> bool {
        self.seen.insert(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
