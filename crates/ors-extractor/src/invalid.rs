//! Collector for owner strings that could not be resolved

use std::collections::HashSet;

use ors_core::{InvalidOwnerEntry, ReasonCode};

/// Accumulates `(raw, reason)` rejections, deduplicated by normalized raw
/// text and reason
#[derive(Debug, Clone, Default)]
pub struct InvalidOwnerCollector {
    seen: HashSet<(String, ReasonCode)>,
    entries: Vec<InvalidOwnerEntry>,
}

impl InvalidOwnerCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rejection. Returns `true` if it was not already present.
    pub fn record(&mut self, raw: &str, reason: ReasonCode) -> bool {
        let key = (normalize_raw(raw), reason);
        if !self.seen.insert(key) {
            return false;
        }

        tracing::debug!("Invalid owner '{}': {}", raw.trim(), reason);
        self.entries.push(InvalidOwnerEntry::new(raw.trim(), reason));
        true
    }

    pub fn entries(&self) -> &[InvalidOwnerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<InvalidOwnerEntry> {
        self.entries
    }
}

/// Trimmed, whitespace-collapsed, upper-cased
fn normalize_raw(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
