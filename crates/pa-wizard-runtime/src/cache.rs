//! Duplicate-submission suppression.
//!
//! Remembers the receipt for each delivered draft, keyed by a fingerprint of
//! its serialized form. Resubmitting an identical draft within the TTL
//! returns the earlier receipt instead of delivering twice.

use moka::future::Cache;
use pa_wizard_core::PaWizardDraft;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::sink::{SinkError, SubmissionReceipt};

/// Cache key for a delivered draft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DraftFingerprint {
    sink_hash: u64,
    draft_hash: u64,
}

impl DraftFingerprint {
    /// Fingerprint `draft` as delivered to `sink`.
    pub fn new(sink: &str, draft: &PaWizardDraft) -> Result<Self, SinkError> {
        Ok(Self {
            sink_hash: hash_str(sink),
            draft_hash: hash_draft(draft)?,
        })
    }
}

/// Receipt cache using moka.
pub struct SubmissionCache {
    cache: Cache<DraftFingerprint, SubmissionReceipt>,
}

impl SubmissionCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub async fn get(&self, key: &DraftFingerprint) -> Option<SubmissionReceipt> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: DraftFingerprint, receipt: SubmissionReceipt) {
        self.cache.insert(key, receipt).await;
    }
}

impl Default for SubmissionCache {
    fn default() -> Self {
        Self::new(1_000, Duration::from_secs(600))
    }
}

fn hash_str(value: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// Serialized JSON is canonical for a draft: struct fields serialize in
// declaration order and the discipline set is ordered.
fn hash_draft(draft: &PaWizardDraft) -> Result<u64, SinkError> {
    let bytes = serde_json::to_vec(draft)?;
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    Ok(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pa_wizard_core::{DraftSlice, PaType};

    #[test]
    fn test_fingerprint_tracks_content() {
        let draft = PaWizardDraft::for_category(PaType::Imaging);
        let same = PaWizardDraft::for_category(PaType::Imaging);
        let edited = draft.with_slice(DraftSlice::Notes("stat".to_string()));

        let a = DraftFingerprint::new("sink", &draft).unwrap();
        assert_eq!(a, DraftFingerprint::new("sink", &same).unwrap());
        assert_ne!(a, DraftFingerprint::new("sink", &edited).unwrap());
        assert_ne!(a, DraftFingerprint::new("other", &draft).unwrap());
    }

    #[tokio::test]
    async fn test_cache_operations() {
        let cache = SubmissionCache::default();
        let key = DraftFingerprint::new("sink", &PaWizardDraft::new()).unwrap();

        assert!(cache.get(&key).await.is_none());

        let receipt = SubmissionReceipt::new("PA-0001", "sink");
        cache.insert(key, receipt.clone()).await;
        assert_eq!(cache.get(&key).await, Some(receipt));
    }
}
