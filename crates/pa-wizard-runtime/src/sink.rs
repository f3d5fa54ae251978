//! Delivery targets for finished drafts.
//!
//! The wizard core hands its draft to a synchronous, fire-and-forget sink.
//! Real delivery is asynchronous and can fail, so it lives behind
//! [`DraftSink`] and is driven by the [`Submitter`](crate::Submitter).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pa_wizard_core::PaWizardDraft;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Errors from a draft sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Transport failed: {0}")]
    Transport(String),

    #[error("Submission rejected: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("Sink temporarily unavailable")]
    Unavailable,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Authentication failed")]
    AuthError,

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Sink not configured: {0}")]
    NotConfigured(String),
}

impl SinkError {
    /// Whether another attempt could succeed without changing the draft.
    pub fn is_retryable(&self) -> bool {
        match self {
            SinkError::Transport(_) | SinkError::Unavailable | SinkError::Timeout(_) => true,
            SinkError::Rejected { status, .. } => *status == 429 || *status >= 500,
            SinkError::AuthError | SinkError::Serialization(_) | SinkError::NotConfigured(_) => {
                false
            }
        }
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err.to_string())
    }
}

/// Acknowledgement of a delivered draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Identifier assigned by the receiving system
    pub submission_id: String,

    /// Name of the sink that accepted the draft
    pub sink: String,

    pub submitted_at: DateTime<Utc>,
}

impl SubmissionReceipt {
    pub fn new(submission_id: impl Into<String>, sink: impl Into<String>) -> Self {
        Self {
            submission_id: submission_id.into(),
            sink: sink.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Async destination for a finished draft.
#[async_trait]
pub trait DraftSink: Send + Sync {
    /// Deliver one draft.
    async fn submit(&self, draft: &PaWizardDraft) -> Result<SubmissionReceipt, SinkError>;

    /// Sink name, used for circuit state and logs.
    fn name(&self) -> &str;
}

/// Sink that keeps drafts in memory.
///
/// Failures can be queued ahead of time to exercise retry and circuit
/// behavior: each call pops one queued error before delivering.
#[derive(Debug, Default)]
pub struct InMemorySink {
    name: String,
    delivered: Mutex<Vec<PaWizardDraft>>,
    failures: Mutex<VecDeque<SinkError>>,
    attempts: AtomicU64,
    next_id: AtomicU64,
}

impl InMemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Queue an error for an upcoming call.
    pub fn fail_next(&self, error: SinkError) {
        self.failures.lock().push_back(error);
    }

    /// Drafts accepted so far.
    pub fn delivered(&self) -> Vec<PaWizardDraft> {
        self.delivered.lock().clone()
    }

    /// Calls made, successful or not.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DraftSink for InMemorySink {
    async fn submit(&self, draft: &PaWizardDraft) -> Result<SubmissionReceipt, SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.delivered.lock().push(draft.clone());
        Ok(SubmissionReceipt::new(format!("mem-{}", id), &self.name))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SinkError::Unavailable.is_retryable());
        assert!(SinkError::Timeout(Duration::from_secs(1)).is_retryable());
        let rejected = |status| SinkError::Rejected {
            status,
            message: String::new(),
        };
        assert!(rejected(503).is_retryable());
        assert!(rejected(429).is_retryable());
        assert!(!rejected(422).is_retryable());
        assert!(!SinkError::AuthError.is_retryable());
    }

    #[tokio::test]
    async fn test_in_memory_sink_records_drafts() {
        let sink = InMemorySink::new("memory");
        let draft = PaWizardDraft::new();

        let first = sink.submit(&draft).await.unwrap();
        let second = sink.submit(&draft).await.unwrap();

        assert_eq!(first.submission_id, "mem-1");
        assert_eq!(second.submission_id, "mem-2");
        assert_eq!(first.sink, "memory");
        assert_eq!(sink.delivered().len(), 2);
    }

    #[tokio::test]
    async fn test_in_memory_sink_queued_failure() {
        let sink = InMemorySink::new("memory");
        sink.fail_next(SinkError::Unavailable);

        assert!(sink.submit(&PaWizardDraft::new()).await.is_err());
        assert!(sink.submit(&PaWizardDraft::new()).await.is_ok());
        assert_eq!(sink.attempts(), 2);
        assert_eq!(sink.delivered().len(), 1);
    }
}
