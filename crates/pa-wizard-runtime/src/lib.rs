//! # pa-wizard-runtime
//!
//! Async delivery of finished prior authorization drafts.
//!
//! The wizard in `pa-wizard-core` is synchronous and never performs I/O:
//! its submit sink just receives the draft. This crate supplies the
//! asynchronous side of that boundary:
//!
//! - [`DraftSink`]: where drafts go (in memory, or an HTTP endpoint with the
//!   `http` feature)
//! - [`Submitter`]: finishes a wizard at the review step and delivers its
//!   draft with retry, a per-sink circuit breaker and duplicate suppression
//! - [`RuntimeConfig`]: retry, circuit and dedupe settings
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pa_wizard_runtime::{InMemorySink, RuntimeConfig, Submitter};
//!
//! let submitter = Submitter::new(Arc::new(InMemorySink::new("memory")), RuntimeConfig::default());
//! let receipt = submitter.submit_from(&mut wizard).await?;
//! println!("submitted as {}", receipt.submission_id);
//! ```

use std::time::Duration;
use thiserror::Error;

pub mod cache;
pub mod config;
pub mod resilience;
pub mod secrets;
pub mod sink;
pub mod submitter;

#[cfg(feature = "http")]
pub mod http;

pub use cache::{DraftFingerprint, SubmissionCache};
pub use config::RuntimeConfig;
pub use resilience::{Admission, CircuitBreaker, CircuitBreakerConfig};
pub use secrets::{CredentialSource, SinkCredential};
pub use sink::{DraftSink, InMemorySink, SinkError, SubmissionReceipt};
pub use submitter::Submitter;

#[cfg(feature = "http")]
pub use http::HttpDraftSink;

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Wizard is not ready to submit (at step {step})")]
    NotAtReview { step: String },

    #[error("Circuit open for sink '{sink}', retry in {retry_after:?}")]
    CircuitOpen { sink: String, retry_after: Duration },

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Invalid runtime config: {0}")]
    Config(String),
}
