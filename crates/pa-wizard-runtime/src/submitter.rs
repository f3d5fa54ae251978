//! Bridge from a finished wizard to an async draft sink.
//!
//! The submitter:
//! - Finishes the wizard through its own `submit`, exactly once
//! - Retries transient sink failures with exponential backoff
//! - Refuses delivery while the sink's circuit is open, and sends a single
//!   attempt when the circuit is testing recovery
//! - Returns the earlier receipt for an identical draft within the dedupe TTL

use backon::{ExponentialBuilder, Retryable};
use pa_wizard_core::{PaWizardDraft, WizardController};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{DraftFingerprint, SubmissionCache};
use crate::config::RuntimeConfig;
use crate::resilience::{Admission, CircuitBreaker};
use crate::sink::{DraftSink, SinkError, SubmissionReceipt};
use crate::RuntimeError;

enum Route {
    Cached(SubmissionReceipt),
    Deliver(Admission),
}

/// Delivers finished drafts to one sink.
pub struct Submitter {
    sink: Arc<dyn DraftSink>,
    config: RuntimeConfig,
    circuit_breaker: CircuitBreaker,
    cache: SubmissionCache,
}

impl Submitter {
    pub fn new(sink: Arc<dyn DraftSink>, config: RuntimeConfig) -> Self {
        let circuit_breaker = CircuitBreaker::new(config.circuit.clone());
        let cache = SubmissionCache::new(config.dedupe_capacity, config.dedupe_ttl);

        Self {
            sink,
            config,
            circuit_breaker,
            cache,
        }
    }

    /// Finish `wizard` and deliver its draft.
    ///
    /// Fails without touching the wizard when it is not active at the review
    /// step, or when the sink's circuit refuses delivery. Once the wizard is
    /// finished a delivery failure is returned as-is; the draft stays
    /// readable through `wizard.draft()` and can be retried with
    /// [`Submitter::submit_draft`].
    pub async fn submit_from(
        &self,
        wizard: &mut WizardController,
    ) -> Result<SubmissionReceipt, RuntimeError> {
        if !wizard.is_active() || !wizard.step().is_last() {
            return Err(RuntimeError::NotAtReview {
                step: wizard.step().to_string(),
            });
        }

        let fingerprint = DraftFingerprint::new(self.sink.name(), wizard.draft())?;
        let route = self.route(&fingerprint).await?;

        let mut finished = None;
        wizard.submit(&mut |draft: PaWizardDraft| finished = Some(draft));
        let draft = finished.ok_or_else(|| RuntimeError::NotAtReview {
            step: wizard.step().to_string(),
        })?;

        match route {
            Route::Cached(receipt) => Ok(receipt),
            Route::Deliver(admission) => self.deliver(&draft, fingerprint, admission).await,
        }
    }

    /// Deliver a draft directly.
    pub async fn submit_draft(
        &self,
        draft: &PaWizardDraft,
    ) -> Result<SubmissionReceipt, RuntimeError> {
        let fingerprint = DraftFingerprint::new(self.sink.name(), draft)?;

        match self.route(&fingerprint).await? {
            Route::Cached(receipt) => Ok(receipt),
            Route::Deliver(admission) => self.deliver(draft, fingerprint, admission).await,
        }
    }

    async fn route(&self, fingerprint: &DraftFingerprint) -> Result<Route, RuntimeError> {
        let sink_name = self.sink.name();

        if let Some(receipt) = self.cache.get(fingerprint).await {
            tracing::debug!(
                sink = sink_name,
                submission_id = %receipt.submission_id,
                "Identical draft already delivered, returning earlier receipt"
            );
            return Ok(Route::Cached(receipt));
        }

        match self.circuit_breaker.admit(sink_name) {
            Admission::Refused { retry_after } => Err(RuntimeError::CircuitOpen {
                sink: sink_name.to_string(),
                retry_after,
            }),
            admission => Ok(Route::Deliver(admission)),
        }
    }

    async fn deliver(
        &self,
        draft: &PaWizardDraft,
        fingerprint: DraftFingerprint,
        admission: Admission,
    ) -> Result<SubmissionReceipt, RuntimeError> {
        let sink_name = self.sink.name();
        let backoff = match admission {
            Admission::Trial => self.backoff().with_max_times(0),
            _ => self.backoff(),
        };

        let sink: &dyn DraftSink = self.sink.as_ref();
        let result = (|| async move { sink.submit(draft).await })
            .retry(backoff)
            .when(SinkError::is_retryable)
            .notify(|err: &SinkError, delay: Duration| {
                tracing::warn!(
                    sink = sink_name,
                    error = %err,
                    ?delay,
                    "Delivery failed, retrying"
                );
            })
            .await;

        self.circuit_breaker.record(sink_name, &result);

        match result {
            Ok(receipt) => {
                self.cache.insert(fingerprint, receipt.clone()).await;
                tracing::info!(
                    sink = sink_name,
                    submission_id = %receipt.submission_id,
                    "Prior authorization draft delivered"
                );
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(sink = sink_name, error = %err, "Delivery failed");
                Err(err.into())
            }
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.config.min_backoff)
            .with_max_delay(self.config.max_backoff)
            .with_max_times(self.config.max_retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CircuitBreakerConfig;
    use crate::sink::InMemorySink;
    use pa_wizard_core::{DraftSlice, PaType, WizardStatus, WizardStep};

    fn fast_config() -> RuntimeConfig {
        RuntimeConfig {
            max_retries: 2,
            min_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            ..Default::default()
        }
    }

    fn wizard_at_review() -> WizardController {
        let mut wizard =
            WizardController::with_draft(PaWizardDraft::for_category(PaType::Outpatient));
        for _ in 0..WizardStep::COUNT {
            wizard.go_next();
        }
        wizard
    }

    #[tokio::test]
    async fn test_submit_from_review_delivers_once() {
        let sink = Arc::new(InMemorySink::new("memory"));
        let submitter = Submitter::new(sink.clone(), fast_config());
        let mut wizard = wizard_at_review();

        let receipt = submitter.submit_from(&mut wizard).await.unwrap();
        assert_eq!(receipt.sink, "memory");
        assert_eq!(wizard.status(), WizardStatus::Submitted);
        assert_eq!(sink.delivered().len(), 1);
        assert_eq!(sink.delivered()[0].category(), PaType::Outpatient);

        let again = submitter.submit_from(&mut wizard).await;
        assert!(matches!(again, Err(RuntimeError::NotAtReview { .. })));
        assert_eq!(sink.attempts(), 1);
    }

    #[tokio::test]
    async fn test_submit_before_review_leaves_wizard_active() {
        let sink = Arc::new(InMemorySink::new("memory"));
        let submitter = Submitter::new(sink.clone(), fast_config());
        let mut wizard = WizardController::new();

        let result = submitter.submit_from(&mut wizard).await;
        assert!(matches!(result, Err(RuntimeError::NotAtReview { .. })));
        assert!(wizard.is_active());
        assert_eq!(sink.attempts(), 0);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let sink = Arc::new(InMemorySink::new("memory"));
        sink.fail_next(SinkError::Unavailable);
        sink.fail_next(SinkError::Transport("connection reset".to_string()));
        let submitter = Submitter::new(sink.clone(), fast_config());

        let receipt = submitter.submit_draft(&PaWizardDraft::new()).await.unwrap();
        assert_eq!(receipt.submission_id, "mem-1");
        assert_eq!(sink.attempts(), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let sink = Arc::new(InMemorySink::new("memory"));
        for _ in 0..5 {
            sink.fail_next(SinkError::Unavailable);
        }
        let submitter = Submitter::new(sink.clone(), fast_config());

        let result = submitter.submit_draft(&PaWizardDraft::new()).await;
        assert!(matches!(result, Err(RuntimeError::Sink(SinkError::Unavailable))));
        assert_eq!(sink.attempts(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let sink = Arc::new(InMemorySink::new("memory"));
        sink.fail_next(SinkError::AuthError);
        let submitter = Submitter::new(sink.clone(), fast_config());

        let result = submitter.submit_draft(&PaWizardDraft::new()).await;
        assert!(matches!(result, Err(RuntimeError::Sink(SinkError::AuthError))));
        assert_eq!(sink.attempts(), 1);
    }

    #[tokio::test]
    async fn test_open_circuit_refuses_delivery() {
        let sink = Arc::new(InMemorySink::new("memory"));
        for _ in 0..3 {
            sink.fail_next(SinkError::Unavailable);
        }
        let config = RuntimeConfig {
            circuit: CircuitBreakerConfig {
                failure_threshold: 1,
                recovery_timeout: Duration::from_secs(60),
            },
            ..fast_config()
        };
        let submitter = Submitter::new(sink.clone(), config);

        assert!(submitter.submit_draft(&PaWizardDraft::new()).await.is_err());
        assert_eq!(sink.attempts(), 3);

        let mut wizard = wizard_at_review();
        let result = submitter.submit_from(&mut wizard).await;
        assert!(matches!(result, Err(RuntimeError::CircuitOpen { .. })));
        assert!(wizard.is_active());
        assert_eq!(sink.attempts(), 3);
    }

    #[tokio::test]
    async fn test_rejected_draft_does_not_open_circuit() {
        let sink = Arc::new(InMemorySink::new("memory"));
        sink.fail_next(SinkError::Rejected {
            status: 422,
            message: "invalid member id".to_string(),
        });
        let config = RuntimeConfig {
            circuit: CircuitBreakerConfig {
                failure_threshold: 1,
                recovery_timeout: Duration::from_secs(60),
            },
            ..fast_config()
        };
        let submitter = Submitter::new(sink.clone(), config);

        let result = submitter.submit_draft(&PaWizardDraft::new()).await;
        assert!(matches!(result, Err(RuntimeError::Sink(SinkError::Rejected { .. }))));

        let mut wizard = wizard_at_review();
        assert!(submitter.submit_from(&mut wizard).await.is_ok());
        assert_eq!(sink.attempts(), 2);
    }

    #[tokio::test]
    async fn test_recovery_trial_is_a_single_attempt() {
        let sink = Arc::new(InMemorySink::new("memory"));
        for _ in 0..4 {
            sink.fail_next(SinkError::Unavailable);
        }
        let config = RuntimeConfig {
            circuit: CircuitBreakerConfig {
                failure_threshold: 1,
                recovery_timeout: Duration::from_millis(10),
            },
            ..fast_config()
        };
        let submitter = Submitter::new(sink.clone(), config);
        let draft = PaWizardDraft::for_category(PaType::Imaging);

        assert!(submitter.submit_draft(&draft).await.is_err());
        assert_eq!(sink.attempts(), 3);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(submitter.submit_draft(&draft).await.is_err());
        assert_eq!(sink.attempts(), 4);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let receipt = submitter.submit_draft(&draft).await.unwrap();
        assert_eq!(receipt.submission_id, "mem-1");
        assert_eq!(sink.attempts(), 5);
    }

    #[tokio::test]
    async fn test_identical_draft_returns_cached_receipt() {
        let sink = Arc::new(InMemorySink::new("memory"));
        let submitter = Submitter::new(sink.clone(), fast_config());
        let draft = PaWizardDraft::for_category(PaType::Pharmacy);

        let first = submitter.submit_draft(&draft).await.unwrap();
        let second = submitter.submit_draft(&draft).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(sink.delivered().len(), 1);

        let edited = draft.with_slice(DraftSlice::Notes("refill".to_string()));
        let third = submitter.submit_draft(&edited).await.unwrap();
        assert_ne!(third.submission_id, first.submission_id);
        assert_eq!(sink.delivered().len(), 2);
    }
}
