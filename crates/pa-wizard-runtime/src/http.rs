//! HTTP submission endpoint.
//!
//! POSTs the draft as JSON and expects `{"submissionId": "..."}` back.

use async_trait::async_trait;
use pa_wizard_core::PaWizardDraft;
use serde::Deserialize;
use std::time::Duration;

use crate::config::RuntimeConfig;
use crate::secrets::SinkCredential;
use crate::sink::{DraftSink, SinkError, SubmissionReceipt};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionAck {
    #[serde(alias = "id", alias = "referenceNumber")]
    submission_id: String,
}

/// Sink that delivers drafts to an HTTP endpoint.
pub struct HttpDraftSink {
    client: reqwest::Client,
    endpoint: String,
    credential: Option<SinkCredential>,
    timeout: Duration,
}

impl std::fmt::Debug for HttpDraftSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDraftSink")
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpDraftSink {
    pub fn new(endpoint: impl Into<String>, credential: Option<SinkCredential>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            credential,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from runtime config, reading the token from `token_env`.
    ///
    /// A missing token is allowed (unauthenticated endpoint); a missing
    /// endpoint is not.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, SinkError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| SinkError::NotConfigured("endpoint".to_string()))?;

        let credential = SinkCredential::from_env(&config.token_env).ok();
        if credential.is_none() {
            tracing::warn!(
                env = %config.token_env,
                "No submission token set, sending unauthenticated"
            );
        }

        Ok(Self::new(endpoint, credential).with_timeout(config.request_timeout))
    }
}

#[async_trait]
impl DraftSink for HttpDraftSink {
    async fn submit(&self, draft: &PaWizardDraft) -> Result<SubmissionReceipt, SinkError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(draft);

        if let Some(credential) = &self.credential {
            request = request.bearer_auth(credential.expose());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SinkError::Timeout(self.timeout)
            } else {
                SinkError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(SinkError::AuthError);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let ack: SubmissionAck = response
            .json()
            .await
            .map_err(|e| SinkError::Serialization(e.to_string()))?;

        Ok(SubmissionReceipt::new(ack.submission_id, self.name()))
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}
