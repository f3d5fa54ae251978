//! Runtime configuration.
//!
//! Durations are written as human-readable strings (`"250ms"`, `"10m"`).
//! Every field has a default, so an empty object is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::resilience::CircuitBreakerConfig;
use crate::RuntimeError;

/// Settings for [`Submitter`](crate::Submitter) and the HTTP sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Retries after the first attempt for retryable sink errors
    pub max_retries: usize,

    /// First backoff delay
    #[serde(with = "duration_str")]
    pub min_backoff: Duration,

    /// Backoff ceiling
    #[serde(with = "duration_str")]
    pub max_backoff: Duration,

    /// How long an identical draft maps to its earlier receipt
    #[serde(with = "duration_str")]
    pub dedupe_ttl: Duration,

    /// Receipts remembered for deduplication
    pub dedupe_capacity: u64,

    /// Per-sink circuit breaker
    pub circuit: CircuitBreakerConfig,

    /// Submission endpoint for the HTTP sink
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the bearer token
    pub token_env: String,

    #[serde(with = "duration_str")]
    pub request_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            dedupe_ttl: Duration::from_secs(600),
            dedupe_capacity: 1_000,
            circuit: CircuitBreakerConfig::default(),
            endpoint: None,
            token_env: "PA_WIZARD_SUBMIT_TOKEN".to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl RuntimeConfig {
    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RuntimeError> {
        serde_json::from_str(json).map_err(|e| RuntimeError::Config(e.to_string()))
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RuntimeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }
}

pub(crate) mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
