//! Credential handling for submission endpoints.
//!
//! Credentials are wrapped in [`SecretString`] as soon as they are loaded,
//! so they never show up in `Debug` or `Display` output. The raw value is only
//! reachable through [`SinkCredential::expose`], which should be called at
//! the point of use (setting an `Authorization` header).

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use crate::sink::SinkError;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// Bearer token for a submission endpoint.
pub struct SinkCredential {
    value: SecretString,
    source: CredentialSource,
}

impl SinkCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
        }
    }

    /// Load from an environment variable. Blank values count as unset.
    pub fn from_env(env_var: &str) -> Result<Self, SinkError> {
        match std::env::var(env_var) {
            Ok(value) if !value.trim().is_empty() => {
                Ok(Self::new(value, CredentialSource::Environment))
            }
            _ => Err(SinkError::NotConfigured(format!(
                "submission token not set: configure '{}' environment variable",
                env_var
            ))),
        }
    }

    /// Raw token. Call only where the header is set; never store the result.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for SinkCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for SinkCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "submission token from {} [REDACTED]", self.source)
    }
}
