//! Per-sink circuit breaker for draft delivery.
//!
//! Only failures that say the sink could not be reached count against it.
//! A draft the sink rejected, or a bad token, proves the sink is up and
//! closes the circuit like a delivery does.
//!
//! Once the recovery timeout has passed, exactly one trial delivery is let
//! through. Other submissions are refused while it runs. Its outcome closes
//! the circuit or reopens it for another timeout.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::duration_str;
use crate::sink::SinkError;

/// Circuit breaker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive unreachable deliveries before the circuit opens
    pub failure_threshold: u32,

    /// How long an open circuit refuses deliveries before a trial
    #[serde(with = "duration_str")]
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

/// Answer to a request to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Circuit closed
    Allowed,
    /// The single recovery trial; deliver once, without retries
    Trial,
    /// Circuit open or a trial is running
    Refused { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
enum Circuit {
    Closed { unreachable: u32 },
    Open { since: Instant },
    Trial { since: Instant },
}

/// Circuit breaker keyed by sink name.
#[derive(Debug)]
pub struct CircuitBreaker {
    circuits: Mutex<HashMap<String, Circuit>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Ask to deliver to `sink`.
    ///
    /// A `Trial` answer must be followed by [`CircuitBreaker::record`]. A
    /// trial that never reports back is replaced after another recovery
    /// timeout.
    pub fn admit(&self, sink: &str) -> Admission {
        let timeout = self.config.recovery_timeout;
        let mut circuits = self.circuits.lock();

        let since = match circuits.get(sink).copied() {
            None | Some(Circuit::Closed { .. }) => return Admission::Allowed,
            Some(Circuit::Open { since }) | Some(Circuit::Trial { since }) => since,
        };

        let waited = since.elapsed();
        if waited < timeout {
            return Admission::Refused {
                retry_after: timeout - waited,
            };
        }

        circuits.insert(
            sink.to_string(),
            Circuit::Trial {
                since: Instant::now(),
            },
        );
        tracing::info!(sink, "Circuit half-open, allowing one trial delivery");
        Admission::Trial
    }

    /// Record the final outcome of an admitted delivery.
    pub fn record<T>(&self, sink: &str, outcome: &Result<T, SinkError>) {
        match outcome {
            Err(err) if err.is_retryable() => self.unreachable(sink, err),
            _ => self.reachable(sink),
        }
    }

    fn reachable(&self, sink: &str) {
        let previous = self
            .circuits
            .lock()
            .insert(sink.to_string(), Circuit::Closed { unreachable: 0 });

        if matches!(previous, Some(Circuit::Trial { .. } | Circuit::Open { .. })) {
            tracing::info!(sink, "Circuit closed, sink reachable again");
        }
    }

    fn unreachable(&self, sink: &str, err: &SinkError) {
        let mut circuits = self.circuits.lock();
        let unreachable = match circuits.get(sink).copied() {
            None => 1,
            Some(Circuit::Closed { unreachable }) => unreachable + 1,
            Some(Circuit::Trial { .. }) => {
                circuits.insert(
                    sink.to_string(),
                    Circuit::Open {
                        since: Instant::now(),
                    },
                );
                tracing::warn!(sink, error = %err, "Trial delivery failed, circuit reopened");
                return;
            }
            Some(Circuit::Open { .. }) => return,
        };

        if unreachable >= self.config.failure_threshold {
            circuits.insert(
                sink.to_string(),
                Circuit::Open {
                    since: Instant::now(),
                },
            );
            tracing::warn!(sink, unreachable, error = %err, "Sink unreachable, circuit opened");
        } else {
            circuits.insert(sink.to_string(), Circuit::Closed { unreachable });
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINK: &str = "payer-gateway";

    fn unreachable() -> Result<(), SinkError> {
        Err(SinkError::Unavailable)
    }

    fn breaker(failure_threshold: u32, recovery_timeout: Duration) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold,
            recovery_timeout,
        })
    }

    #[test]
    fn test_opens_after_consecutive_unreachable_deliveries() {
        let cb = breaker(2, Duration::from_secs(60));

        cb.record(SINK, &unreachable());
        assert_eq!(cb.admit(SINK), Admission::Allowed);

        cb.record(SINK, &unreachable());
        assert!(matches!(cb.admit(SINK), Admission::Refused { .. }));
        assert_eq!(cb.admit("archive"), Admission::Allowed);
    }

    #[test]
    fn test_rejections_prove_sink_is_up() {
        let cb = breaker(2, Duration::from_secs(60));
        let rejected: Result<(), SinkError> = Err(SinkError::Rejected {
            status: 422,
            message: "missing member id".to_string(),
        });

        cb.record(SINK, &unreachable());
        cb.record(SINK, &rejected);
        cb.record(SINK, &Err::<(), _>(SinkError::AuthError));
        cb.record(SINK, &unreachable());
        assert_eq!(cb.admit(SINK), Admission::Allowed);
    }

    #[test]
    fn test_refusal_reports_remaining_wait() {
        let cb = breaker(1, Duration::from_secs(60));
        cb.record(SINK, &unreachable());

        match cb.admit(SINK) {
            Admission::Refused { retry_after } => {
                assert!(retry_after <= Duration::from_secs(60));
                assert!(retry_after > Duration::from_secs(50));
            }
            other => panic!("expected refusal, got {:?}", other),
        }
    }

    #[test]
    fn test_single_trial_while_half_open() {
        let cb = breaker(1, Duration::from_millis(20));
        cb.record(SINK, &unreachable());
        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(cb.admit(SINK), Admission::Trial);
        assert!(matches!(cb.admit(SINK), Admission::Refused { .. }));

        cb.record(SINK, &Ok::<_, SinkError>(()));
        assert_eq!(cb.admit(SINK), Admission::Allowed);
    }

    #[test]
    fn test_failed_trial_reopens() {
        let cb = breaker(1, Duration::from_millis(20));
        cb.record(SINK, &unreachable());
        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(cb.admit(SINK), Admission::Trial);
        cb.record(SINK, &unreachable());
        assert!(matches!(cb.admit(SINK), Admission::Refused { .. }));

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cb.admit(SINK), Admission::Trial);
    }
}
