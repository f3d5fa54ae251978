//! Resilience patterns for draft delivery.
//!
//! Retry with backoff is applied by the submitter; this module holds the
//! per-sink circuit breaker.

mod circuit_breaker;

pub use circuit_breaker::{Admission, CircuitBreaker, CircuitBreakerConfig};
