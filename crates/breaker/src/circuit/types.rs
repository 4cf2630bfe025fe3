//! Core types for circuit breaker functionality.

pub use fusebox_core::{CircuitState, Outcome};
use serde::Serialize;
use std::time::Instant;

/// How a request should interact with the breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Admission check, classification, accounting and monitoring
    #[default]
    Guarded,
    /// Run the work directly; nothing is recorded and no state is touched
    Bypass,
}

/// Outcome counts over the rolling window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub success: u64,
    pub failure: u64,
    pub timeout: u64,
    pub short_circuited: u64,
}

impl MetricsSnapshot {
    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Success => self.success,
            Outcome::Failure => self.failure,
            Outcome::Timeout => self.timeout,
            Outcome::ShortCircuited => self.short_circuited,
        }
    }

    pub(crate) fn record(&mut self, outcome: Outcome) {
        let slot = match outcome {
            Outcome::Success => &mut self.success,
            Outcome::Failure => &mut self.failure,
            Outcome::Timeout => &mut self.timeout,
            Outcome::ShortCircuited => &mut self.short_circuited,
        };
        *slot = slot.saturating_add(1);
    }

    pub(crate) fn merge(&mut self, other: &MetricsSnapshot) {
        self.success = self.success.saturating_add(other.success);
        self.failure = self.failure.saturating_add(other.failure);
        self.timeout = self.timeout.saturating_add(other.timeout);
        self.short_circuited = self.short_circuited.saturating_add(other.short_circuited);
    }

    /// Calls that reached the classifier; short-circuits are excluded
    pub fn total_volume(&self) -> u64 {
        self.success
            .saturating_add(self.failure)
            .saturating_add(self.timeout)
    }

    /// Share of failures and timeouts in the volume, 0.0 when there is none
    pub fn error_rate(&self) -> f64 {
        let volume = self.total_volume();
        if volume == 0 {
            return 0.0;
        }
        self.failure.saturating_add(self.timeout) as f64 / volume as f64
    }
}

/// Statistics about circuit breaker state
#[derive(Debug, Clone)]
pub struct BreakerStats {
    pub name: String,
    pub state: CircuitState,
    pub metrics: MetricsSnapshot,
    pub error_rate: f64,
    /// Incremented on every state change
    pub generation: u64,
    pub last_state_change: Instant,
}
