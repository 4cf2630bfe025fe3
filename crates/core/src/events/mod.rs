//! Outcome vocabulary and the monitor seam
//!
//! Breakers describe everything they do with two small enums: the `Outcome`
//! of each guarded call and the `CircuitState` they move between. Both are
//! handed to a `Monitor`, which is the only channel through which a breaker
//! talks to the outside world.

pub mod log;
pub mod metrics;
pub mod monitor;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use log::LogMonitor;
pub use metrics::{CountingMonitor, MonitorSummary, OutcomeTotals};
pub use monitor::{Monitor, NoopMonitor};

/// How a single guarded call was accounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The work returned normally in time, or failed with a tolerated error
    Success,
    /// The work returned an error that is not tolerated
    Failure,
    /// The work returned normally but took longer than the request timeout
    Timeout,
    /// The breaker rejected the call without running the work
    ShortCircuited,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::Success,
        Outcome::Failure,
        Outcome::Timeout,
        Outcome::ShortCircuited,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Timeout => "timeout",
            Outcome::ShortCircuited => "short_circuited",
        }
    }

    /// True for outcomes that count against the error rate
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Failure | Outcome::Timeout)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Circuit is closed - requests pass through normally
    Closed,
    /// Circuit is open - requests fail immediately
    Open,
    /// Circuit is half-open - a single trial request tests recovery
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_outcomes() {
        assert!(Outcome::Failure.is_error());
        assert!(Outcome::Timeout.is_error());
        assert!(!Outcome::Success.is_error());
        assert!(!Outcome::ShortCircuited.is_error());
    }

    #[test]
    fn test_serde_names_match_display() {
        for outcome in Outcome::ALL {
            let json = serde_json::to_string(&outcome).unwrap();
            assert_eq!(json, format!("\"{outcome}\""));
        }

        let state: CircuitState = serde_json::from_str("\"half_open\"").unwrap();
        assert_eq!(state, CircuitState::HalfOpen);
        assert_eq!(state.to_string(), "half_open");
    }
}
