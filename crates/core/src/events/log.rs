//! Monitor that writes breaker activity to `tracing`

use super::{CircuitState, Monitor, Outcome};
use tracing::{debug, info};

/// Forwards outcomes at debug level and transitions at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMonitor;

impl Monitor for LogMonitor {
    fn notify(&self, breaker: &str, outcome: Outcome) {
        debug!(breaker = %breaker, outcome = %outcome, "breaker outcome");
    }

    fn transition(&self, breaker: &str, from: CircuitState, to: CircuitState) {
        info!(breaker = %breaker, from = %from, to = %to, "breaker state change");
    }
}
