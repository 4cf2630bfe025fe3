//! The monitor trait breakers report into

use super::{CircuitState, Outcome};

/// Sink for breaker activity.
///
/// A breaker calls `notify` once per guarded call (never for bypassed calls)
/// and `transition` whenever its state changes. Implementations are
/// fire-and-forget: they cannot fail the call they observe, and breakers
/// isolate panics raised from them.
pub trait Monitor: Send + Sync {
    /// Record the outcome of one guarded call on the named breaker
    fn notify(&self, breaker: &str, outcome: Outcome);

    /// Record a state change on the named breaker
    fn transition(&self, _breaker: &str, _from: CircuitState, _to: CircuitState) {}
}

/// Monitor that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMonitor;

impl Monitor for NoopMonitor {
    fn notify(&self, _breaker: &str, _outcome: Outcome) {}
}

impl<F> Monitor for F
where
    F: Fn(&str, Outcome) + Send + Sync,
{
    fn notify(&self, breaker: &str, outcome: Outcome) {
        self(breaker, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_monitor() {
        let seen = Mutex::new(Vec::new());
        let monitor = |breaker: &str, outcome: Outcome| {
            seen.lock().unwrap().push(format!("{breaker}:{outcome}"));
        };

        monitor.notify("db", Outcome::Success);
        monitor.notify("db", Outcome::ShortCircuited);
        monitor.transition("db", CircuitState::Closed, CircuitState::Open);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["db:success".to_string(), "db:short_circuited".to_string()]
        );
    }

    #[test]
    fn test_noop_monitor_as_trait_object() {
        let monitor: Box<dyn Monitor> = Box::new(NoopMonitor);
        monitor.notify("db", Outcome::Failure);
        monitor.transition("db", CircuitState::Open, CircuitState::HalfOpen);
    }
}
