//! Counting monitor for aggregate observability

use super::{CircuitState, Monitor, Outcome};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monitor that keeps lifetime counters per breaker.
///
/// Unlike a breaker's rolling window these counters never decay, which makes
/// them suitable for export to an external metrics system.
#[derive(Debug, Default)]
pub struct CountingMonitor {
    breakers: DashMap<String, OutcomeCounters>,
}

/// Thread-safe atomic counters for one breaker
#[derive(Debug, Default)]
struct OutcomeCounters {
    success: AtomicU64,
    failure: AtomicU64,
    timeout: AtomicU64,
    short_circuited: AtomicU64,
    transitions: AtomicU64,
    opened: AtomicU64,
}

impl OutcomeCounters {
    fn counter(&self, outcome: Outcome) -> &AtomicU64 {
        match outcome {
            Outcome::Success => &self.success,
            Outcome::Failure => &self.failure,
            Outcome::Timeout => &self.timeout,
            Outcome::ShortCircuited => &self.short_circuited,
        }
    }

    fn totals(&self) -> OutcomeTotals {
        OutcomeTotals {
            success: self.success.load(Ordering::Relaxed),
            failure: self.failure.load(Ordering::Relaxed),
            timeout: self.timeout.load(Ordering::Relaxed),
            short_circuited: self.short_circuited.load(Ordering::Relaxed),
            transitions: self.transitions.load(Ordering::Relaxed),
            opened: self.opened.load(Ordering::Relaxed),
        }
    }
}

/// Lifetime totals for one breaker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTotals {
    pub success: u64,
    pub failure: u64,
    pub timeout: u64,
    pub short_circuited: u64,
    /// Number of state changes of any kind
    pub transitions: u64,
    /// Number of times the breaker entered the open state
    pub opened: u64,
}

impl OutcomeTotals {
    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Success => self.success,
            Outcome::Failure => self.failure,
            Outcome::Timeout => self.timeout,
            Outcome::ShortCircuited => self.short_circuited,
        }
    }
}

/// Snapshot of every breaker seen by a `CountingMonitor`
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorSummary {
    pub breakers: BTreeMap<String, OutcomeTotals>,
}

impl MonitorSummary {
    /// Sum of one outcome across all breakers
    pub fn total(&self, outcome: Outcome) -> u64 {
        self.breakers.values().map(|totals| totals.get(outcome)).sum()
    }
}

impl CountingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals for one breaker, if it has reported anything
    pub fn totals(&self, breaker: &str) -> Option<OutcomeTotals> {
        self.breakers.get(breaker).map(|counters| counters.totals())
    }

    pub fn summary(&self) -> MonitorSummary {
        let breakers = self
            .breakers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().totals()))
            .collect();
        MonitorSummary { breakers }
    }

    fn counters(&self, breaker: &str) -> dashmap::mapref::one::Ref<'_, String, OutcomeCounters> {
        if let Some(counters) = self.breakers.get(breaker) {
            return counters;
        }
        self.breakers
            .entry(breaker.to_string())
            .or_default()
            .downgrade()
    }
}

impl Monitor for CountingMonitor {
    fn notify(&self, breaker: &str, outcome: Outcome) {
        self.counters(breaker)
            .counter(outcome)
            .fetch_add(1, Ordering::Relaxed);
    }

    fn transition(&self, breaker: &str, _from: CircuitState, to: CircuitState) {
        let counters = self.counters(breaker);
        counters.transitions.fetch_add(1, Ordering::Relaxed);
        if to == CircuitState::Open {
            counters.opened.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counts_per_breaker() {
        let monitor = CountingMonitor::new();
        monitor.notify("db", Outcome::Success);
        monitor.notify("db", Outcome::Success);
        monitor.notify("db", Outcome::Timeout);
        monitor.notify("cache", Outcome::ShortCircuited);
        monitor.transition("db", CircuitState::Closed, CircuitState::Open);
        monitor.transition("db", CircuitState::Open, CircuitState::HalfOpen);

        let db = monitor.totals("db").unwrap();
        assert_eq!(db.success, 2);
        assert_eq!(db.timeout, 1);
        assert_eq!(db.failure, 0);
        assert_eq!(db.transitions, 2);
        assert_eq!(db.opened, 1);

        let summary = monitor.summary();
        assert_eq!(summary.breakers.len(), 2);
        assert_eq!(summary.total(Outcome::ShortCircuited), 1);
        assert!(monitor.totals("unknown").is_none());
    }

    #[test]
    fn test_concurrent_notifications() {
        let monitor = Arc::new(CountingMonitor::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let monitor = Arc::clone(&monitor);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        monitor.notify("db", Outcome::Failure);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(monitor.totals("db").unwrap().failure, 8000);
    }

    #[test]
    fn test_summary_serializes() {
        let monitor = CountingMonitor::new();
        monitor.notify("db", Outcome::Failure);
        let json = serde_json::to_value(monitor.summary()).unwrap();
        assert_eq!(json["breakers"]["db"]["failure"], 1);
    }
}
