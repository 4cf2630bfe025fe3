//! State transition logic for circuit breaker.
//!
//! `CircuitCore` is everything a breaker mutates per request: its state, the
//! rolling window, and the bookkeeping for the half-open trial. It is only
//! ever touched under the breaker's lock, so admission, recording and the
//! transition that follows happen as one unit.

use super::config::BreakerConfig;
use super::types::{CircuitState, MetricsSnapshot, Outcome};
use super::window::RollingWindow;
use std::time::Instant;

/// A state change produced by the core, announced once the lock is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: CircuitState,
    pub to: CircuitState,
}

/// Result of asking the core to admit a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Run the work. `trial` marks the single half-open probe.
    Admitted { generation: u64, trial: bool },
    /// Do not run the work; a short-circuit has been recorded
    Rejected,
}

/// Mutable breaker state guarded by the breaker's lock
#[derive(Debug)]
pub struct CircuitCore {
    state: CircuitState,
    window: RollingWindow,
    generation: u64,
    last_state_change: Instant,
    trial_in_flight: bool,
}

impl CircuitCore {
    pub fn new(config: &BreakerConfig, now: Instant) -> Self {
        Self {
            state: CircuitState::Closed,
            window: RollingWindow::new(now, config.rolling_window, config.rolling_buckets),
            generation: 0,
            last_state_change: now,
            trial_in_flight: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_state_change(&self) -> Instant {
        self.last_state_change
    }

    pub fn counts(&self, now: Instant) -> MetricsSnapshot {
        self.window.counts(now)
    }

    /// State as a caller would observe it at `now`.
    ///
    /// An open breaker whose sleep window has elapsed reports half-open; the
    /// transition itself only happens when the next request is admitted.
    pub fn state(&self, config: &BreakerConfig, now: Instant) -> CircuitState {
        if config.force_open {
            return CircuitState::Open;
        }
        match self.state {
            CircuitState::Open if self.sleep_elapsed(config, now) => CircuitState::HalfOpen,
            state => state,
        }
    }

    fn sleep_elapsed(&self, config: &BreakerConfig, now: Instant) -> bool {
        now.saturating_duration_since(self.last_state_change) >= config.sleep_window
    }

    fn transition_to(&mut self, to: CircuitState, now: Instant) -> Option<StateChange> {
        if self.state == to {
            return None;
        }
        let from = self.state;
        self.state = to;
        self.last_state_change = now;
        self.generation += 1;
        self.trial_in_flight = false;
        if to == CircuitState::Closed {
            self.window.reset();
        }
        Some(StateChange { from, to })
    }

    /// Decide whether a request may run, recording a short-circuit if not
    pub fn admit(
        &mut self,
        config: &BreakerConfig,
        now: Instant,
    ) -> (Admission, Option<StateChange>) {
        if config.force_open {
            return (self.reject(now), None);
        }

        match self.state {
            CircuitState::Closed => (self.admitted(false), None),
            CircuitState::Open if self.sleep_elapsed(config, now) => {
                let change = self.transition_to(CircuitState::HalfOpen, now);
                self.trial_in_flight = true;
                (self.admitted(true), change)
            }
            CircuitState::Open => (self.reject(now), None),
            CircuitState::HalfOpen if !self.trial_in_flight => {
                self.trial_in_flight = true;
                (self.admitted(true), None)
            }
            CircuitState::HalfOpen => (self.reject(now), None),
        }
    }

    fn admitted(&self, trial: bool) -> Admission {
        Admission::Admitted {
            generation: self.generation,
            trial,
        }
    }

    fn reject(&mut self, now: Instant) -> Admission {
        self.window.record(now, Outcome::ShortCircuited);
        Admission::Rejected
    }

    /// Record a classified outcome and apply any transition it causes.
    ///
    /// Outcomes admitted under an older generation are counted but never
    /// drive a transition.
    pub fn complete(
        &mut self,
        config: &BreakerConfig,
        now: Instant,
        generation: u64,
        trial: bool,
        outcome: Outcome,
    ) -> Option<StateChange> {
        if generation != self.generation {
            self.window.record(now, outcome);
            return None;
        }

        match self.state {
            CircuitState::HalfOpen if trial => {
                // Transition first so a successful trial is the first count
                // of the freshly closed window.
                let to = if outcome.is_error() {
                    CircuitState::Open
                } else {
                    CircuitState::Closed
                };
                let change = self.transition_to(to, now);
                self.window.record(now, outcome);
                change
            }
            CircuitState::Closed => {
                self.window.record(now, outcome);
                if !config.force_closed && self.should_trip(config, now) {
                    self.transition_to(CircuitState::Open, now)
                } else {
                    None
                }
            }
            CircuitState::HalfOpen | CircuitState::Open => {
                self.window.record(now, outcome);
                None
            }
        }
    }

    /// Account for a permit whose work never completed (panicked or was dropped).
    ///
    /// The request still counts: as a timeout if it had outlived the request
    /// timeout, otherwise as a failure. It then drives transitions exactly
    /// like a completed request, so an abandoned trial reopens the breaker.
    pub fn abandon(
        &mut self,
        config: &BreakerConfig,
        now: Instant,
        started: Instant,
        generation: u64,
        trial: bool,
    ) -> (Outcome, Option<StateChange>) {
        let outcome = if now.saturating_duration_since(started) > config.request_timeout {
            Outcome::Timeout
        } else {
            Outcome::Failure
        };
        let change = self.complete(config, now, generation, trial, outcome);
        (outcome, change)
    }

    fn should_trip(&self, config: &BreakerConfig, now: Instant) -> bool {
        let counts = self.window.counts(now);
        counts.total_volume() >= u64::from(config.request_volume_threshold)
            && counts.error_rate() >= config.error_threshold_percentage
    }
}
