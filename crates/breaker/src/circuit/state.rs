//! Circuit breaker state management and execution logic.

use super::classifier::{classify, TolerableError, TolerableErrors};
use super::clock::{Clock, SystemClock};
use super::config::BreakerConfig;
use super::transitions::{Admission, CircuitCore, StateChange};
use super::types::{BreakerStats, CircuitState, MetricsSnapshot, Outcome, RequestMode};
use fusebox_core::{Monitor, NoopMonitor, RequestError, Result, ShortCircuitedError};
use parking_lot::{Mutex, RwLock};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Span};

/// Circuit breaker implementation
pub struct Breaker {
    name: String,
    config: BreakerConfig,
    core: Mutex<CircuitCore>,
    tolerable: RwLock<TolerableErrors>,
    monitor: Arc<dyn Monitor>,
    clock: Arc<dyn Clock>,
    span: Span,
}

/// Builder for a `Breaker` with injected collaborators
pub struct BreakerBuilder {
    name: String,
    config: BreakerConfig,
    monitor: Option<Arc<dyn Monitor>>,
    clock: Option<Arc<dyn Clock>>,
    span: Option<Span>,
    tolerable: TolerableErrors,
}

impl BreakerBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: BreakerConfig::default(),
            monitor: None,
            clock: None,
            span: None,
            tolerable: TolerableErrors::new(),
        }
    }

    pub fn config(mut self, config: BreakerConfig) -> Self {
        self.config = config;
        self
    }

    /// Monitor notified of every guarded outcome (default: `NoopMonitor`)
    pub fn monitor(mut self, monitor: Arc<dyn Monitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Time source (default: `SystemClock`)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Span that transition logs are emitted in (default: `breaker{name}`)
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn tolerate(mut self, entry: TolerableError) -> Self {
        self.tolerable.push(entry);
        self
    }

    /// Validate the configuration and build the breaker
    pub fn build(self) -> Result<Breaker> {
        self.config.validate()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let span = self
            .span
            .unwrap_or_else(|| crate::telemetry::breaker_span(&self.name));
        let core = CircuitCore::new(&self.config, clock.now());

        Ok(Breaker {
            name: self.name,
            config: self.config,
            core: Mutex::new(core),
            tolerable: RwLock::new(self.tolerable),
            monitor: self.monitor.unwrap_or_else(|| Arc::new(NoopMonitor)),
            clock,
            span,
        })
    }
}

/// Admission to run work, released on completion or drop
struct Permit<'a> {
    breaker: &'a Breaker,
    generation: u64,
    trial: bool,
    started: Instant,
    settled: bool,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.abandon(self);
        }
    }
}

impl Breaker {
    /// Create a new breaker with the given configuration
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Result<Self> {
        Self::builder(name).config(config).build()
    }

    pub fn builder(name: impl Into<String>) -> BreakerBuilder {
        BreakerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn request_timeout(&self) -> Duration {
        self.config.request_timeout
    }

    /// Get the current state of the circuit
    pub fn state(&self) -> CircuitState {
        let now = self.clock.now();
        self.core.lock().state(&self.config, now)
    }

    /// Outcome counts over the rolling window
    pub fn metrics(&self) -> MetricsSnapshot {
        let now = self.clock.now();
        self.core.lock().counts(now)
    }

    /// Get current circuit breaker statistics
    pub fn stats(&self) -> BreakerStats {
        let now = self.clock.now();
        let core = self.core.lock();
        let metrics = core.counts(now);
        BreakerStats {
            name: self.name.clone(),
            state: core.state(&self.config, now),
            error_rate: metrics.error_rate(),
            metrics,
            generation: core.generation(),
            last_state_change: core.last_state_change(),
        }
    }

    /// Add an error kind that should count as success
    pub fn tolerate(&self, entry: TolerableError) {
        self.tolerable.write().push(entry);
    }

    /// Edit the ordered tolerable error list in place.
    ///
    /// The list is locked only for the duration of `edit`; do not issue
    /// requests through this breaker from inside it.
    pub fn edit_tolerable_errors<R>(&self, edit: impl FnOnce(&mut TolerableErrors) -> R) -> R {
        edit(&mut self.tolerable.write())
    }

    /// Labels of the tolerable error markers, in match order
    pub fn tolerable_error_labels(&self) -> Vec<String> {
        self.tolerable.read().labels()
    }

    /// Run `work` through the breaker
    pub fn request<T, E, F>(&self, work: F) -> std::result::Result<T, RequestError<E>>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: StdError + 'static,
    {
        self.request_with(RequestMode::Guarded, work)
    }

    /// Run `work` through the breaker, or around it when bypassing
    pub fn request_with<T, E, F>(
        &self,
        mode: RequestMode,
        work: F,
    ) -> std::result::Result<T, RequestError<E>>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: StdError + 'static,
    {
        if mode == RequestMode::Bypass {
            return work().map_err(RequestError::Failed);
        }

        let permit = self.admit()?;
        let result = work();
        self.settle(permit, result.as_ref().err().map(|err| err as &(dyn StdError + 'static)));
        result.map_err(RequestError::Failed)
    }

    /// Await `work` through the breaker.
    ///
    /// The breaker's lock is never held across an await point. Dropping the
    /// returned future before `work` finishes abandons the request.
    pub async fn request_async<T, E, Fut>(
        &self,
        work: Fut,
    ) -> std::result::Result<T, RequestError<E>>
    where
        Fut: Future<Output = std::result::Result<T, E>>,
        E: StdError + 'static,
    {
        self.request_async_with(RequestMode::Guarded, work).await
    }

    pub async fn request_async_with<T, E, Fut>(
        &self,
        mode: RequestMode,
        work: Fut,
    ) -> std::result::Result<T, RequestError<E>>
    where
        Fut: Future<Output = std::result::Result<T, E>>,
        E: StdError + 'static,
    {
        if mode == RequestMode::Bypass {
            return work.await.map_err(RequestError::Failed);
        }

        let permit = self.admit()?;
        let result = work.await;
        self.settle(permit, result.as_ref().err().map(|err| err as &(dyn StdError + 'static)));
        result.map_err(RequestError::Failed)
    }

    fn admit(&self) -> std::result::Result<Permit<'_>, ShortCircuitedError> {
        let now = self.clock.now();
        let (admission, change) = self.core.lock().admit(&self.config, now);
        if let Some(change) = change {
            self.announce(change);
        }

        match admission {
            Admission::Admitted { generation, trial } => Ok(Permit {
                breaker: self,
                generation,
                trial,
                started: now,
                settled: false,
            }),
            Admission::Rejected => {
                self.span.in_scope(|| debug!("request short-circuited"));
                self.notify(Outcome::ShortCircuited);
                Err(ShortCircuitedError::new(&self.name))
            }
        }
    }

    fn settle(&self, mut permit: Permit<'_>, error: Option<&(dyn StdError + 'static)>) {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(permit.started);
        let outcome = self.classify_outcome(elapsed, error);

        let change = self.core.lock().complete(
            &self.config,
            now,
            permit.generation,
            permit.trial,
            outcome,
        );
        permit.settled = true;

        if outcome == Outcome::Timeout {
            self.span
                .in_scope(|| debug!(elapsed = ?elapsed, "request exceeded its timeout"));
        }
        self.notify(outcome);
        if let Some(change) = change {
            self.announce(change);
        }
    }

    fn classify_outcome(
        &self,
        elapsed: Duration,
        error: Option<&(dyn StdError + 'static)>,
    ) -> Outcome {
        let tolerable = &self.tolerable;
        let timeout = self.config.request_timeout;
        panic::catch_unwind(AssertUnwindSafe(|| {
            classify(elapsed, timeout, error, &tolerable.read())
        }))
        .unwrap_or_else(|_| {
            self.span.in_scope(|| {
                warn!("tolerable error check panicked; counting the call as a failure")
            });
            Outcome::Failure
        })
    }

    fn abandon(&self, permit: &Permit<'_>) {
        let now = self.clock.now();
        let (outcome, change) = self.core.lock().abandon(
            &self.config,
            now,
            permit.started,
            permit.generation,
            permit.trial,
        );
        self.span.in_scope(|| {
            debug!(
                trial = permit.trial,
                outcome = %outcome,
                "request abandoned before completion"
            )
        });
        self.notify(outcome);
        if let Some(change) = change {
            self.announce(change);
        }
    }

    fn announce(&self, change: StateChange) {
        self.span.in_scope(|| match change.to {
            CircuitState::Open => warn!(from = %change.from, "circuit breaker opening"),
            CircuitState::HalfOpen => info!("circuit breaker entering half-open state"),
            CircuitState::Closed => info!("circuit breaker closing"),
        });

        let monitor = &self.monitor;
        if panic::catch_unwind(AssertUnwindSafe(|| {
            monitor.transition(&self.name, change.from, change.to)
        }))
        .is_err()
        {
            self.span
                .in_scope(|| warn!("monitor panicked while recording a state change"));
        }
    }

    fn notify(&self, outcome: Outcome) {
        let monitor = &self.monitor;
        if panic::catch_unwind(AssertUnwindSafe(|| monitor.notify(&self.name, outcome))).is_err() {
            self.span.in_scope(|| {
                warn!(outcome = %outcome, "monitor panicked while recording an outcome")
            });
        }
    }
}

impl fmt::Debug for Breaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Breaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &self.state())
            .field("tolerable_errors", &self.tolerable_error_labels())
            .finish()
    }
}
