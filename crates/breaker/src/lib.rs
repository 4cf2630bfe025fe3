//! In-process circuit breakers for fusebox
//!
//! This crate wraps fallible units of work in a breaker that tracks recent
//! outcomes over a rolling window and stops running the work once the error
//! rate crosses a threshold.
//!
//! ## Key Components
//!
//! - **`circuit`**: The breaker itself, its configuration, rolling metrics
//!   window, outcome classifier and a registry of named breakers.
//! - **`telemetry`**: Installs the `tracing` subscriber used for breaker
//!   diagnostics.

pub mod circuit;
pub mod telemetry;

pub use circuit::{
    classify, Breaker, BreakerBuilder, BreakerConfig, BreakerRegistry, BreakerStats, Clock,
    ManualClock, MetricsSnapshot, RequestMode, RollingWindow, SystemClock, TolerableError,
    TolerableErrors,
};
pub use fusebox_core::{
    CircuitState, CountingMonitor, Error, LogMonitor, Monitor, NoopMonitor, Outcome, RequestError,
    Result, ShortCircuitedError,
};
