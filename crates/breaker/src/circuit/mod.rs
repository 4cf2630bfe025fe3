//! Circuit breaker for protecting callers from unhealthy work
//!
//! A breaker runs each unit of work through a small pipeline: ask the state
//! machine whether the call is admitted, time the work, classify what came
//! back, record the outcome in a rolling window, and let the state machine
//! decide whether the breaker should trip.
//!
//! ## Architecture
//!
//! This module is organized into focused sub-modules:
//!
//! - [`types`] - Snapshots, stats and request modes
//! - [`config`] - Per-breaker configuration and its defaults
//! - [`clock`] - Time source abstraction (system and manual clocks)
//! - [`window`] - Rolling bucketed window of outcome counts
//! - [`classifier`] - Outcome classification and tolerable errors
//! - [`transitions`] - State machine guarded by the breaker's lock
//! - [`state`] - The `Breaker` and its request guard
//! - [`registry`] - Explicit registry of named breakers
//! - [`tests`] - Scenario tests
//!
//! ## States
//!
//! ```text
//! Closed   → Open:      volume >= request_volume_threshold
//!                       and error rate >= error_threshold_percentage
//! Open     → HalfOpen:  sleep_window elapsed (checked on the next request)
//! HalfOpen → Closed:    trial request succeeds
//! HalfOpen → Open:      trial request fails or times out
//! ```
//!
//! ## Examples
//!
//! ### Guarded request
//!
//! ```rust,no_run
//! use fusebox_breaker::circuit::{Breaker, BreakerConfig};
//!
//! # fn example() -> fusebox_core::Result<()> {
//! let breaker = Breaker::new("inventory", BreakerConfig::default())?;
//!
//! let stock = breaker.request(|| Ok::<_, std::io::Error>(42));
//! assert_eq!(stock.ok(), Some(42));
//! # Ok(())
//! # }
//! ```
//!
//! ### Tolerating an error kind
//!
//! ```rust,no_run
//! use fusebox_breaker::circuit::{Breaker, BreakerConfig, TolerableError};
//!
//! # fn example() -> fusebox_core::Result<()> {
//! let breaker = Breaker::new("inventory", BreakerConfig::default())?;
//! breaker.tolerate(TolerableError::io_kind(std::io::ErrorKind::NotFound));
//!
//! let missing = breaker.request(|| {
//!     Err::<(), _>(std::io::Error::new(std::io::ErrorKind::NotFound, "no such sku"))
//! });
//! assert!(missing.is_err());
//! assert_eq!(breaker.metrics().success, 1);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod clock;
pub mod config;
pub mod registry;
pub mod state;
pub mod transitions;
pub mod types;
pub mod window;

// Re-export public API
pub use classifier::{classify, TolerableError, TolerableErrors};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BreakerConfig;
pub use registry::BreakerRegistry;
pub use state::{Breaker, BreakerBuilder};
pub use types::{BreakerStats, CircuitState, MetricsSnapshot, RequestMode};
pub use window::RollingWindow;
