//! Core domain types, errors, and monitor interfaces for `fusebox`.
//!
//! This crate holds the building blocks shared by every breaker: the error
//! taxonomy a guarded call can produce, the vocabulary of outcomes and circuit
//! states, and the `Monitor` seam through which breakers report what they did.
//!
//! ## Key Components
//!
//! - **`errors`**: Defines the crate `Error` enum and `Result` alias, plus the
//!   `ShortCircuitedError` and `RequestError` types returned by guarded calls.
//! - **`events`**: Outcome and state enums, the `Monitor` trait, and the stock
//!   monitors (`NoopMonitor`, `LogMonitor`, `CountingMonitor`).
//! - **`constants`**: Shared constants such as the log filter variable.

pub mod constants;
pub mod errors;
pub mod events;

// Re-export the public surface so downstream crates can use `fusebox_core::*`
// without naming the sub-modules.
pub use self::{
    constants::*,
    errors::{Error, RequestError, Result, ShortCircuitedError},
    events::{CircuitState, CountingMonitor, LogMonitor, Monitor, NoopMonitor, Outcome},
};
