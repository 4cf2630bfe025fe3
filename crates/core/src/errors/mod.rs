//! Error types for fusebox operations

mod builders;
mod conversions;
mod display;
mod request;
mod types;

pub use request::{RequestError, ShortCircuitedError};
pub use types::{Error, Result};
