//! Errors produced by a guarded request
//!
//! A guarded request fails in exactly two ways: the breaker refused to run the
//! work (`ShortCircuited`), or the work itself returned an error (`Failed`).
//! The second variant carries the work's error untouched, including errors the
//! breaker tolerated for accounting purposes.

use std::error::Error as StdError;
use std::fmt;

/// Raised when a breaker declines to run work because it is not admitting calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{name} is open")]
pub struct ShortCircuitedError {
    name: String,
}

impl ShortCircuitedError {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name of the breaker that rejected the call
    pub fn breaker(&self) -> &str {
        &self.name
    }
}

/// Error returned by a guarded request
#[derive(Debug)]
pub enum RequestError<E> {
    /// The breaker rejected the call; the work never ran
    ShortCircuited(ShortCircuitedError),
    /// The work ran and returned this error
    Failed(E),
}

impl<E> RequestError<E> {
    pub fn is_short_circuited(&self) -> bool {
        matches!(self, RequestError::ShortCircuited(_))
    }

    pub fn short_circuited(&self) -> Option<&ShortCircuitedError> {
        match self {
            RequestError::ShortCircuited(err) => Some(err),
            RequestError::Failed(_) => None,
        }
    }

    /// Borrow the work's error, if the work ran
    pub fn failure(&self) -> Option<&E> {
        match self {
            RequestError::Failed(err) => Some(err),
            RequestError::ShortCircuited(_) => None,
        }
    }

    /// Take the work's error, if the work ran
    pub fn into_failure(self) -> Option<E> {
        match self {
            RequestError::Failed(err) => Some(err),
            RequestError::ShortCircuited(_) => None,
        }
    }

    /// Map the work's error, leaving a short-circuit untouched
    pub fn map_failure<F, O>(self, op: O) -> RequestError<F>
    where
        O: FnOnce(E) -> F,
    {
        match self {
            RequestError::Failed(err) => RequestError::Failed(op(err)),
            RequestError::ShortCircuited(err) => RequestError::ShortCircuited(err),
        }
    }
}

impl<E> From<ShortCircuitedError> for RequestError<E> {
    fn from(error: ShortCircuitedError) -> Self {
        RequestError::ShortCircuited(error)
    }
}

// Display and source are transparent: callers see the underlying error as if
// the breaker were not there.
impl<E: fmt::Display> fmt::Display for RequestError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::ShortCircuited(err) => fmt::Display::fmt(err, f),
            RequestError::Failed(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl<E: StdError + 'static> StdError for RequestError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            RequestError::ShortCircuited(err) => err.source(),
            RequestError::Failed(err) => err.source(),
        }
    }
}
