//! Outcome classification and tolerable errors.
//!
//! Classification precedence is fixed: a tolerated error counts as success, any
//! other error counts as failure, and only calls that returned normally are
//! checked against the request timeout.

use super::types::Outcome;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

type Matcher = Arc<dyn Fn(&(dyn StdError + 'static)) -> bool + Send + Sync>;

/// A marker for an error kind that should not count as a failure
#[derive(Clone)]
pub struct TolerableError {
    label: String,
    matcher: Matcher,
}

impl TolerableError {
    /// Tolerate errors of type `T`, including errors caused by a `T`.
    ///
    /// The raised error and every error in its `source()` chain are checked,
    /// so a wrapper whose source is a `T` is tolerated as well.
    pub fn of<T>() -> Self
    where
        T: StdError + 'static,
    {
        Self {
            label: std::any::type_name::<T>().to_string(),
            matcher: Arc::new(|err: &(dyn StdError + 'static)| {
                chain(err).any(|cause| cause.is::<T>())
            }),
        }
    }

    /// Tolerate `std::io::Error`s of the given kind anywhere in the source chain
    pub fn io_kind(kind: io::ErrorKind) -> Self {
        Self {
            label: format!("io::{kind:?}"),
            matcher: Arc::new(move |err: &(dyn StdError + 'static)| {
                chain(err).any(|cause| {
                    cause
                        .downcast_ref::<io::Error>()
                        .is_some_and(|io_err| io_err.kind() == kind)
                })
            }),
        }
    }

    /// Tolerate errors accepted by an arbitrary predicate
    pub fn matching<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&(dyn StdError + 'static)) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            matcher: Arc::new(predicate),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, error: &(dyn StdError + 'static)) -> bool {
        (self.matcher)(error)
    }
}

impl fmt::Debug for TolerableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TolerableError").field(&self.label).finish()
    }
}

fn chain<'a>(
    error: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(error), |&err| err.source())
}

/// Ordered list of tolerable error markers
#[derive(Debug, Clone, Default)]
pub struct TolerableErrors {
    entries: Vec<TolerableError>,
}

impl TolerableErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TolerableError) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TolerableError> {
        self.entries.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.label.clone()).collect()
    }

    /// First entry, in insertion order, that tolerates `error`
    pub fn find(&self, error: &(dyn StdError + 'static)) -> Option<&TolerableError> {
        self.entries.iter().find(|entry| entry.matches(error))
    }

    pub fn matches(&self, error: &(dyn StdError + 'static)) -> bool {
        self.find(error).is_some()
    }
}

impl Extend<TolerableError> for TolerableErrors {
    fn extend<I: IntoIterator<Item = TolerableError>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl FromIterator<TolerableError> for TolerableErrors {
    fn from_iter<I: IntoIterator<Item = TolerableError>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Classify one completed call
pub fn classify(
    elapsed: Duration,
    request_timeout: Duration,
    error: Option<&(dyn StdError + 'static)>,
    tolerable: &TolerableErrors,
) -> Outcome {
    match error {
        Some(err) if tolerable.matches(err) => Outcome::Success,
        Some(_) => Outcome::Failure,
        None if elapsed > request_timeout => Outcome::Timeout,
        None => Outcome::Success,
    }
}
