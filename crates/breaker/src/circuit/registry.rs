//! Registry of named breakers.
//!
//! The registry is an ordinary value: callers create one, share it, and pass
//! it where breakers are needed. Breakers created through it share the
//! registry's monitor and clock.

use super::clock::{Clock, SystemClock};
use super::config::BreakerConfig;
use super::state::Breaker;
use super::types::BreakerStats;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fusebox_core::{Error, Monitor, NoopMonitor, Result};
use std::sync::Arc;
use tracing::debug;

/// Named breakers sharing default configuration and collaborators
pub struct BreakerRegistry {
    breakers: DashMap<String, Arc<Breaker>>,
    defaults: BreakerConfig,
    monitor: Arc<dyn Monitor>,
    clock: Arc<dyn Clock>,
}

impl BreakerRegistry {
    /// Create a registry whose breakers default to `defaults`
    pub fn new(defaults: BreakerConfig) -> Result<Self> {
        defaults.validate()?;
        Ok(Self {
            breakers: DashMap::new(),
            defaults,
            monitor: Arc::new(NoopMonitor),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_monitor(mut self, monitor: Arc<dyn Monitor>) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn defaults(&self) -> &BreakerConfig {
        &self.defaults
    }

    fn build(&self, name: &str, config: BreakerConfig) -> Result<Breaker> {
        Breaker::builder(name)
            .config(config)
            .monitor(Arc::clone(&self.monitor))
            .clock(Arc::clone(&self.clock))
            .build()
    }

    /// Fetch the named breaker, creating it with the default config if needed
    pub fn get_or_create(&self, name: &str) -> Result<Arc<Breaker>> {
        if let Some(existing) = self.breakers.get(name) {
            return Ok(Arc::clone(existing.value()));
        }

        match self.breakers.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let breaker = Arc::new(self.build(name, self.defaults.clone())?);
                debug!(breaker = %name, "created breaker with default configuration");
                entry.insert(Arc::clone(&breaker));
                Ok(breaker)
            }
        }
    }

    /// Create the named breaker with its own config; fails if the name is taken
    pub fn register(&self, name: &str, config: BreakerConfig) -> Result<Arc<Breaker>> {
        match self.breakers.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::registry(
                name,
                "a breaker with this name already exists",
            )),
            Entry::Vacant(entry) => {
                let breaker = Arc::new(self.build(name, config)?);
                debug!(breaker = %name, "registered breaker");
                entry.insert(Arc::clone(&breaker));
                Ok(breaker)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Breaker>> {
        self.breakers
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Remove the named breaker; holders of the `Arc` keep a working breaker
    pub fn remove(&self, name: &str) -> Option<Arc<Breaker>> {
        self.breakers.remove(name).map(|(_, breaker)| breaker)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .breakers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Stats for every breaker, sorted by name
    pub fn stats(&self) -> Vec<BreakerStats> {
        let mut stats: Vec<BreakerStats> = self
            .breakers
            .iter()
            .map(|entry| entry.value().stats())
            .collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}

impl std::fmt::Debug for BreakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerRegistry")
            .field("breakers", &self.names())
            .field("defaults", &self.defaults)
            .finish()
    }
}
