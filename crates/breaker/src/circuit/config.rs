//! Configuration for circuit breaker behavior.

use fusebox_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time after which a completed call counts as a timeout (1s)
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Default minimum number of calls in the window before the breaker may trip
const DEFAULT_REQUEST_VOLUME_THRESHOLD: u32 = 10;

/// Default error rate (failures plus timeouts over volume) that trips the breaker
const DEFAULT_ERROR_THRESHOLD_PERCENTAGE: f64 = 0.5;

/// Default time spent open before a trial request is allowed (5s)
const DEFAULT_SLEEP_WINDOW: Duration = Duration::from_secs(5);

/// Default span of the rolling metrics window (10s)
const DEFAULT_ROLLING_WINDOW: Duration = Duration::from_secs(10);

/// Default number of buckets the rolling window is divided into
const DEFAULT_ROLLING_BUCKETS: usize = 10;

/// Configuration for circuit breaker behavior.
///
/// Durations are written in seconds (fractions allowed) when the
/// configuration is loaded from JSON. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Calls that complete after this long are accounted as timeouts
    #[serde(with = "seconds")]
    pub request_timeout: Duration,
    /// Minimum volume in the window before the error rate is considered
    pub request_volume_threshold: u32,
    /// Error rate, as a fraction in (0, 1], at which the breaker opens
    pub error_threshold_percentage: f64,
    /// Time to stay open before admitting a trial request
    #[serde(with = "seconds")]
    pub sleep_window: Duration,
    /// Span of the rolling metrics window
    #[serde(with = "seconds")]
    pub rolling_window: Duration,
    /// Number of buckets the rolling window rotates through
    pub rolling_buckets: usize,
    /// Reject every guarded request regardless of metrics
    pub force_open: bool,
    /// Never trip, while still recording metrics
    pub force_closed: bool,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            request_volume_threshold: DEFAULT_REQUEST_VOLUME_THRESHOLD,
            error_threshold_percentage: DEFAULT_ERROR_THRESHOLD_PERCENTAGE,
            sleep_window: DEFAULT_SLEEP_WINDOW,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            rolling_buckets: DEFAULT_ROLLING_BUCKETS,
            force_open: false,
            force_closed: false,
        }
    }
}

impl BreakerConfig {
    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.request_timeout.is_zero() {
            problems.push("request_timeout must be greater than zero".to_string());
        }
        if self.request_volume_threshold == 0 {
            problems.push("request_volume_threshold must be at least 1".to_string());
        }
        if !(self.error_threshold_percentage > 0.0 && self.error_threshold_percentage <= 1.0) {
            problems.push(format!(
                "error_threshold_percentage must be within (0, 1], got {}",
                self.error_threshold_percentage
            ));
        }
        if self.rolling_buckets == 0 {
            problems.push("rolling_buckets must be at least 1".to_string());
        } else if self.rolling_window.as_nanos() < self.rolling_buckets as u128 {
            problems.push(format!(
                "rolling_window {:?} is too short for {} buckets",
                self.rolling_window, self.rolling_buckets
            ));
        }
        if self.force_open && self.force_closed {
            problems.push("force_open and force_closed are mutually exclusive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::configuration(problems.join("; ")))
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_request_volume_threshold(mut self, threshold: u32) -> Self {
        self.request_volume_threshold = threshold;
        self
    }

    pub fn with_error_threshold_percentage(mut self, percentage: f64) -> Self {
        self.error_threshold_percentage = percentage;
        self
    }

    pub fn with_sleep_window(mut self, sleep_window: Duration) -> Self {
        self.sleep_window = sleep_window;
        self
    }

    /// Set the rolling window span and its bucket count together
    pub fn with_rolling_window(mut self, window: Duration, buckets: usize) -> Self {
        self.rolling_window = window;
        self.rolling_buckets = buckets;
        self
    }

    pub fn with_force_open(mut self, force_open: bool) -> Self {
        self.force_open = force_open;
        self
    }

    pub fn with_force_closed(mut self, force_closed: bool) -> Self {
        self.force_closed = force_closed;
        self
    }
}

/// Serde adapter writing durations as fractional seconds
mod seconds {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|err| de::Error::custom(format!("invalid duration {secs}s: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BreakerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout, Duration::from_secs(1));
        assert_eq!(config.request_volume_threshold, 10);
        assert_eq!(config.sleep_window, Duration::from_secs(5));
    }

    #[test]
    fn test_from_json_fills_missing_keys() {
        let config = BreakerConfig::from_json(
            r#"{ "request_timeout": 0.25, "request_volume_threshold": 20 }"#,
        )
        .unwrap();

        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.request_volume_threshold, 20);
        assert_eq!(config.sleep_window, DEFAULT_SLEEP_WINDOW);
        assert_eq!(config.rolling_buckets, DEFAULT_ROLLING_BUCKETS);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(BreakerConfig::from_json("{}").unwrap(), BreakerConfig::default());
    }

    #[test]
    fn test_from_json_rejects_negative_durations() {
        let err = BreakerConfig::from_json(r#"{ "sleep_window": -1.0 }"#).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let config = BreakerConfig::default()
            .with_request_timeout(Duration::ZERO)
            .with_error_threshold_percentage(1.5)
            .with_force_open(true)
            .with_force_closed(true);

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("request_timeout"));
        assert!(message.contains("error_threshold_percentage"));
        assert!(message.contains("mutually exclusive"));
    }

    #[test]
    fn test_validate_rejects_degenerate_window() {
        let config = BreakerConfig::default().with_rolling_window(Duration::from_nanos(3), 10);
        assert!(config.validate().is_err());

        let config = BreakerConfig::default().with_rolling_window(Duration::from_secs(1), 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = BreakerConfig::default().with_sleep_window(Duration::from_millis(1500));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"sleep_window\":1.5"));
        assert_eq!(BreakerConfig::from_json(&json).unwrap(), config);
    }
}
