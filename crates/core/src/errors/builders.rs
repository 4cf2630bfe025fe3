//! Builder methods for creating errors with context

use super::types::Error;

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a registry error for the named breaker
    #[must_use]
    pub fn registry(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Registry {
            name: name.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by invalid configuration values or documents
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. } | Error::Json { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_render_context() {
        let err = Error::configuration("request_timeout must be positive");
        assert_eq!(
            err.to_string(),
            "configuration error: request_timeout must be positive"
        );
        assert!(err.is_configuration());

        let err = Error::registry("payments", "already registered");
        assert_eq!(
            err.to_string(),
            "registry error for breaker 'payments': already registered"
        );
        assert!(!err.is_configuration());
    }
}
