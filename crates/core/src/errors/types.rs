//! Core error type definitions

/// Result type alias for fusebox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fusebox operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid breaker or registry configuration
    Configuration { message: String },

    /// JSON serialization/deserialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Breaker registry errors
    Registry { name: String, message: String },
}
