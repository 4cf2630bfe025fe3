//! Conversion implementations for error types

use super::types::Error;

// Kept by hand so the parser message is captured alongside the source.
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}
