/// Constants used throughout the fusebox crates
// Environment variable names
pub const FUSEBOX_LOG_VAR: &str = "FUSEBOX_LOG";

// Log filter used when FUSEBOX_LOG is unset or unparsable
pub const DEFAULT_LOG_FILTER: &str = "info";
