//! Environment variable parsing helpers
//!
//! Provides ergonomic helpers for reading configuration from environment variables.

use std::env;

/// Extension trait for parsing environment variables.
///
/// Provides convenient methods for reading env vars with defaults.
pub trait ConfigExt {
    /// Get an environment variable with a default value.
    ///
    /// # Example
    /// ```ignore
    /// let mongo = String::env_or("BONGO_MONGO", "mongo");
    /// ```
    fn env_or(name: &str, default: &str) -> String {
        env::var(name).unwrap_or_else(|_| default.to_string())
    }

    /// Get an environment variable if it is set and non-empty.
    fn env_opt(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }
}

// Blanket implementation for all types
impl<T> ConfigExt for T {}
