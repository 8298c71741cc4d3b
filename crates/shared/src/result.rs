//! Result helpers for shared error handling.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

/// Extension helpers for attaching context to envelope errors.
pub trait ResultExt<T> {
    /// Tag the error with the dotted config path being processed.
    fn at_path(self, path: impl Into<String>) -> Result<T>;

    /// Attach a metadata entry to the error, leaving successes untouched.
    fn with_metadata(self, key: &'static str, value: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn at_path(self, path: impl Into<String>) -> Result<T> {
        self.map_err(|error| error.with_path(path))
    }

    fn with_metadata(self, key: &'static str, value: impl Into<String>) -> Result<T> {
        self.map_err(|error| error.with_metadata(key, value))
    }
}
