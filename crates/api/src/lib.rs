//! # supaconf-api
//!
//! Wire types for the management control plane.
//! This crate has no workspace dependencies; the config engine maps its
//! schema onto these bodies and the HTTP adapter (de)serializes them.

/// Control-plane v1 request and response bodies.
pub mod v1;

/// Returns the api crate version.
#[must_use]
pub const fn api_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_crate_compiles() {
        assert!(!api_crate_version().is_empty());
    }
}
