//! # supaconf-config
//!
//! Project configuration engine: schema, loader, validator, remote mapper and
//! differ. This crate depends on `api`, `ports` and `shared` only; all I/O
//! goes through [`supaconf_ports::FileSystemPort`].

/// Encrypted (`encrypted:`) secret decoding.
pub mod decrypt;
/// Section diffs with secret redaction.
pub mod diff;
/// Environment snapshot, `.env` files, `env(...)` and `SUPABASE_*` overrides.
pub mod env;
/// Typed configuration errors.
pub mod error;
/// Ordered, de-duplicated glob expansion.
pub mod glob;
/// JWK handling and API key minting.
pub mod jwt;
/// Config composition and loading.
pub mod load;
/// Project file layout.
pub mod paths;
/// Name patterns and project id sanitizing.
pub mod patterns;
/// Schema ⇄ control-plane mapping.
pub mod remote;
/// Configuration schema types.
pub mod schema;
/// The cleartext-or-hash secret type.
pub mod secret;
/// Byte sizes and durations.
pub mod units;
/// Cross-field validation.
pub mod validate;

pub use diff::{CHANGED_SENTINEL, ORIGINAL_SENTINEL, UNCHANGED_SENTINEL, diff_section};
pub use env::LoadEnv;
pub use error::ConfigError;
pub use glob::resolve_globs;
pub use jwt::{ApiKeyClaims, ApiKeySigner, Jwk, generate_api_keys};
pub use load::{DEFAULT_TEMPLATE, LoadOptions, LoadedConfig, load_config};
pub use paths::ConfigPaths;
pub use patterns::{is_valid_project_ref, sanitize_project_id};
pub use remote::bucket_update;
pub use schema::Config;
pub use secret::{Secret, hash_secret};
pub use units::{GoDuration, SizeInBytes};
pub use validate::validate_config;

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_crate_compiles() {
        assert!(!config_crate_version().is_empty());
    }
}
