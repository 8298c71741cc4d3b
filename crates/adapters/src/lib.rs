//! # supaconf-adapters
//!
//! Adapter implementations for ports (local filesystem, management API,
//! third-party key sets). This crate depends on `ports`, `shared`, `api`,
//! and `config`.

mod http;

pub mod fs;
pub mod jwks;
pub mod management;

pub use fs::LocalFileSystem;
pub use jwks::{JWKS_TIMEOUT, JwkSet, JwksResolver};
pub use management::{DEFAULT_API_URL, HttpManagementApi, HttpManagementApiConfig};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use supaconf_ports::ports_crate_version;
    use supaconf_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]" || line == "[dev-dependencies]";
                continue;
            }
            if in_deps && line.starts_with("supaconf-") {
                let key = line.split('=').next().unwrap_or("").trim();
                deps.push(key.split('.').next().unwrap_or("").trim().to_string());
            }
        }

        deps
    }

    #[test]
    fn adapters_do_not_depend_on_app_or_testkit() {
        let deps = workspace_deps();
        let forbidden = ["supaconf-app", "supaconf-testkit"];

        for dep in &deps {
            assert!(
                !forbidden.contains(&dep.as_str()),
                "forbidden dependency found: {dep}"
            );
        }
    }

    #[test]
    fn adapters_crate_compiles() {
        assert!(!adapters_crate_version().is_empty());
        assert!(!ports_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
