//! # supaconf-testkit
//!
//! Test doubles for the port traits: an in-memory file tree and a stateful
//! fake of the management control plane.
//! This crate depends on `api`, `ports` and `shared`.

pub mod fs;
pub mod management;

pub use fs::InMemoryFileSystem;
pub use management::{FakeManagementApi, FakeProjectState, RecordedCall, SecretHasher};

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use supaconf_ports::ports_crate_version;
    use supaconf_shared::shared_crate_version;

    #[test]
    fn testkit_crate_compiles() {
        let version = testkit_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn testkit_can_use_ports_and_shared() {
        assert!(!ports_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
