//! # supaconf-app
//!
//! Use cases that reconcile a loaded project config with the control plane.
//! This crate depends on `config`, `ports`, and `shared`.

mod remote_call;
pub mod update_bucket_settings;
pub mod update_local_config;
pub mod update_remote_config;

pub use update_bucket_settings::{
    UpdateBucketSettingsDeps, UpdateBucketSettingsOutput, update_bucket_settings,
};
pub use update_local_config::{UpdateLocalConfigDeps, update_local_config};
pub use update_remote_config::{
    SECTION_WEBHOOKS, SECTIONS, SectionFilter, SectionReport, SectionStatus,
    UpdateRemoteConfigDeps, UpdateRemoteConfigInput, UpdateRemoteConfigOutput,
    update_remote_config,
};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
