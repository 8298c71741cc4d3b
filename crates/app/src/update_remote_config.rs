//! Push local config drift to the control plane, one section at a time.

use crate::remote_call::{read_section, write_section};
use std::sync::Arc;
use supaconf_config::Config;
use supaconf_ports::SharedManagementApi;
use supaconf_shared::{RequestContext, Result};

/// Section name of `[api]`.
pub const SECTION_API: &str = "api";
/// Section name of `[db.settings]`.
pub const SECTION_DB_SETTINGS: &str = "db.settings";
/// Section name of `[db.network_restrictions]`.
pub const SECTION_NETWORK_RESTRICTIONS: &str = "db.network_restrictions";
/// Section name of `[auth]`.
pub const SECTION_AUTH: &str = "auth";
/// Section name of `[storage]`.
pub const SECTION_STORAGE: &str = "storage";
/// Section name of `[experimental.webhooks]`.
pub const SECTION_WEBHOOKS: &str = "experimental.webhooks";

/// Every pushed section, in push order.
pub const SECTIONS: [&str; 6] = [
    SECTION_API,
    SECTION_DB_SETTINGS,
    SECTION_NETWORK_RESTRICTIONS,
    SECTION_AUTH,
    SECTION_STORAGE,
    SECTION_WEBHOOKS,
];

/// Predicate deciding whether a drifted section may be pushed.
pub type SectionFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Input for [`update_remote_config`].
#[derive(Clone, Copy)]
pub struct UpdateRemoteConfigInput<'a> {
    /// Target project ref.
    pub project_ref: &'a str,
    /// Loaded local config; never mutated.
    pub config: &'a Config,
    /// A section is skipped when any filter returns false.
    pub filters: &'a [SectionFilter],
}

/// Dependencies required by the updater.
#[derive(Clone)]
pub struct UpdateRemoteConfigDeps {
    /// Control-plane client.
    pub api: SharedManagementApi,
}

/// What happened to one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStatus {
    /// Remote already matches.
    UpToDate,
    /// Drift was pushed.
    Updated,
    /// Drift was found but a filter denied the push.
    Skipped,
}

/// Outcome for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    /// Section name, e.g. `db.settings`.
    pub section: &'static str,
    /// Resulting status.
    pub status: SectionStatus,
    /// Redacted unified diff; empty when up to date.
    pub diff: String,
}

/// Outcome of a full push. Disabled sections do not appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRemoteConfigOutput {
    /// Per-section reports, in push order.
    pub sections: Vec<SectionReport>,
}

impl UpdateRemoteConfigOutput {
    /// Report for `section`, if it was visited.
    pub fn section(&self, section: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|report| report.section == section)
    }
}

/// Decide what to do with a section given its diff.
///
/// Returns `None` when the caller should push.
fn settle(section: &'static str, diff: String, filters: &[SectionFilter]) -> Option<SectionReport> {
    if diff.is_empty() {
        tracing::info!("Remote {section} config is up to date.");
        return Some(SectionReport {
            section,
            status: SectionStatus::UpToDate,
            diff,
        });
    }
    tracing::debug!(section, diff = %diff, "remote config drift");
    if filters.iter().any(|allow| !allow(section)) {
        tracing::info!("Skipping {section} update.");
        return Some(SectionReport {
            section,
            status: SectionStatus::Skipped,
            diff,
        });
    }
    None
}

fn updated(section: &'static str, diff: String) -> SectionReport {
    SectionReport {
        section,
        status: SectionStatus::Updated,
        diff,
    }
}

/// Push every drifted section of `input.config` to `input.project_ref`.
///
/// Sections run serially; the first failure aborts the rest and nothing
/// already pushed is rolled back.
pub async fn update_remote_config(
    ctx: &RequestContext,
    deps: &UpdateRemoteConfigDeps,
    input: UpdateRemoteConfigInput<'_>,
) -> Result<UpdateRemoteConfigOutput> {
    let mut output = UpdateRemoteConfigOutput::default();
    let reports = [
        update_api(ctx, deps, input).await?,
        update_db_settings(ctx, deps, input).await?,
        update_network_restrictions(ctx, deps, input).await?,
        update_auth(ctx, deps, input).await?,
        update_storage(ctx, deps, input).await?,
        update_webhooks(ctx, deps, input).await?,
    ];
    output.sections.extend(reports.into_iter().flatten());
    Ok(output)
}

async fn update_api(
    ctx: &RequestContext,
    deps: &UpdateRemoteConfigDeps,
    input: UpdateRemoteConfigInput<'_>,
) -> Result<Option<SectionReport>> {
    ctx.ensure_not_cancelled("update_remote_config.api")?;
    let api = &input.config.api;
    let remote = read_section(SECTION_API, deps.api.get_postgrest_config(ctx, input.project_ref)).await?;
    let diff = api.diff_with_remote(&remote)?;
    if let Some(report) = settle(SECTION_API, diff.clone(), input.filters) {
        return Ok(Some(report));
    }
    tracing::info!("Updating {SECTION_API} config...");
    let body = api.to_update_body();
    write_section(
        SECTION_API,
        deps.api.update_postgrest_config(ctx, input.project_ref, &body),
    )
    .await?;
    Ok(Some(updated(SECTION_API, diff)))
}

async fn update_db_settings(
    ctx: &RequestContext,
    deps: &UpdateRemoteConfigDeps,
    input: UpdateRemoteConfigInput<'_>,
) -> Result<Option<SectionReport>> {
    ctx.ensure_not_cancelled("update_remote_config.db_settings")?;
    let settings = &input.config.db.settings;
    let remote = read_section(
        SECTION_DB_SETTINGS,
        deps.api.get_postgres_config(ctx, input.project_ref),
    )
    .await?;
    let diff = settings.diff_with_remote(&remote)?;
    if let Some(report) = settle(SECTION_DB_SETTINGS, diff.clone(), input.filters) {
        return Ok(Some(report));
    }
    tracing::info!("Updating {SECTION_DB_SETTINGS} config...");
    let body = settings.to_update_body();
    write_section(
        SECTION_DB_SETTINGS,
        deps.api.update_postgres_config(ctx, input.project_ref, &body),
    )
    .await?;
    Ok(Some(updated(SECTION_DB_SETTINGS, diff)))
}

async fn update_network_restrictions(
    ctx: &RequestContext,
    deps: &UpdateRemoteConfigDeps,
    input: UpdateRemoteConfigInput<'_>,
) -> Result<Option<SectionReport>> {
    let restrictions = &input.config.db.network_restrictions;
    if !restrictions.enabled {
        return Ok(None);
    }
    ctx.ensure_not_cancelled("update_remote_config.network_restrictions")?;
    let remote = read_section(
        SECTION_NETWORK_RESTRICTIONS,
        deps.api.get_network_restrictions(ctx, input.project_ref),
    )
    .await?;
    let diff = restrictions.diff_with_remote(&remote)?;
    if let Some(report) = settle(SECTION_NETWORK_RESTRICTIONS, diff.clone(), input.filters) {
        return Ok(Some(report));
    }
    tracing::info!("Updating {SECTION_NETWORK_RESTRICTIONS} config...");
    let body = restrictions.to_update_body();
    write_section(
        SECTION_NETWORK_RESTRICTIONS,
        deps.api.apply_network_restrictions(ctx, input.project_ref, &body),
    )
    .await?;
    Ok(Some(updated(SECTION_NETWORK_RESTRICTIONS, diff)))
}

async fn update_auth(
    ctx: &RequestContext,
    deps: &UpdateRemoteConfigDeps,
    input: UpdateRemoteConfigInput<'_>,
) -> Result<Option<SectionReport>> {
    let auth = &input.config.auth;
    if !auth.enabled {
        return Ok(None);
    }
    ctx.ensure_not_cancelled("update_remote_config.auth")?;
    let remote = read_section(SECTION_AUTH, deps.api.get_auth_config(ctx, input.project_ref)).await?;
    let diff = auth.diff_with_remote(&remote)?;
    if let Some(report) = settle(SECTION_AUTH, diff.clone(), input.filters) {
        return Ok(Some(report));
    }
    tracing::info!("Updating {SECTION_AUTH} config...");
    let body = auth.to_update_body();
    write_section(
        SECTION_AUTH,
        deps.api.update_auth_config(ctx, input.project_ref, &body),
    )
    .await?;
    Ok(Some(updated(SECTION_AUTH, diff)))
}

async fn update_storage(
    ctx: &RequestContext,
    deps: &UpdateRemoteConfigDeps,
    input: UpdateRemoteConfigInput<'_>,
) -> Result<Option<SectionReport>> {
    let storage = &input.config.storage;
    if !storage.enabled {
        return Ok(None);
    }
    ctx.ensure_not_cancelled("update_remote_config.storage")?;
    let remote = read_section(
        SECTION_STORAGE,
        deps.api.get_storage_config(ctx, input.project_ref),
    )
    .await?;
    let diff = storage.diff_with_remote(&remote)?;
    if let Some(report) = settle(SECTION_STORAGE, diff.clone(), input.filters) {
        return Ok(Some(report));
    }
    tracing::info!("Updating {SECTION_STORAGE} config...");
    let body = storage.to_update_body();
    write_section(
        SECTION_STORAGE,
        deps.api.update_storage_config(ctx, input.project_ref, &body),
    )
    .await?;
    Ok(Some(updated(SECTION_STORAGE, diff)))
}

/// Webhooks can only be switched on; there is nothing to diff.
async fn update_webhooks(
    ctx: &RequestContext,
    deps: &UpdateRemoteConfigDeps,
    input: UpdateRemoteConfigInput<'_>,
) -> Result<Option<SectionReport>> {
    let enabled = input
        .config
        .experimental
        .webhooks
        .as_ref()
        .is_some_and(|webhooks| webhooks.enabled);
    if !enabled {
        return Ok(None);
    }
    ctx.ensure_not_cancelled("update_remote_config.webhooks")?;
    if input.filters.iter().any(|allow| !allow(SECTION_WEBHOOKS)) {
        tracing::info!("Skipping {SECTION_WEBHOOKS} update.");
        return Ok(Some(SectionReport {
            section: SECTION_WEBHOOKS,
            status: SectionStatus::Skipped,
            diff: String::new(),
        }));
    }
    tracing::info!("Updating {SECTION_WEBHOOKS} config...");
    write_section(
        SECTION_WEBHOOKS,
        deps.api.enable_webhooks(ctx, input.project_ref),
    )
    .await?;
    Ok(Some(updated(SECTION_WEBHOOKS, String::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_diff_is_up_to_date_regardless_of_filters() {
        let deny: SectionFilter = Arc::new(|_: &str| false);
        let report = settle(SECTION_API, String::new(), &[deny]);
        assert_eq!(report.map(|report| report.status), Some(SectionStatus::UpToDate));
    }

    #[test]
    fn any_denying_filter_skips() {
        let allow: SectionFilter = Arc::new(|_: &str| true);
        let deny_auth: SectionFilter = Arc::new(|section: &str| section != SECTION_AUTH);
        let filters = [allow, deny_auth];
        assert_eq!(
            settle(SECTION_AUTH, "-a\n+b\n".to_string(), &filters).map(|report| report.status),
            Some(SectionStatus::Skipped)
        );
        assert!(settle(SECTION_STORAGE, "-a\n+b\n".to_string(), &filters).is_none());
    }

    #[test]
    fn sections_follow_push_order() {
        assert_eq!(SECTIONS.first(), Some(&"api"));
        assert_eq!(SECTIONS.last(), Some(&"experimental.webhooks"));
    }
}
