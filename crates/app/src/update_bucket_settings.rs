//! Align remote storage buckets with `[storage.buckets.*]`.

use crate::remote_call::{read_section, write_section};
use supaconf_config::{Config, bucket_update};
use supaconf_ports::SharedManagementApi;
use supaconf_shared::{RequestContext, Result, ResultExt};

const SECTION_BUCKETS: &str = "storage.buckets";

/// Dependencies required by bucket sync.
#[derive(Clone)]
pub struct UpdateBucketSettingsDeps {
    /// Control-plane client.
    pub api: SharedManagementApi,
}

/// Which buckets were patched, already matched, or do not exist remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBucketSettingsOutput {
    /// Buckets whose settings were patched.
    pub updated: Vec<String>,
    /// Buckets already in sync.
    pub unchanged: Vec<String>,
    /// Local buckets with no remote counterpart.
    pub missing: Vec<String>,
}

/// Patch every local bucket whose `public`, size limit or MIME types drifted.
///
/// Buckets are matched by name. Missing buckets are reported and skipped;
/// creating them is left to the seeding flow.
pub async fn update_bucket_settings(
    ctx: &RequestContext,
    deps: &UpdateBucketSettingsDeps,
    project_ref: &str,
    config: &Config,
) -> Result<UpdateBucketSettingsOutput> {
    let mut output = UpdateBucketSettingsOutput::default();
    if config.storage.buckets.is_empty() {
        return Ok(output);
    }
    ctx.ensure_not_cancelled("update_bucket_settings.list")?;
    let remote = read_section(SECTION_BUCKETS, deps.api.list_buckets(ctx, project_ref)).await?;

    for (name, local) in &config.storage.buckets {
        let Some(existing) = remote.iter().find(|bucket| &bucket.name == name) else {
            tracing::warn!(bucket = %name, "bucket not found on remote project; skipping");
            output.missing.push(name.clone());
            continue;
        };
        let Some(body) = bucket_update(local, existing) else {
            output.unchanged.push(name.clone());
            continue;
        };
        ctx.ensure_not_cancelled("update_bucket_settings.update")?;
        tracing::info!(bucket = %name, "Updating storage bucket settings...");
        write_section(
            SECTION_BUCKETS,
            deps.api.update_bucket(ctx, project_ref, &existing.id, &body),
        )
        .await
        .at_path(format!("{SECTION_BUCKETS}.{name}"))?;
        output.updated.push(name.clone());
    }
    Ok(output)
}
