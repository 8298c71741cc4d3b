//! `config push`: write drifted sections and bucket settings to the project.

use super::{ConfigScope, load, resolve_project_ref, status_label};
use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, pretty_json};
use std::sync::Arc;
use supaconf_app::update_remote_config::SECTION_STORAGE;
use supaconf_app::{
    SECTIONS, SectionFilter, UpdateBucketSettingsDeps, UpdateBucketSettingsOutput,
    UpdateRemoteConfigDeps, UpdateRemoteConfigInput, update_bucket_settings, update_remote_config,
};
use supaconf_shared::RequestContext;

/// Run the push command. `only` restricts the push to the named sections.
pub async fn run_push(
    ctx: &RequestContext,
    mode: OutputMode,
    scope: ConfigScope<'_>,
    deps: &UpdateRemoteConfigDeps,
    project_ref: Option<&str>,
    only: &[String],
) -> Result<CliOutput, CliError> {
    if let Some(unknown) = only.iter().find(|name| !SECTIONS.contains(&name.as_str())) {
        return Err(CliError::InvalidInput(format!(
            "unknown section {unknown}; expected one of: {}",
            SECTIONS.join(", ")
        )));
    }
    let loaded = load(scope)?;
    let project_ref = resolve_project_ref(scope, &loaded, project_ref)?;

    let mut filters: Vec<SectionFilter> = Vec::new();
    if !only.is_empty() {
        let allowed = only.to_vec();
        filters.push(Arc::new(move |section: &str| allowed.iter().any(|name| name == section)));
    }
    let report = update_remote_config(
        ctx,
        deps,
        UpdateRemoteConfigInput {
            project_ref: &project_ref,
            config: &loaded.config,
            filters: &filters,
        },
    )
    .await?;

    let sync_buckets =
        loaded.config.storage.enabled && filters.iter().all(|allow| allow(SECTION_STORAGE));
    let buckets = if sync_buckets {
        let bucket_deps = UpdateBucketSettingsDeps {
            api: Arc::clone(&deps.api),
        };
        update_bucket_settings(ctx, &bucket_deps, &project_ref, &loaded.config).await?
    } else {
        UpdateBucketSettingsOutput::default()
    };

    let stdout = if mode.is_json() {
        let sections: Vec<_> = report
            .sections
            .iter()
            .map(|section| {
                serde_json::json!({
                    "section": section.section,
                    "status": status_label(section.status),
                })
            })
            .collect();
        pretty_json(&serde_json::json!({
            "status": "ok",
            "projectRef": project_ref,
            "sections": sections,
            "buckets": {
                "updated": buckets.updated,
                "unchanged": buckets.unchanged,
                "missing": buckets.missing,
            },
        }))?
    } else {
        let mut out = format!("project_ref: {project_ref}\n");
        for section in &report.sections {
            out.push_str(&format!("{}: {}\n", section.section, status_label(section.status)));
        }
        for name in &buckets.updated {
            out.push_str(&format!("bucket {name}: updated\n"));
        }
        for name in &buckets.missing {
            out.push_str(&format!("bucket {name}: missing on remote\n"));
        }
        out
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}
