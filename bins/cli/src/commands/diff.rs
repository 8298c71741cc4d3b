//! `config diff`: show drift per section without writing anything.

use super::{ConfigScope, load, resolve_project_ref};
use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, pretty_json};
use std::sync::Arc;
use supaconf_app::{
    SECTION_WEBHOOKS, SectionFilter, SectionReport, SectionStatus, UpdateRemoteConfigDeps, UpdateRemoteConfigInput,
    update_remote_config,
};
use supaconf_shared::RequestContext;

/// Run the diff command.
///
/// Drives the updater with a filter that refuses every section, so drifted
/// sections come back as skipped with their diff and nothing is written.
pub async fn run_diff(
    ctx: &RequestContext,
    mode: OutputMode,
    scope: ConfigScope<'_>,
    deps: &UpdateRemoteConfigDeps,
    project_ref: Option<&str>,
) -> Result<CliOutput, CliError> {
    let loaded = load(scope)?;
    let project_ref = resolve_project_ref(scope, &loaded, project_ref)?;
    let read_only: SectionFilter = Arc::new(|_: &str| false);
    let filters = [read_only];
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

    let drifted = report
        .sections
        .iter()
        .filter(|section| section.status == SectionStatus::Skipped)
        .count();

    let stdout = if mode.is_json() {
        let sections: Vec<_> = report
            .sections
            .iter()
            .map(|section| {
                serde_json::json!({
                    "section": section.section,
                    "drift": section.status == SectionStatus::Skipped,
                    "action": pending_action(section),
                    "diff": section.diff,
                })
            })
            .collect();
        pretty_json(&serde_json::json!({
            "status": "ok",
            "projectRef": project_ref,
            "drifted": drifted,
            "sections": sections,
        }))?
    } else {
        let mut out = format!("project_ref: {project_ref}\n");
        for section in &report.sections {
            if let Some(action) = pending_action(section) {
                out.push_str(&format!("{}: {action}\n", section.section));
            } else if section.status == SectionStatus::Skipped {
                out.push_str(&format!("{}: drift\n", section.section));
                out.push_str(&section.diff);
                if !section.diff.ends_with('\n') {
                    out.push('\n');
                }
            } else {
                out.push_str(&format!("{}: up to date\n", section.section));
            }
        }
        out
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}

/// Sections that toggle a feature rather than push fields have no diff body.
fn pending_action(section: &SectionReport) -> Option<&'static str> {
    (section.status == SectionStatus::Skipped && section.section == SECTION_WEBHOOKS)
        .then_some("will enable")
}
