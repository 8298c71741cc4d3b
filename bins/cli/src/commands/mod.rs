//! Config command handlers.

pub mod check;
pub mod diff;
pub mod push;

pub use check::run_check;
pub use diff::run_diff;
pub use push::run_push;

use crate::error::CliError;
use crate::installation::resolve_installation_key;
use std::path::Path;
use supaconf_app::SectionStatus;
use supaconf_config::{LoadEnv, LoadOptions, LoadedConfig, is_valid_project_ref, load_config};
use supaconf_ports::{FileSystemPort, FileSystemPortExt};

/// Which config to load and how.
#[derive(Clone, Copy)]
pub struct ConfigScope<'a> {
    pub fs: &'a dyn FileSystemPort,
    pub env: &'a LoadEnv,
    pub config_path: &'a Path,
    pub remote: Option<&'a str>,
}

pub(crate) fn load(scope: ConfigScope<'_>) -> Result<LoadedConfig, CliError> {
    let key = resolve_installation_key(scope.fs, scope.env)?;
    let mut options = LoadOptions::new(scope.config_path).with_installation_key(key);
    if let Some(remote) = scope.remote {
        options = options.with_remote(remote);
    }
    Ok(load_config(scope.fs, scope.env, &options)?)
}

/// Explicit flag, then the selected remote, then the linked project.
pub(crate) fn resolve_project_ref(
    scope: ConfigScope<'_>,
    loaded: &LoadedConfig,
    explicit: Option<&str>,
) -> Result<String, CliError> {
    let project_ref = if let Some(project_ref) = explicit {
        project_ref.trim().to_string()
    } else if loaded.remote.is_some() {
        loaded.config.project_id.clone()
    } else if scope.fs.exists(&loaded.paths.project_ref)? {
        scope
            .fs
            .read_to_string(&loaded.paths.project_ref)?
            .trim()
            .to_string()
    } else {
        return Err(CliError::InvalidInput(
            "no project ref: pass --project-ref, select a remote, or link a project".to_string(),
        ));
    };
    if !is_valid_project_ref(&project_ref) {
        return Err(CliError::InvalidInput(format!(
            "invalid project ref: {project_ref}"
        )));
    }
    Ok(project_ref)
}

pub(crate) const fn status_label(status: SectionStatus) -> &'static str {
    match status {
        SectionStatus::UpToDate => "up to date",
        SectionStatus::Updated => "updated",
        SectionStatus::Skipped => "skipped",
    }
}
