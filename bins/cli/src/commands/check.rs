//! `config check`: load and validate, optionally printing the ejected file.

use super::{ConfigScope, load};
use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, pretty_json};
use supaconf_shared::ErrorEnvelope;

/// Run the check command.
pub fn run_check(mode: OutputMode, scope: ConfigScope<'_>, eject: bool) -> Result<CliOutput, CliError> {
    let loaded = load(scope)?;
    let ejected = if eject {
        Some(loaded.config.to_toml().map_err(ErrorEnvelope::from)?)
    } else {
        None
    };

    let stdout = if mode.is_json() {
        pretty_json(&serde_json::json!({
            "status": "ok",
            "configPath": loaded.paths.config_path.display().to_string(),
            "projectId": loaded.config.project_id,
            "remote": loaded.remote,
            "warnings": loaded.warnings,
            "config": ejected,
        }))?
    } else {
        let mut out = format!(
            "status: ok\nconfig: {}\nproject_id: {}\n",
            loaded.paths.config_path.display(),
            loaded.config.project_id
        );
        if let Some(remote) = &loaded.remote {
            out.push_str(&format!("remote: {remote}\n"));
        }
        for warning in &loaded.warnings {
            out.push_str(&format!("warning: {warning}\n"));
        }
        if let Some(ejected) = ejected {
            out.push('\n');
            out.push_str(&ejected);
        }
        out
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}
