//! Seed a local config tree from the control plane.

use crate::remote_call::read_section;
use crate::update_remote_config::{
    SECTION_API, SECTION_AUTH, SECTION_DB_SETTINGS, SECTION_NETWORK_RESTRICTIONS, SECTION_STORAGE,
};
use supaconf_config::Config;
use supaconf_ports::SharedManagementApi;
use supaconf_shared::{RequestContext, Result};

/// Dependencies required to import remote state.
#[derive(Clone)]
pub struct UpdateLocalConfigDeps {
    /// Control-plane client.
    pub api: SharedManagementApi,
}

/// Overwrite the remotely managed fields of `config` with the state of `project_ref`.
///
/// Disabled auth, storage and network restriction sections are left alone,
/// matching what a push would send. Only fields a push would write are touched,
/// so pushing the result straight back reports every section as up to date.
pub async fn update_local_config(
    ctx: &RequestContext,
    deps: &UpdateLocalConfigDeps,
    project_ref: &str,
    config: &mut Config,
) -> Result<()> {
    ctx.ensure_not_cancelled("update_local_config.api")?;
    let postgrest = read_section(SECTION_API, deps.api.get_postgrest_config(ctx, project_ref)).await?;
    config.api.from_remote(&postgrest);

    ctx.ensure_not_cancelled("update_local_config.db_settings")?;
    let postgres =
        read_section(SECTION_DB_SETTINGS, deps.api.get_postgres_config(ctx, project_ref)).await?;
    config.db.settings.from_remote(&postgres);

    if config.db.network_restrictions.enabled {
        ctx.ensure_not_cancelled("update_local_config.network_restrictions")?;
        let restrictions = read_section(
            SECTION_NETWORK_RESTRICTIONS,
            deps.api.get_network_restrictions(ctx, project_ref),
        )
        .await?;
        config.db.network_restrictions.from_remote(&restrictions);
    }

    if config.auth.enabled {
        ctx.ensure_not_cancelled("update_local_config.auth")?;
        let auth = read_section(SECTION_AUTH, deps.api.get_auth_config(ctx, project_ref)).await?;
        config.auth.from_remote(&auth);
    }

    if config.storage.enabled {
        ctx.ensure_not_cancelled("update_local_config.storage")?;
        let storage =
            read_section(SECTION_STORAGE, deps.api.get_storage_config(ctx, project_ref)).await?;
        config.storage.from_remote(&storage);
    }

    tracing::debug!(project_ref, "local config seeded from remote");
    Ok(())
}
