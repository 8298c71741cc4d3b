//! `[db]`: Postgres, pooler, migrations, seeding, and runtime settings.

use crate::glob::resolve_globs;
use crate::secret::Secret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use supaconf_ports::FileSystemPort;
use supaconf_shared::Result;

/// Postgres major versions a project may run.
pub const SUPPORTED_MAJOR_VERSIONS: [u32; 4] = [13, 14, 15, 17];

/// Database settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Local database port.
    pub port: u16,
    /// Port of the shadow database used for diffing.
    pub shadow_port: u16,
    /// Postgres major version; one of [`SUPPORTED_MAJOR_VERSIONS`].
    pub major_version: u32,
    /// Root encryption key.
    pub root_key: Secret,
    /// Connection pooler.
    pub pooler: PoolerConfig,
    /// Migration settings.
    pub migrations: MigrationsConfig,
    /// Seed settings.
    pub seed: SeedConfig,
    /// Postgres server settings pushed to the platform.
    pub settings: DbSettings,
    /// Database network restrictions.
    pub network_restrictions: NetworkRestrictions,
    /// Secrets stored in the project vault, by name.
    pub vault: BTreeMap<String, Secret>,
}

impl DbConfig {
    pub(crate) fn secrets_mut(&mut self) -> Vec<(String, &mut Secret)> {
        let mut secrets = vec![("root_key".to_string(), &mut self.root_key)];
        secrets.extend(
            self.vault
                .iter_mut()
                .map(|(name, secret)| (format!("vault.{name}"), secret)),
        );
        secrets
    }
}

/// `[db.pooler]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolerConfig {
    /// Run the connection pooler.
    pub enabled: bool,
    /// Local pooler port.
    pub port: u16,
    /// Pooling mode.
    pub pool_mode: PoolMode,
    /// Server connections per user/database pair.
    pub default_pool_size: u32,
    /// Maximum client connections.
    pub max_client_conn: u32,
}

/// Connection pooling mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolMode {
    #[default]
    Transaction,
    Session,
}

impl PoolMode {
    /// Accepted spellings.
    pub const ALLOWED: [&'static str; 2] = ["transaction", "session"];
}

/// `[db.migrations]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationsConfig {
    /// Apply migrations on reset.
    pub enabled: bool,
    /// Declarative schema files, as globs relative to the supabase directory.
    pub schema_paths: Vec<String>,
}

/// `[db.seed]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Run seed files on reset.
    pub enabled: bool,
    /// Seed files, as globs relative to the supabase directory.
    pub sql_paths: Vec<String>,
}

impl SeedConfig {
    /// Expand `sql_paths` into concrete files, in first-match order.
    pub fn resolve_sql_paths(&self, fs: &dyn FileSystemPort, supabase_dir: &Path) -> Result<Vec<PathBuf>> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        resolve_globs(fs, supabase_dir, &self.sql_paths)
    }
}

/// Replication role applied to sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionReplicationRole {
    Origin,
    Replica,
    Local,
}

impl SessionReplicationRole {
    /// Accepted spellings.
    pub const ALLOWED: [&'static str; 3] = ["origin", "replica", "local"];
}

/// `[db.settings]`: Postgres GUCs pushed to the hosted database.
///
/// Unset fields keep the platform default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbSettings {
    /// Planner estimate of cache size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_cache_size: Option<String>,
    /// Memory per logical decoding worker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_decoding_work_mem: Option<String>,
    /// Memory for maintenance operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_work_mem: Option<String>,
    /// Maximum concurrent connections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    /// Lock table slots per transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_locks_per_transaction: Option<u32>,
    /// Parallel workers per maintenance command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel_maintenance_workers: Option<u32>,
    /// Parallel workers in total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel_workers: Option<u32>,
    /// Parallel workers per gather node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel_workers_per_gather: Option<u32>,
    /// Replication slots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_replication_slots: Option<u32>,
    /// WAL retained by replication slots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_slot_wal_keep_size: Option<String>,
    /// Query cancel delay for archived WAL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_standby_archive_delay: Option<String>,
    /// Query cancel delay for streamed WAL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_standby_streaming_delay: Option<String>,
    /// WAL size that triggers a checkpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wal_size: Option<String>,
    /// Concurrent WAL sender processes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wal_senders: Option<u32>,
    /// Background worker processes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_worker_processes: Option<u32>,
    /// Replication role for new sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_replication_role: Option<SessionReplicationRole>,
    /// Shared memory buffers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_buffers: Option<String>,
    /// Statement timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_timeout: Option<String>,
    /// Bytes of query text tracked per session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_activity_query_size: Option<String>,
    /// Record commit timestamps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_commit_timestamp: Option<bool>,
    /// WAL kept for standby servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wal_keep_size: Option<String>,
    /// Replication connection timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wal_sender_timeout: Option<String>,
    /// Memory per sort or hash operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_mem: Option<String>,
}

/// `[db.network_restrictions]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkRestrictions {
    /// Restrict database access by CIDR.
    pub enabled: bool,
    /// Allowed IPv4 ranges.
    pub allowed_cidrs: Vec<String>,
    /// Allowed IPv6 ranges.
    pub allowed_cidrs_v6: Vec<String>,
}
