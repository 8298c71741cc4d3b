//! `[db.settings]` and `[db.network_restrictions]`.

use crate::diff::diff_with_seed;
use crate::error::ConfigError;
use crate::schema::{DbSettings, NetworkRestrictions, SessionReplicationRole};
use supaconf_api::v1::{
    self, NetworkRestrictionsRequest, NetworkRestrictionsResponse, PostgresConfigResponse,
    UpdatePostgresConfigBody,
};

impl From<SessionReplicationRole> for v1::SessionReplicationRole {
    fn from(role: SessionReplicationRole) -> Self {
        match role {
            SessionReplicationRole::Origin => Self::Origin,
            SessionReplicationRole::Replica => Self::Replica,
            SessionReplicationRole::Local => Self::Local,
        }
    }
}

impl From<v1::SessionReplicationRole> for SessionReplicationRole {
    fn from(role: v1::SessionReplicationRole) -> Self {
        match role {
            v1::SessionReplicationRole::Origin => Self::Origin,
            v1::SessionReplicationRole::Replica => Self::Replica,
            v1::SessionReplicationRole::Local => Self::Local,
        }
    }
}

fn wire(value: Option<u32>) -> Option<i64> {
    value.map(i64::from)
}

fn local(value: Option<i64>) -> Option<u32> {
    value.and_then(|value| u32::try_from(value).ok())
}

fn adopt<T>(slot: &mut Option<T>, remote: Option<T>) {
    if slot.is_some() {
        *slot = remote;
    }
}

impl DbSettings {
    /// PUT body; unset settings are omitted so the platform keeps its defaults.
    pub fn to_update_body(&self) -> UpdatePostgresConfigBody {
        UpdatePostgresConfigBody {
            effective_cache_size: self.effective_cache_size.clone(),
            logical_decoding_work_mem: self.logical_decoding_work_mem.clone(),
            maintenance_work_mem: self.maintenance_work_mem.clone(),
            max_connections: wire(self.max_connections),
            max_locks_per_transaction: wire(self.max_locks_per_transaction),
            max_parallel_maintenance_workers: wire(self.max_parallel_maintenance_workers),
            max_parallel_workers: wire(self.max_parallel_workers),
            max_parallel_workers_per_gather: wire(self.max_parallel_workers_per_gather),
            max_replication_slots: wire(self.max_replication_slots),
            max_slot_wal_keep_size: self.max_slot_wal_keep_size.clone(),
            max_standby_archive_delay: self.max_standby_archive_delay.clone(),
            max_standby_streaming_delay: self.max_standby_streaming_delay.clone(),
            max_wal_size: self.max_wal_size.clone(),
            max_wal_senders: wire(self.max_wal_senders),
            max_worker_processes: wire(self.max_worker_processes),
            session_replication_role: self.session_replication_role.map(Into::into),
            shared_buffers: self.shared_buffers.clone(),
            statement_timeout: self.statement_timeout.clone(),
            track_activity_query_size: self.track_activity_query_size.clone(),
            track_commit_timestamp: self.track_commit_timestamp,
            wal_keep_size: self.wal_keep_size.clone(),
            wal_sender_timeout: self.wal_sender_timeout.clone(),
            work_mem: self.work_mem.clone(),
            restart_database: None,
        }
    }

    /// Adopt remote values for the settings set locally; unset settings stay
    /// unset since the PUT body never carries them.
    pub fn from_remote(&mut self, remote: &PostgresConfigResponse) {
        adopt(&mut self.effective_cache_size, remote.effective_cache_size.clone());
        adopt(&mut self.logical_decoding_work_mem, remote.logical_decoding_work_mem.clone());
        adopt(&mut self.maintenance_work_mem, remote.maintenance_work_mem.clone());
        adopt(&mut self.max_connections, local(remote.max_connections));
        adopt(&mut self.max_locks_per_transaction, local(remote.max_locks_per_transaction));
        adopt(
            &mut self.max_parallel_maintenance_workers,
            local(remote.max_parallel_maintenance_workers),
        );
        adopt(&mut self.max_parallel_workers, local(remote.max_parallel_workers));
        adopt(
            &mut self.max_parallel_workers_per_gather,
            local(remote.max_parallel_workers_per_gather),
        );
        adopt(&mut self.max_replication_slots, local(remote.max_replication_slots));
        adopt(&mut self.max_slot_wal_keep_size, remote.max_slot_wal_keep_size.clone());
        adopt(&mut self.max_standby_archive_delay, remote.max_standby_archive_delay.clone());
        adopt(&mut self.max_standby_streaming_delay, remote.max_standby_streaming_delay.clone());
        adopt(&mut self.max_wal_size, remote.max_wal_size.clone());
        adopt(&mut self.max_wal_senders, local(remote.max_wal_senders));
        adopt(&mut self.max_worker_processes, local(remote.max_worker_processes));
        adopt(
            &mut self.session_replication_role,
            remote.session_replication_role.map(Into::into),
        );
        adopt(&mut self.shared_buffers, remote.shared_buffers.clone());
        adopt(&mut self.statement_timeout, remote.statement_timeout.clone());
        adopt(&mut self.track_activity_query_size, remote.track_activity_query_size.clone());
        adopt(&mut self.track_commit_timestamp, remote.track_commit_timestamp);
        adopt(&mut self.wal_keep_size, remote.wal_keep_size.clone());
        adopt(&mut self.wal_sender_timeout, remote.wal_sender_timeout.clone());
        adopt(&mut self.work_mem, remote.work_mem.clone());
    }

    /// Unified diff of local against remote; empty when in sync.
    pub fn diff_with_remote(&self, remote: &PostgresConfigResponse) -> Result<String, ConfigError> {
        diff_with_seed("db.settings", self, |seeded| seeded.from_remote(remote))
    }
}

impl NetworkRestrictions {
    /// PUT body; disabled restrictions send empty allow lists.
    pub fn to_update_body(&self) -> NetworkRestrictionsRequest {
        if !self.enabled {
            return NetworkRestrictionsRequest {
                db_allowed_cidrs: Some(Vec::new()),
                db_allowed_cidrs_v6: Some(Vec::new()),
            };
        }
        NetworkRestrictionsRequest {
            db_allowed_cidrs: Some(self.allowed_cidrs.clone()),
            db_allowed_cidrs_v6: Some(self.allowed_cidrs_v6.clone()),
        }
    }

    /// Adopt the remote allow lists, absent lists reading as empty; a disabled
    /// local section is left alone.
    pub fn from_remote(&mut self, remote: &NetworkRestrictionsResponse) {
        if !self.enabled {
            return;
        }
        self.allowed_cidrs = remote.config.db_allowed_cidrs.clone().unwrap_or_default();
        self.allowed_cidrs_v6 = remote.config.db_allowed_cidrs_v6.clone().unwrap_or_default();
    }

    /// Unified diff of local against remote; empty when in sync.
    pub fn diff_with_remote(&self, remote: &NetworkRestrictionsResponse) -> Result<String, ConfigError> {
        diff_with_seed("db.network_restrictions", self, |seeded| seeded.from_remote(remote))
    }
}
