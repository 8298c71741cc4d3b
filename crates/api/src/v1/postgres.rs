//! Postgres server settings bodies.

use serde::{Deserialize, Serialize};

/// `session_replication_role` transport values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionReplicationRole {
    /// Default: triggers and rules fire normally.
    Origin,
    /// Replica mode.
    Replica,
    /// Local mode.
    Local,
}

macro_rules! postgres_settings {
    ($(#[$meta:meta])* $name:ident { $($extra:tt)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            /// `effective_cache_size`, e.g. `"4GB"`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub effective_cache_size: Option<String>,
            /// `logical_decoding_work_mem`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub logical_decoding_work_mem: Option<String>,
            /// `maintenance_work_mem`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub maintenance_work_mem: Option<String>,
            /// `max_connections`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_connections: Option<i64>,
            /// `max_locks_per_transaction`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_locks_per_transaction: Option<i64>,
            /// `max_parallel_maintenance_workers`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_parallel_maintenance_workers: Option<i64>,
            /// `max_parallel_workers`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_parallel_workers: Option<i64>,
            /// `max_parallel_workers_per_gather`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_parallel_workers_per_gather: Option<i64>,
            /// `max_replication_slots`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_replication_slots: Option<i64>,
            /// `max_slot_wal_keep_size`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_slot_wal_keep_size: Option<String>,
            /// `max_standby_archive_delay`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_standby_archive_delay: Option<String>,
            /// `max_standby_streaming_delay`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_standby_streaming_delay: Option<String>,
            /// `max_wal_size`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_wal_size: Option<String>,
            /// `max_wal_senders`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_wal_senders: Option<i64>,
            /// `max_worker_processes`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub max_worker_processes: Option<i64>,
            /// `session_replication_role`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub session_replication_role: Option<SessionReplicationRole>,
            /// `shared_buffers`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub shared_buffers: Option<String>,
            /// `statement_timeout`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub statement_timeout: Option<String>,
            /// `track_activity_query_size`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub track_activity_query_size: Option<String>,
            /// `track_commit_timestamp`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub track_commit_timestamp: Option<bool>,
            /// `wal_keep_size`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub wal_keep_size: Option<String>,
            /// `wal_sender_timeout`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub wal_sender_timeout: Option<String>,
            /// `work_mem`.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub work_mem: Option<String>,
            $($extra)*
        }
    };
}

postgres_settings!(
    /// `GET /v1/projects/{ref}/config/database/postgres` response.
    PostgresConfigResponse {}
);

postgres_settings!(
    /// `PUT /v1/projects/{ref}/config/database/postgres` body.
    UpdatePostgresConfigBody {
        /// Restart the database after applying settings.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub restart_database: Option<bool>,
    }
);
