//! Data API (PostgREST) config bodies.

use super::Nullable;
use serde::{Deserialize, Serialize};

/// `GET /v1/projects/{ref}/postgrest` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgrestConfigResponse {
    /// Comma-separated exposed schemas; empty when the Data API is disabled.
    #[serde(default)]
    pub db_schema: String,
    /// Comma-separated extra search path.
    #[serde(default)]
    pub db_extra_search_path: String,
    /// Row limit for a single response.
    #[serde(default)]
    pub max_rows: i64,
    /// Connection pool size; null means platform default.
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub db_pool: Nullable<i64>,
}

/// `PATCH /v1/projects/{ref}/postgrest` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePostgrestConfigBody {
    /// Comma-separated exposed schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_schema: Option<String>,
    /// Comma-separated extra search path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_extra_search_path: Option<String>,
    /// Row limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<i64>,
    /// Pool size.
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub db_pool: Nullable<i64>,
}
