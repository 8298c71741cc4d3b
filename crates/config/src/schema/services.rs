//! Smaller service sections: realtime, studio, inbucket, edge runtime,
//! analytics, and experimental flags.

use crate::secret::Secret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `[realtime]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Run the realtime service.
    pub enabled: bool,
    /// Address family the realtime server binds to.
    pub ip_version: AddressFamily,
    /// Largest accepted request header, in bytes.
    pub max_header_length: u32,
}

/// IP address family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressFamily {
    #[default]
    #[serde(rename = "IPv4")]
    Ipv4,
    #[serde(rename = "IPv6")]
    Ipv6,
}

impl AddressFamily {
    /// Accepted spellings.
    pub const ALLOWED: [&'static str; 2] = ["IPv4", "IPv6"];
}

/// `[studio]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Run Studio.
    pub enabled: bool,
    /// Host port.
    pub port: u16,
    /// API URL the dashboard talks to.
    pub api_url: String,
    /// Key for the SQL assistant.
    pub openai_api_key: Secret,
}

/// `[inbucket]`: the local email sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InbucketConfig {
    /// Run the local mail catcher.
    pub enabled: bool,
    /// Web UI port.
    pub port: u16,
    /// SMTP port.
    #[serde(skip_serializing_if = "is_zero_port")]
    pub smtp_port: u16,
    /// POP3 port.
    #[serde(skip_serializing_if = "is_zero_port")]
    pub pop3_port: u16,
    /// Sender address.
    pub admin_email: String,
    /// Sender display name.
    pub sender_name: String,
}

#[expect(clippy::trivially_copy_pass_by_ref, reason = "serde passes fields by reference")]
const fn is_zero_port(port: &u16) -> bool {
    *port == 0
}

/// `[edge_runtime]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeRuntimeConfig {
    /// Run the edge runtime.
    pub enabled: bool,
    /// How requests are dispatched to workers.
    pub policy: RequestPolicy,
    /// Debugger port.
    pub inspector_port: u16,
    /// Major Deno version the runtime emulates.
    pub deno_version: u32,
    /// Secrets exposed to functions as environment variables.
    pub secrets: BTreeMap<String, Secret>,
}

impl EdgeRuntimeConfig {
    pub(crate) fn secrets_mut(&mut self) -> Vec<(String, &mut Secret)> {
        self.secrets
            .iter_mut()
            .map(|(name, secret)| (format!("secrets.{name}"), secret))
            .collect()
    }
}

/// Edge runtime worker policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPolicy {
    /// A fresh worker per request; supports hot reload.
    #[default]
    Oneshot,
    /// One long-lived worker per function.
    PerWorker,
}

impl RequestPolicy {
    /// Accepted spellings.
    pub const ALLOWED: [&'static str; 2] = ["oneshot", "per_worker"];
}

/// `[analytics]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Run log analytics.
    pub enabled: bool,
    /// Host port.
    pub port: u16,
    /// Log storage backend.
    pub backend: LogflareBackend,
    /// Required when `backend = "bigquery"`.
    pub gcp_project_id: String,
    /// Required when `backend = "bigquery"`.
    pub gcp_project_number: String,
    /// Service account key path; required when `backend = "bigquery"`.
    pub gcp_jwt_path: String,
    /// Log collector port.
    pub vector_port: u16,
}

/// Analytics storage backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogflareBackend {
    #[default]
    Postgres,
    Bigquery,
}

impl LogflareBackend {
    /// Accepted spellings.
    pub const ALLOWED: [&'static str; 2] = ["postgres", "bigquery"];
}

/// `[experimental]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentalConfig {
    /// OrioleDB image version; empty runs stock Postgres.
    pub orioledb_version: String,
    /// S3 endpoint for OrioleDB.
    pub s3_host: String,
    /// S3 region.
    pub s3_region: String,
    /// S3 access key.
    pub s3_access_key: String,
    /// S3 secret key.
    pub s3_secret_key: String,
    /// Database webhooks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhooks: Option<WebhooksConfig>,
}

/// `[experimental.webhooks]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhooksConfig {
    /// Enable database webhooks on the project.
    pub enabled: bool,
}
