//! Network restriction bodies.

use serde::{Deserialize, Serialize};

/// CIDR allow lists as applied by the control plane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRestrictionsConfig {
    /// IPv4 CIDRs allowed to reach the database.
    #[serde(rename = "dbAllowedCidrs", default, skip_serializing_if = "Option::is_none")]
    pub db_allowed_cidrs: Option<Vec<String>>,
    /// IPv6 CIDRs allowed to reach the database.
    #[serde(rename = "dbAllowedCidrsV6", default, skip_serializing_if = "Option::is_none")]
    pub db_allowed_cidrs_v6: Option<Vec<String>>,
}

/// `GET /v1/projects/{ref}/network-restrictions` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRestrictionsResponse {
    /// Currently applied restrictions.
    #[serde(default)]
    pub config: NetworkRestrictionsConfig,
    /// Plan entitlement, e.g. `"allowed"`.
    #[serde(default)]
    pub entitlement: String,
    /// Rollout status, e.g. `"applied"`.
    #[serde(default)]
    pub status: String,
}

/// `PUT /v1/projects/{ref}/network-restrictions/apply` body.
pub type NetworkRestrictionsRequest = NetworkRestrictionsConfig;
