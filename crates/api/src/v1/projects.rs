//! Project bodies.

use serde::{Deserialize, Serialize};

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    /// Being provisioned.
    ComingUp,
    /// Serving traffic.
    ActiveHealthy,
    /// Running with degraded services.
    ActiveUnhealthy,
    /// Paused.
    Inactive,
    /// Being restored.
    Restoring,
    /// Being upgraded.
    Upgrading,
    /// Being removed.
    Removed,
    /// Any status this client does not know yet.
    #[serde(other)]
    Unknown,
}

/// A managed project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectResponse {
    /// Project ref (20 lowercase letters).
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Display name.
    pub name: String,
    /// Hosting region.
    pub region: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
}

/// `POST /v1/projects` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectBody {
    /// Display name.
    pub name: String,
    /// Owning organization.
    pub organization_id: String,
    /// Database password for the `postgres` role.
    pub db_pass: String,
    /// Hosting region.
    pub region: String,
}
