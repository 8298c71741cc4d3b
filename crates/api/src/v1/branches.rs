//! Preview branch bodies.

use serde::{Deserialize, Serialize};

/// Branch lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchStatus {
    /// Waiting for the first deployment.
    CreatingProject,
    /// Running migrations.
    RunningMigrations,
    /// Ready for use.
    MigrationsPassed,
    /// Migrations failed.
    MigrationsFailed,
    /// Functions deployed.
    FunctionsDeployed,
    /// Functions failed to deploy.
    FunctionsFailed,
}

/// A preview branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchResponse {
    /// Branch id.
    pub id: String,
    /// Branch name.
    pub name: String,
    /// Project ref of the branch database.
    pub project_ref: String,
    /// Project ref of the parent project.
    pub parent_project_ref: String,
    /// Whether this is the default branch.
    #[serde(default)]
    pub is_default: bool,
    /// Linked git branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// Whether the branch survives PR merges.
    #[serde(default)]
    pub persistent: bool,
    /// Lifecycle status.
    pub status: BranchStatus,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Update timestamp.
    #[serde(default)]
    pub updated_at: String,
}

/// `POST /v1/projects/{ref}/branches` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBranchBody {
    /// Branch name.
    pub branch_name: String,
    /// Linked git branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// Whether the branch survives PR merges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
    /// Region for the branch database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// `PATCH /v1/branches/{id}` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBranchBody {
    /// New branch name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    /// New linked git branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// Persistence flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
}
