//! Control-plane v1 DTOs.

mod auth;
mod branches;
mod network;
mod nullable;
mod postgres;
mod postgrest;
mod projects;
mod response;
mod storage;

pub use auth::{
    AuthConfigResponse, CaptchaProvider, PasswordRequiredCharacters, SmsProvider,
    UpdateAuthConfigBody,
};
pub use branches::{BranchResponse, BranchStatus, CreateBranchBody, UpdateBranchBody};
pub use network::{
    NetworkRestrictionsConfig, NetworkRestrictionsRequest, NetworkRestrictionsResponse,
};
pub use nullable::Nullable;
pub use postgres::{PostgresConfigResponse, SessionReplicationRole, UpdatePostgresConfigBody};
pub use postgrest::{PostgrestConfigResponse, UpdatePostgrestConfigBody};
pub use projects::{CreateProjectBody, ProjectResponse, ProjectStatus};
pub use response::ApiResponse;
pub use storage::{
    StorageBucketResponse, StorageConfigResponse, StorageFeatureFlag, StorageFeatures,
    UpdateStorageBucketBody, UpdateStorageConfigBody,
};
