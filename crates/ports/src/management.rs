//! Management control-plane boundary contract.
//!
//! Transport failures (DNS, TLS, connection resets, cancellation) are
//! returned as `Err`. Any HTTP response, including non-2xx, is returned as
//! `Ok(ApiResponse)` so callers can surface the status verbatim.

use crate::BoxFuture;
use std::sync::Arc;
use supaconf_api::v1::{
    ApiResponse, AuthConfigResponse, BranchResponse, CreateBranchBody, CreateProjectBody,
    NetworkRestrictionsRequest, NetworkRestrictionsResponse, PostgresConfigResponse,
    PostgrestConfigResponse, ProjectResponse, StorageBucketResponse, StorageConfigResponse,
    UpdateAuthConfigBody, UpdateBranchBody, UpdatePostgresConfigBody, UpdatePostgrestConfigBody,
    UpdateStorageBucketBody, UpdateStorageConfigBody,
};
use supaconf_shared::{RequestContext, Result};

/// Response future returned by every control-plane method.
pub type ApiFuture<'a, T> = BoxFuture<'a, Result<ApiResponse<T>>>;

/// Typed control-plane client, one method per endpoint.
pub trait ManagementApiPort: Send + Sync {
    /// `GET /v1/projects/{ref}/postgrest`.
    fn get_postgrest_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, PostgrestConfigResponse>;

    /// `PATCH /v1/projects/{ref}/postgrest`.
    fn update_postgrest_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdatePostgrestConfigBody,
    ) -> ApiFuture<'a, PostgrestConfigResponse>;

    /// `GET /v1/projects/{ref}/config/database/postgres`.
    fn get_postgres_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, PostgresConfigResponse>;

    /// `PUT /v1/projects/{ref}/config/database/postgres`.
    fn update_postgres_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdatePostgresConfigBody,
    ) -> ApiFuture<'a, PostgresConfigResponse>;

    /// `GET /v1/projects/{ref}/network-restrictions`.
    fn get_network_restrictions<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, NetworkRestrictionsResponse>;

    /// `PUT /v1/projects/{ref}/network-restrictions/apply`.
    fn apply_network_restrictions<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a NetworkRestrictionsRequest,
    ) -> ApiFuture<'a, NetworkRestrictionsResponse>;

    /// `GET /v1/projects/{ref}/config/auth`.
    fn get_auth_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, AuthConfigResponse>;

    /// `PATCH /v1/projects/{ref}/config/auth`.
    fn update_auth_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdateAuthConfigBody,
    ) -> ApiFuture<'a, AuthConfigResponse>;

    /// `GET /v1/projects/{ref}/config/storage`.
    fn get_storage_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, StorageConfigResponse>;

    /// `PATCH /v1/projects/{ref}/config/storage`.
    fn update_storage_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdateStorageConfigBody,
    ) -> ApiFuture<'a, ()>;

    /// `POST /v1/projects/{ref}/database/webhooks/enable`.
    fn enable_webhooks<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, ()>;

    /// `GET /v1/projects/{ref}/storage/buckets`.
    fn list_buckets<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, Vec<StorageBucketResponse>>;

    /// `PATCH /v1/projects/{ref}/storage/buckets/{id}`.
    fn update_bucket<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        bucket_id: &'a str,
        body: &'a UpdateStorageBucketBody,
    ) -> ApiFuture<'a, ()>;

    /// `GET /v1/projects/{ref}/branches`.
    fn list_branches<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, Vec<BranchResponse>>;

    /// `POST /v1/projects/{ref}/branches`.
    fn create_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a CreateBranchBody,
    ) -> ApiFuture<'a, BranchResponse>;

    /// `GET /v1/branches/{id}`.
    fn get_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        branch_id: &'a str,
    ) -> ApiFuture<'a, BranchResponse>;

    /// `PATCH /v1/branches/{id}`.
    fn update_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        branch_id: &'a str,
        body: &'a UpdateBranchBody,
    ) -> ApiFuture<'a, BranchResponse>;

    /// `DELETE /v1/branches/{id}`.
    fn delete_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        branch_id: &'a str,
    ) -> ApiFuture<'a, ()>;

    /// `GET /v1/projects`.
    fn list_projects<'a>(&'a self, ctx: &'a RequestContext) -> ApiFuture<'a, Vec<ProjectResponse>>;

    /// `POST /v1/projects`.
    fn create_project<'a>(
        &'a self,
        ctx: &'a RequestContext,
        body: &'a CreateProjectBody,
    ) -> ApiFuture<'a, ProjectResponse>;

    /// `GET /v1/projects/{ref}`.
    fn get_project<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, ProjectResponse>;

    /// `DELETE /v1/projects/{ref}`.
    fn delete_project<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, ()>;
}

/// Shared control-plane handle.
pub type SharedManagementApi = Arc<dyn ManagementApiPort>;
