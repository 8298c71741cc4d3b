//! Stateful fake of the management control plane.
//!
//! Reads serve the stored state; writes merge the request body into it the
//! way the platform does, so a second push after a successful one sees no
//! drift. Secret fields are stored as the hash the platform would report
//! when a hasher is installed, and verbatim otherwise.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use supaconf_api::v1::{
    ApiResponse, AuthConfigResponse, BranchResponse, BranchStatus, CreateBranchBody,
    CreateProjectBody, NetworkRestrictionsRequest, NetworkRestrictionsResponse,
    PostgresConfigResponse, PostgrestConfigResponse, ProjectResponse, ProjectStatus,
    StorageBucketResponse, StorageConfigResponse, UpdateAuthConfigBody, UpdateBranchBody,
    UpdatePostgresConfigBody, UpdatePostgrestConfigBody, UpdateStorageBucketBody,
    UpdateStorageConfigBody,
};
use supaconf_ports::{ApiFuture, ManagementApiPort};
use supaconf_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use tokio::sync::RwLock;

/// Maps a cleartext secret to the digest the platform reports for it.
pub type SecretHasher = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Stored control-plane state for one project.
#[derive(Debug, Clone, Default)]
pub struct FakeProjectState {
    /// Data API config.
    pub postgrest: PostgrestConfigResponse,
    /// Postgres settings.
    pub postgres: PostgresConfigResponse,
    /// Network restrictions.
    pub network_restrictions: NetworkRestrictionsResponse,
    /// Auth config.
    pub auth: AuthConfigResponse,
    /// Storage config.
    pub storage: StorageConfigResponse,
    /// Storage buckets.
    pub buckets: Vec<StorageBucketResponse>,
    /// Whether database webhooks were enabled.
    pub webhooks_enabled: bool,
}

/// One request seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Operation name, e.g. `update_auth_config`.
    pub operation: &'static str,
    /// Project ref or branch id the call targeted.
    pub target: String,
    /// Request body as JSON, if any.
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct State {
    projects: BTreeMap<String, FakeProjectState>,
    project_meta: BTreeMap<String, ProjectResponse>,
    branches: BTreeMap<String, BranchResponse>,
    failures: BTreeMap<&'static str, (u16, String)>,
    calls: Vec<RecordedCall>,
}

/// In-memory [`ManagementApiPort`].
#[derive(Default)]
pub struct FakeManagementApi {
    state: RwLock<State>,
    hasher: Option<SecretHasher>,
}

impl fmt::Debug for FakeManagementApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeManagementApi")
            .field("hashes_secrets", &self.hasher.is_some())
            .finish_non_exhaustive()
    }
}

/// Auth members holding credentials the platform stores hashed.
fn is_hashed_secret_field(key: &str) -> bool {
    ["_secret", "_secrets", "_auth_token", "_access_key"]
        .iter()
        .any(|suffix| key.ends_with(suffix))
        || key == "smtp_pass"
        || key == "sms_textlocal_api_key"
}

fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if let Some(existing) = target
                    .get_mut(&key)
                    .filter(|existing| existing.is_object() && value.is_object())
                {
                    merge(existing, value);
                    continue;
                }
                target.insert(key, value);
            }
        },
        (target, patch) => *target = patch,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|error| {
        ErrorEnvelope::expected(ErrorCode::invalid_input(), format!("unserializable body: {error}"))
    })
}

fn from_json<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|error| {
        ErrorEnvelope::expected(ErrorCode::invalid_input(), format!("body does not fit state: {error}"))
    })
}

/// Merge a request body into a stored response, returning the new response.
fn patched<T, B>(current: &T, body: &B, hasher: Option<&SecretHasher>) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    B: Serialize,
{
    let mut patch = to_json(body)?;
    if let (Some(hasher), Some(members)) = (hasher, patch.as_object_mut()) {
        for (key, value) in members.iter_mut() {
            if let (true, Some(text)) = (is_hashed_secret_field(key), value.as_str()) {
                *value = Value::String(hasher(text));
            }
        }
    }
    let mut state = to_json(current)?;
    merge(&mut state, patch);
    from_json(state)
}

/// Twenty lowercase letters, distinct per index.
fn project_ref_for(index: usize) -> String {
    let mut letters = ['a'; 20];
    let mut rest = index;
    for slot in letters.iter_mut().rev() {
        *slot = char::from(b'a' + u8::try_from(rest % 26).unwrap_or(0));
        rest /= 26;
    }
    letters.iter().collect()
}

fn not_found_response<T>(what: &str) -> ApiResponse<T> {
    ApiResponse::status(404, format!("{{\"message\":\"{what} not found\"}}"))
}

impl FakeManagementApi {
    /// Fake with no projects.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store secrets as `hasher(cleartext)`, as the platform does.
    #[must_use]
    pub fn with_secret_hasher(mut self, hasher: SecretHasher) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Seed (or replace) the state of a project.
    pub async fn insert_project(&self, project_ref: impl Into<String>, project: FakeProjectState) {
        self.state.write().await.projects.insert(project_ref.into(), project);
    }

    /// Snapshot of a project's state.
    pub async fn project(&self, project_ref: &str) -> Option<FakeProjectState> {
        self.state.read().await.projects.get(project_ref).cloned()
    }

    /// Make every call of `operation` answer with `status` and `body`.
    pub async fn fail_with(&self, operation: &'static str, status: u16, body: impl Into<String>) {
        self.state
            .write()
            .await
            .failures
            .insert(operation, (status, body.into()));
    }

    /// Every call seen so far, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.read().await.calls.clone()
    }

    /// Operation names of every call seen so far, in order.
    pub async fn operations(&self) -> Vec<&'static str> {
        self.state
            .read()
            .await
            .calls
            .iter()
            .map(|call| call.operation)
            .collect()
    }

    /// Record the call and return the injected failure for it, if any.
    async fn begin<T>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        target: &str,
        body: Option<Value>,
    ) -> Result<Option<ApiResponse<T>>> {
        ctx.ensure_not_cancelled(operation)?;
        let mut state = self.state.write().await;
        state.calls.push(RecordedCall {
            operation,
            target: target.to_string(),
            body,
        });
        Ok(state
            .failures
            .get(operation)
            .map(|(status, body)| ApiResponse::status(*status, body.clone())))
    }

    async fn read_project<T>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        project_ref: &str,
        select: impl FnOnce(&FakeProjectState) -> T,
    ) -> Result<ApiResponse<T>> {
        if let Some(failure) = self.begin(ctx, operation, project_ref, None).await? {
            return Ok(failure);
        }
        let state = self.state.read().await;
        Ok(state
            .projects
            .get(project_ref)
            .map_or_else(|| not_found_response("project"), |project| ApiResponse::ok(select(project))))
    }

    async fn write_project<B, T>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        project_ref: &str,
        body: &B,
        apply: impl FnOnce(&mut FakeProjectState, Option<&SecretHasher>) -> Result<T>,
    ) -> Result<ApiResponse<T>>
    where
        B: Serialize,
    {
        if let Some(failure) = self.begin(ctx, operation, project_ref, Some(to_json(body)?)).await? {
            return Ok(failure);
        }
        let mut state = self.state.write().await;
        let Some(project) = state.projects.get_mut(project_ref) else {
            return Ok(not_found_response("project"));
        };
        Ok(ApiResponse::ok(apply(project, self.hasher.as_ref())?))
    }
}

impl ManagementApiPort for FakeManagementApi {
    fn get_postgrest_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, PostgrestConfigResponse> {
        Box::pin(async move {
            self.read_project(ctx, "get_postgrest_config", project_ref, |project| {
                project.postgrest.clone()
            })
            .await
        })
    }

    fn update_postgrest_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdatePostgrestConfigBody,
    ) -> ApiFuture<'a, PostgrestConfigResponse> {
        Box::pin(async move {
            self.write_project(ctx, "update_postgrest_config", project_ref, body, |project, hasher| {
                project.postgrest = patched(&project.postgrest, body, hasher)?;
                Ok(project.postgrest.clone())
            })
            .await
        })
    }

    fn get_postgres_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, PostgresConfigResponse> {
        Box::pin(async move {
            self.read_project(ctx, "get_postgres_config", project_ref, |project| {
                project.postgres.clone()
            })
            .await
        })
    }

    fn update_postgres_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdatePostgresConfigBody,
    ) -> ApiFuture<'a, PostgresConfigResponse> {
        Box::pin(async move {
            self.write_project(ctx, "update_postgres_config", project_ref, body, |project, hasher| {
                let settings = UpdatePostgresConfigBody {
                    restart_database: None,
                    ..body.clone()
                };
                project.postgres = patched(&project.postgres, &settings, hasher)?;
                Ok(project.postgres.clone())
            })
            .await
        })
    }

    fn get_network_restrictions<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, NetworkRestrictionsResponse> {
        Box::pin(async move {
            self.read_project(ctx, "get_network_restrictions", project_ref, |project| {
                project.network_restrictions.clone()
            })
            .await
        })
    }

    fn apply_network_restrictions<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a NetworkRestrictionsRequest,
    ) -> ApiFuture<'a, NetworkRestrictionsResponse> {
        Box::pin(async move {
            self.write_project(ctx, "apply_network_restrictions", project_ref, body, |project, _| {
                project.network_restrictions.config = body.clone();
                Ok(project.network_restrictions.clone())
            })
            .await
        })
    }

    fn get_auth_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, AuthConfigResponse> {
        Box::pin(async move {
            self.read_project(ctx, "get_auth_config", project_ref, |project| project.auth.clone())
                .await
        })
    }

    fn update_auth_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdateAuthConfigBody,
    ) -> ApiFuture<'a, AuthConfigResponse> {
        Box::pin(async move {
            self.write_project(ctx, "update_auth_config", project_ref, body, |project, hasher| {
                project.auth = patched(&project.auth, body, hasher)?;
                Ok(project.auth.clone())
            })
            .await
        })
    }

    fn get_storage_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, StorageConfigResponse> {
        Box::pin(async move {
            self.read_project(ctx, "get_storage_config", project_ref, |project| {
                project.storage.clone()
            })
            .await
        })
    }

    fn update_storage_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdateStorageConfigBody,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.write_project(ctx, "update_storage_config", project_ref, body, |project, hasher| {
                project.storage = patched(&project.storage, body, hasher)?;
                Ok(())
            })
            .await
        })
    }

    fn enable_webhooks<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.write_project(ctx, "enable_webhooks", project_ref, &(), |project, _| {
                project.webhooks_enabled = true;
                Ok(())
            })
            .await
        })
    }

    fn list_buckets<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, Vec<StorageBucketResponse>> {
        Box::pin(async move {
            self.read_project(ctx, "list_buckets", project_ref, |project| project.buckets.clone())
                .await
        })
    }

    fn update_bucket<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        bucket_id: &'a str,
        body: &'a UpdateStorageBucketBody,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.write_project(ctx, "update_bucket", project_ref, body, |project, _| {
                let bucket = project
                    .buckets
                    .iter_mut()
                    .find(|bucket| bucket.id == bucket_id)
                    .ok_or_else(|| {
                        ErrorEnvelope::expected(ErrorCode::not_found(), "bucket not found")
                            .with_metadata("bucket", bucket_id.to_string())
                    })?;
                if let Some(public) = body.public {
                    bucket.public = public;
                }
                bucket.file_size_limit = body.file_size_limit;
                bucket.allowed_mime_types.clone_from(&body.allowed_mime_types);
                Ok(())
            })
            .await
        })
    }

    fn list_branches<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, Vec<BranchResponse>> {
        Box::pin(async move {
            if let Some(failure) = self.begin(ctx, "list_branches", project_ref, None).await? {
                return Ok(failure);
            }
            let state = self.state.read().await;
            Ok(ApiResponse::ok(
                state
                    .branches
                    .values()
                    .filter(|branch| branch.parent_project_ref == project_ref)
                    .cloned()
                    .collect(),
            ))
        })
    }

    fn create_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a CreateBranchBody,
    ) -> ApiFuture<'a, BranchResponse> {
        Box::pin(async move {
            if let Some(failure) = self
                .begin(ctx, "create_branch", project_ref, Some(to_json(body)?))
                .await?
            {
                return Ok(failure);
            }
            let mut state = self.state.write().await;
            let id = format!("branch-{}", state.branches.len() + 1);
            let branch = BranchResponse {
                id: id.clone(),
                name: body.branch_name.clone(),
                project_ref: format!("{project_ref}-{}", state.branches.len() + 1),
                parent_project_ref: project_ref.to_string(),
                is_default: false,
                git_branch: body.git_branch.clone(),
                persistent: body.persistent.unwrap_or(false),
                status: BranchStatus::CreatingProject,
                created_at: String::new(),
                updated_at: String::new(),
            };
            state.branches.insert(id, branch.clone());
            Ok(ApiResponse::created(branch))
        })
    }

    fn get_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        branch_id: &'a str,
    ) -> ApiFuture<'a, BranchResponse> {
        Box::pin(async move {
            if let Some(failure) = self.begin(ctx, "get_branch", branch_id, None).await? {
                return Ok(failure);
            }
            let state = self.state.read().await;
            Ok(state
                .branches
                .get(branch_id)
                .cloned()
                .map_or_else(|| not_found_response("branch"), ApiResponse::ok))
        })
    }

    fn update_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        branch_id: &'a str,
        body: &'a UpdateBranchBody,
    ) -> ApiFuture<'a, BranchResponse> {
        Box::pin(async move {
            if let Some(failure) = self
                .begin(ctx, "update_branch", branch_id, Some(to_json(body)?))
                .await?
            {
                return Ok(failure);
            }
            let mut state = self.state.write().await;
            let Some(branch) = state.branches.get_mut(branch_id) else {
                return Ok(not_found_response("branch"));
            };
            if let Some(name) = &body.branch_name {
                branch.name.clone_from(name);
            }
            if body.git_branch.is_some() {
                branch.git_branch.clone_from(&body.git_branch);
            }
            if let Some(persistent) = body.persistent {
                branch.persistent = persistent;
            }
            Ok(ApiResponse::ok(branch.clone()))
        })
    }

    fn delete_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        branch_id: &'a str,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            if let Some(failure) = self.begin(ctx, "delete_branch", branch_id, None).await? {
                return Ok(failure);
            }
            let removed = self.state.write().await.branches.remove(branch_id);
            Ok(removed.map_or_else(|| not_found_response("branch"), |_| ApiResponse::ok(())))
        })
    }

    fn list_projects<'a>(&'a self, ctx: &'a RequestContext) -> ApiFuture<'a, Vec<ProjectResponse>> {
        Box::pin(async move {
            if let Some(failure) = self.begin(ctx, "list_projects", "", None).await? {
                return Ok(failure);
            }
            let state = self.state.read().await;
            Ok(ApiResponse::ok(state.project_meta.values().cloned().collect()))
        })
    }

    fn create_project<'a>(
        &'a self,
        ctx: &'a RequestContext,
        body: &'a CreateProjectBody,
    ) -> ApiFuture<'a, ProjectResponse> {
        Box::pin(async move {
            let mut recorded = to_json(body)?;
            if let Some(members) = recorded.as_object_mut() {
                members.remove("db_pass");
            }
            if let Some(failure) = self.begin(ctx, "create_project", "", Some(recorded)).await? {
                return Ok(failure);
            }
            let mut state = self.state.write().await;
            let id = project_ref_for(state.project_meta.len());
            let project = ProjectResponse {
                id: id.clone(),
                organization_id: body.organization_id.clone(),
                name: body.name.clone(),
                region: body.region.clone(),
                status: ProjectStatus::ComingUp,
                created_at: String::new(),
            };
            state.project_meta.insert(id.clone(), project.clone());
            state.projects.entry(id).or_default();
            Ok(ApiResponse::created(project))
        })
    }

    fn get_project<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, ProjectResponse> {
        Box::pin(async move {
            if let Some(failure) = self.begin(ctx, "get_project", project_ref, None).await? {
                return Ok(failure);
            }
            let state = self.state.read().await;
            Ok(state
                .project_meta
                .get(project_ref)
                .cloned()
                .map_or_else(|| not_found_response("project"), ApiResponse::ok))
        })
    }

    fn delete_project<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            if let Some(failure) = self.begin(ctx, "delete_project", project_ref, None).await? {
                return Ok(failure);
            }
            let mut state = self.state.write().await;
            state.projects.remove(project_ref);
            let removed = state.project_meta.remove(project_ref);
            Ok(removed.map_or_else(|| not_found_response("project"), |_| ApiResponse::ok(())))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supaconf_api::v1::Nullable;

    #[tokio::test]
    async fn writes_are_visible_to_later_reads() -> Result<()> {
        let ctx = RequestContext::new_run();
        let api = FakeManagementApi::new();
        api.insert_project("abcdefghijklmnopqrst", FakeProjectState::default())
            .await;

        let body = UpdatePostgrestConfigBody {
            db_schema: Some("public,graphql_public".to_string()),
            max_rows: Some(500),
            ..UpdatePostgrestConfigBody::default()
        };
        api.update_postgrest_config(&ctx, "abcdefghijklmnopqrst", &body)
            .await?;
        let current = api
            .get_postgrest_config(&ctx, "abcdefghijklmnopqrst")
            .await?
            .into_parsed()
            .unwrap();
        assert_eq!(current.db_schema, "public,graphql_public");
        assert_eq!(current.max_rows, 500);
        assert_eq!(
            api.operations().await,
            vec!["update_postgrest_config", "get_postgrest_config"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn secrets_are_stored_hashed() -> Result<()> {
        let ctx = RequestContext::new_run();
        let api = FakeManagementApi::new()
            .with_secret_hasher(Arc::new(|text: &str| format!("digest({text})")));
        api.insert_project("ref", FakeProjectState::default()).await;

        let body = UpdateAuthConfigBody {
            smtp_pass: Nullable::Value("hunter2".to_string()),
            ..UpdateAuthConfigBody::default()
        };
        api.update_auth_config(&ctx, "ref", &body).await?;
        let auth = api.project("ref").await.unwrap().auth;
        assert_eq!(auth.smtp_pass, Nullable::Value("digest(hunter2)".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn injected_failures_surface_as_status() -> Result<()> {
        let ctx = RequestContext::new_run();
        let api = FakeManagementApi::new();
        api.insert_project("ref", FakeProjectState::default()).await;
        api.fail_with("get_auth_config", 503, "{\"message\":\"down\"}")
            .await;

        let response = api.get_auth_config(&ctx, "ref").await?;
        assert_eq!(response.status_code, 503);
        assert!(response.parsed().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() -> Result<()> {
        let ctx = RequestContext::new_run();
        let api = FakeManagementApi::new();
        let response = api.get_storage_config(&ctx, "missing").await?;
        assert_eq!(response.status_code, 404);
        Ok(())
    }

    #[tokio::test]
    async fn cancelled_context_is_an_error() {
        let ctx = RequestContext::new_run();
        ctx.cancel();
        let api = FakeManagementApi::new();
        let result = api.list_projects(&ctx).await;
        assert!(result.is_err_and(|error| error.is_cancelled()));
    }

    #[tokio::test]
    async fn branch_lifecycle() -> Result<()> {
        let ctx = RequestContext::new_run();
        let api = FakeManagementApi::new();
        let created = api
            .create_branch(
                &ctx,
                "parent",
                &CreateBranchBody {
                    branch_name: "feature".to_string(),
                    ..CreateBranchBody::default()
                },
            )
            .await?
            .into_parsed()
            .unwrap();
        assert_eq!(api.list_branches(&ctx, "parent").await?.into_parsed().unwrap().len(), 1);
        api.delete_branch(&ctx, &created.id).await?;
        assert_eq!(api.get_branch(&ctx, &created.id).await?.status_code, 404);
        Ok(())
    }
}
