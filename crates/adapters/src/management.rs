//! Management API adapter over HTTPS.

use crate::http::{self, RawResponse};
use serde::de::DeserializeOwned;
use std::time::Duration;
use supaconf_api::v1::{
    ApiResponse, AuthConfigResponse, BranchResponse, CreateBranchBody, CreateProjectBody,
    NetworkRestrictionsRequest, NetworkRestrictionsResponse, PostgresConfigResponse,
    PostgrestConfigResponse, ProjectResponse, StorageBucketResponse, StorageConfigResponse,
    UpdateAuthConfigBody, UpdateBranchBody, UpdatePostgresConfigBody, UpdatePostgrestConfigBody,
    UpdateStorageBucketBody, UpdateStorageConfigBody,
};
use supaconf_ports::{ApiFuture, ManagementApiPort};
use supaconf_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result, SecretString};

/// Production control-plane endpoint.
pub const DEFAULT_API_URL: &str = "https://api.supabase.com";

const NAMESPACE: &str = "management";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Configuration for [`HttpManagementApi`].
#[derive(Debug, Clone)]
pub struct HttpManagementApiConfig {
    /// Personal access token sent as a bearer credential.
    pub access_token: SecretString,
    /// Overrides [`DEFAULT_API_URL`].
    pub base_url: Option<Box<str>>,
    /// Whole-request timeout.
    pub timeout_ms: u64,
    /// Overrides the default `supaconf/<version>` user agent.
    pub user_agent: Option<Box<str>>,
}

impl HttpManagementApiConfig {
    /// Config pointing at the production endpoint.
    pub fn new(access_token: impl Into<SecretString>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: None,
        }
    }

    /// Point the client at another endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<Box<str>>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Typed management API client.
///
/// Every HTTP response, including errors, comes back as an [`ApiResponse`];
/// only transport failures and cancellation surface as `Err`.
#[derive(Debug, Clone)]
pub struct HttpManagementApi {
    client: reqwest::Client,
    base_url: Box<str>,
}

impl HttpManagementApi {
    /// Build a client from config.
    pub fn new(config: &HttpManagementApiConfig) -> Result<Self> {
        if config.access_token.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "access token must be non-empty",
            ));
        }
        let base_url = config
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_owned()
            .into_boxed_str();
        let user_agent = config.user_agent.as_deref().map_or_else(
            || format!("supaconf/{}", env!("CARGO_PKG_VERSION")),
            ToOwned::to_owned,
        );
        let client = http::build_client(
            NAMESPACE,
            Some(&config.access_token),
            &user_agent,
            Duration::from_millis(config.timeout_ms),
        )?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn project_url(&self, project_ref: &str, suffix: &str) -> String {
        self.url(&format!("/v1/projects/{project_ref}{suffix}"))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>> {
        let raw = http::send(ctx, NAMESPACE, operation, request).await?;
        Ok(decode_response(operation, raw))
    }

    async fn call_empty(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<()>> {
        let raw = http::send(ctx, NAMESPACE, operation, request).await?;
        Ok(empty_response(raw))
    }
}

/// Parse 200/201 bodies into `T`. Undecodable bodies leave the parsed slot empty.
fn decode_response<T: DeserializeOwned>(operation: &'static str, raw: RawResponse) -> ApiResponse<T> {
    let status = raw.status;
    let mut response = ApiResponse::status(status, raw.body);
    if !matches!(status, 200 | 201) {
        return response;
    }
    match serde_json::from_slice::<T>(&response.body) {
        Ok(value) if status == 200 => response.json200 = Some(value),
        Ok(value) => response.json201 = Some(value),
        Err(error) => {
            tracing::warn!(operation, status, %error, "failed to decode management API response");
        },
    }
    response
}

/// Endpoints whose bodies callers never read only need the status.
fn empty_response(raw: RawResponse) -> ApiResponse<()> {
    let mut response = ApiResponse::status(raw.status, raw.body);
    match response.status_code {
        200 => response.json200 = Some(()),
        201 => response.json201 = Some(()),
        _ => {},
    }
    response
}

impl ManagementApiPort for HttpManagementApi {
    fn get_postgrest_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, PostgrestConfigResponse> {
        Box::pin(async move {
            let request = self.client.get(self.project_url(project_ref, "/postgrest"));
            self.call(ctx, "management.get_postgrest_config", request).await
        })
    }

    fn update_postgrest_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdatePostgrestConfigBody,
    ) -> ApiFuture<'a, PostgrestConfigResponse> {
        Box::pin(async move {
            let request = self
                .client
                .patch(self.project_url(project_ref, "/postgrest"))
                .json(body);
            self.call(ctx, "management.update_postgrest_config", request).await
        })
    }

    fn get_postgres_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, PostgresConfigResponse> {
        Box::pin(async move {
            let request = self
                .client
                .get(self.project_url(project_ref, "/config/database/postgres"));
            self.call(ctx, "management.get_postgres_config", request).await
        })
    }

    fn update_postgres_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdatePostgresConfigBody,
    ) -> ApiFuture<'a, PostgresConfigResponse> {
        Box::pin(async move {
            let request = self
                .client
                .put(self.project_url(project_ref, "/config/database/postgres"))
                .json(body);
            self.call(ctx, "management.update_postgres_config", request).await
        })
    }

    fn get_network_restrictions<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, NetworkRestrictionsResponse> {
        Box::pin(async move {
            let request = self
                .client
                .get(self.project_url(project_ref, "/network-restrictions"));
            self.call(ctx, "management.get_network_restrictions", request).await
        })
    }

    fn apply_network_restrictions<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a NetworkRestrictionsRequest,
    ) -> ApiFuture<'a, NetworkRestrictionsResponse> {
        Box::pin(async move {
            let request = self
                .client
                .put(self.project_url(project_ref, "/network-restrictions/apply"))
                .json(body);
            self.call(ctx, "management.apply_network_restrictions", request).await
        })
    }

    fn get_auth_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, AuthConfigResponse> {
        Box::pin(async move {
            let request = self.client.get(self.project_url(project_ref, "/config/auth"));
            self.call(ctx, "management.get_auth_config", request).await
        })
    }

    fn update_auth_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdateAuthConfigBody,
    ) -> ApiFuture<'a, AuthConfigResponse> {
        Box::pin(async move {
            let request = self
                .client
                .patch(self.project_url(project_ref, "/config/auth"))
                .json(body);
            self.call(ctx, "management.update_auth_config", request).await
        })
    }

    fn get_storage_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, StorageConfigResponse> {
        Box::pin(async move {
            let request = self.client.get(self.project_url(project_ref, "/config/storage"));
            self.call(ctx, "management.get_storage_config", request).await
        })
    }

    fn update_storage_config<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a UpdateStorageConfigBody,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .client
                .patch(self.project_url(project_ref, "/config/storage"))
                .json(body);
            self.call_empty(ctx, "management.update_storage_config", request).await
        })
    }

    fn enable_webhooks<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.project_url(project_ref, "/database/webhooks/enable"));
            self.call_empty(ctx, "management.enable_webhooks", request).await
        })
    }

    fn list_buckets<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, Vec<StorageBucketResponse>> {
        Box::pin(async move {
            let request = self.client.get(self.project_url(project_ref, "/storage/buckets"));
            self.call(ctx, "management.list_buckets", request).await
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
            let request = self
                .client
                .patch(self.project_url(project_ref, &format!("/storage/buckets/{bucket_id}")))
                .json(body);
            self.call_empty(ctx, "management.update_bucket", request).await
        })
    }

    fn list_branches<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, Vec<BranchResponse>> {
        Box::pin(async move {
            let request = self.client.get(self.project_url(project_ref, "/branches"));
            self.call(ctx, "management.list_branches", request).await
        })
    }

    fn create_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
        body: &'a CreateBranchBody,
    ) -> ApiFuture<'a, BranchResponse> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.project_url(project_ref, "/branches"))
                .json(body);
            self.call(ctx, "management.create_branch", request).await
        })
    }

    fn get_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        branch_id: &'a str,
    ) -> ApiFuture<'a, BranchResponse> {
        Box::pin(async move {
            let request = self.client.get(self.url(&format!("/v1/branches/{branch_id}")));
            self.call(ctx, "management.get_branch", request).await
        })
    }

    fn update_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        branch_id: &'a str,
        body: &'a UpdateBranchBody,
    ) -> ApiFuture<'a, BranchResponse> {
        Box::pin(async move {
            let request = self
                .client
                .patch(self.url(&format!("/v1/branches/{branch_id}")))
                .json(body);
            self.call(ctx, "management.update_branch", request).await
        })
    }

    fn delete_branch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        branch_id: &'a str,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let request = self.client.delete(self.url(&format!("/v1/branches/{branch_id}")));
            self.call_empty(ctx, "management.delete_branch", request).await
        })
    }

    fn list_projects<'a>(&'a self, ctx: &'a RequestContext) -> ApiFuture<'a, Vec<ProjectResponse>> {
        Box::pin(async move {
            let request = self.client.get(self.url("/v1/projects"));
            self.call(ctx, "management.list_projects", request).await
        })
    }

    fn create_project<'a>(
        &'a self,
        ctx: &'a RequestContext,
        body: &'a CreateProjectBody,
    ) -> ApiFuture<'a, ProjectResponse> {
        Box::pin(async move {
            let request = self.client.post(self.url("/v1/projects")).json(body);
            self.call(ctx, "management.create_project", request).await
        })
    }

    fn get_project<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, ProjectResponse> {
        Box::pin(async move {
            let request = self.client.get(self.project_url(project_ref, ""));
            self.call(ctx, "management.get_project", request).await
        })
    }

    fn delete_project<'a>(
        &'a self,
        ctx: &'a RequestContext,
        project_ref: &'a str,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let request = self.client.delete(self.project_url(project_ref, ""));
            self.call_empty(ctx, "management.delete_project", request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn raw(status: u16, body: &'static str) -> RawResponse {
        RawResponse {
            status,
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn decodes_only_success_bodies() {
        let ok: ApiResponse<PostgrestConfigResponse> =
            decode_response("test", raw(200, r#"{"db_schema":"public","max_rows":5}"#));
        assert_eq!(ok.json200.map(|body| body.max_rows), Some(5));

        let failed: ApiResponse<PostgrestConfigResponse> =
            decode_response("test", raw(500, r#"{"db_schema":"public"}"#));
        assert!(failed.parsed().is_none());
        assert_eq!(failed.body.as_ref(), br#"{"db_schema":"public"}"#);
    }

    #[test]
    fn undecodable_success_keeps_raw_body() {
        let response: ApiResponse<PostgrestConfigResponse> =
            decode_response("test", raw(200, "<html>"));
        assert!(response.is_success());
        assert!(response.parsed().is_none());
    }

    #[test]
    fn empty_endpoints_accept_blank_bodies() {
        assert_eq!(empty_response(raw(201, "")).json201, Some(()));
        assert!(empty_response(raw(404, "")).parsed().is_none());
    }

    #[test]
    fn empty_token_is_rejected() {
        let error = HttpManagementApi::new(&HttpManagementApiConfig::new("")).unwrap_err();
        assert_eq!(error.code, ErrorCode::invalid_input());
    }

    #[test]
    fn base_url_drops_trailing_slash() -> Result<()> {
        let api = HttpManagementApi::new(
            &HttpManagementApiConfig::new("token").with_base_url("http://localhost:9/"),
        )?;
        assert_eq!(
            api.project_url("abc", "/postgrest"),
            "http://localhost:9/v1/projects/abc/postgrest"
        );
        Ok(())
    }
}
