//! HTTP management adapter against a mock control plane.

use serde_json::json;
use supaconf_adapters::{HttpManagementApi, HttpManagementApiConfig};
use supaconf_api::v1::{UpdatePostgrestConfigBody, UpdateStorageBucketBody};
use supaconf_ports::ManagementApiPort;
use supaconf_shared::{RequestContext, Result};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "abcdefghijklmnopqrst";

fn client(server: &MockServer) -> Result<HttpManagementApi> {
    HttpManagementApi::new(
        &HttpManagementApiConfig::new("sbp_example").with_base_url(server.uri()), // pragma: allowlist secret
    )
}

#[tokio::test]
async fn get_postgrest_config_sends_bearer_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT}/postgrest")))
        .and(header("authorization", "Bearer sbp_example"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "db_schema": "public,graphql_public",
            "db_extra_search_path": "public,extensions",
            "max_rows": 1000,
            "db_pool": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server)?;
    let response = api
        .get_postgrest_config(&RequestContext::new_run(), PROJECT)
        .await?;
    assert_eq!(response.status_code, 200);
    let parsed = response.into_parsed();
    assert_eq!(parsed.as_ref().map(|body| body.max_rows), Some(1000));
    assert_eq!(
        parsed.map(|body| body.db_schema),
        Some("public,graphql_public".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn update_postgrest_config_patches_only_set_fields() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/projects/{PROJECT}/postgrest")))
        .and(body_json(json!({ "max_rows": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "db_schema": "public",
            "db_extra_search_path": "",
            "max_rows": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = UpdatePostgrestConfigBody {
        max_rows: Some(10),
        ..UpdatePostgrestConfigBody::default()
    };
    let response = client(&server)?
        .update_postgrest_config(&RequestContext::new_run(), PROJECT, &body)
        .await?;
    assert!(response.is_success());
    Ok(())
}

#[tokio::test]
async fn error_statuses_are_returned_not_raised() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT}/config/auth")))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "message": "maintenance" })),
        )
        .mount(&server)
        .await;

    let response = client(&server)?
        .get_auth_config(&RequestContext::new_run(), PROJECT)
        .await?;
    assert_eq!(response.status_code, 503);
    assert!(response.parsed().is_none());
    assert!(String::from_utf8_lossy(&response.body).contains("maintenance"));
    Ok(())
}

#[tokio::test]
async fn bucket_patch_and_webhook_enable_report_status_only() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/projects/{PROJECT}/storage/buckets/images")))
        .and(body_json(json!({ "public": true })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/projects/{PROJECT}/database/webhooks/enable")))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server)?;
    let ctx = RequestContext::new_run();
    let body = UpdateStorageBucketBody {
        public: Some(true),
        ..UpdateStorageBucketBody::default()
    };
    let patched = api.update_bucket(&ctx, PROJECT, "images", &body).await?;
    assert_eq!(patched.parsed(), Some(&()));
    let enabled = api.enable_webhooks(&ctx, PROJECT).await?;
    assert_eq!(enabled.json201, Some(()));
    Ok(())
}

#[tokio::test]
async fn list_buckets_decodes_array() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT}/storage/buckets")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "images", "name": "images", "public": false, "file_size_limit": 1024 },
            { "id": "docs", "name": "docs" }
        ])))
        .mount(&server)
        .await;

    let buckets = client(&server)?
        .list_buckets(&RequestContext::new_run(), PROJECT)
        .await?
        .into_parsed()
        .unwrap_or_default();
    let names: Vec<_> = buckets.iter().map(|bucket| bucket.name.as_str()).collect();
    assert_eq!(names, ["images", "docs"]);
    assert_eq!(buckets.first().and_then(|bucket| bucket.file_size_limit), Some(1024));
    Ok(())
}

#[tokio::test]
async fn cancelled_context_skips_the_request() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = RequestContext::new_run();
    ctx.cancel();
    let error = client(&server)?.list_projects(&ctx).await.unwrap_err();
    assert!(error.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_is_retriable_io() -> Result<()> {
    let api = HttpManagementApi::new(
        &HttpManagementApiConfig::new("sbp_example").with_base_url("http://127.0.0.1:1"), // pragma: allowlist secret
    )?;
    let error = api
        .get_project(&RequestContext::new_run(), PROJECT)
        .await
        .unwrap_err();
    assert!(error.class.is_retriable());
    Ok(())
}
