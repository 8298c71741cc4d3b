//! Remote failures built from fake responses keep their status and stay redacted.

use supaconf_ports::ManagementApiPort;
use supaconf_shared::{
    ErrorCode, RequestContext, Result, redact_json_body, remote_read_failed,
};
use supaconf_testkit::{FakeManagementApi, FakeProjectState};

#[tokio::test]
async fn failed_read_becomes_remote_error() -> Result<()> {
    let ctx = RequestContext::new_run();
    let api = FakeManagementApi::new();
    api.insert_project("ref", FakeProjectState::default()).await;
    api.fail_with(
        "get_auth_config",
        401,
        r#"{"message":"bad token","access_token":"sbp_0123456789"}"#,
    )
    .await;

    let response = api.get_auth_config(&ctx, "ref").await?;
    let error = remote_read_failed(
        "auth",
        Some(response.status_code),
        &redact_json_body(&response.body),
    );
    assert_eq!(error.code, ErrorCode::remote_read_failed());
    assert_eq!(error.status_code(), Some(401));
    assert!(!error.message.contains("sbp_0123456789"));
    assert!(error.message.contains("bad token"));
    Ok(())
}

#[tokio::test]
async fn cancellation_stops_fake_calls() {
    let ctx = RequestContext::new_run();
    ctx.cancel();
    let api = FakeManagementApi::new();
    let error = api.get_postgres_config(&ctx, "ref").await.unwrap_err();
    assert!(error.is_cancelled());
    assert!(api.calls().await.is_empty());
}
