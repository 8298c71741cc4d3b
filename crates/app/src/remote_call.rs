//! Status handling shared by every section read and write.

use supaconf_ports::ApiFuture;
use supaconf_shared::{Result, redact_json_body, remote_read_failed, remote_write_failed};

/// Await a GET and return its parsed body.
///
/// Non-2xx statuses and 2xx responses without a parsed body both fail with
/// `remote:read_failed`, carrying the status and the redacted body.
pub(crate) async fn read_section<T>(section: &str, request: ApiFuture<'_, T>) -> Result<T> {
    let response = request.await?;
    let status = response.status_code;
    if !response.is_success() {
        return Err(remote_read_failed(
            section,
            Some(status),
            &redact_json_body(&response.body),
        ));
    }
    let body = response.body.clone();
    response.into_parsed().ok_or_else(|| {
        let detail = if body.is_empty() {
            "empty response body".to_string()
        } else {
            redact_json_body(&body)
        };
        remote_read_failed(section, Some(status), &detail)
    })
}

/// Await a mutating request; any non-2xx fails with `remote:write_failed`.
pub(crate) async fn write_section<T>(section: &str, request: ApiFuture<'_, T>) -> Result<()> {
    let response = request.await?;
    if response.is_success() {
        return Ok(());
    }
    Err(remote_write_failed(
        section,
        Some(response.status_code),
        &redact_json_body(&response.body),
    ))
}
