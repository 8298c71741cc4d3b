//! reqwest plumbing shared by the HTTP adapters.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use supaconf_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result, SecretString};

/// A fully buffered HTTP response.
pub struct RawResponse {
    pub status: u16,
    pub body: bytes::Bytes,
}

pub fn build_client(
    namespace: &'static str,
    bearer: Option<&SecretString>,
    user_agent: &str,
    timeout: Duration,
) -> Result<reqwest::Client> {
    if timeout.is_zero() {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "timeout must be greater than zero",
        ));
    }

    let mut headers = HeaderMap::new();
    if let Some(token) = bearer {
        let mut auth_header = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|_| {
                ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "access token contains invalid header characters",
                )
            })?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);
    }
    let agent = HeaderValue::from_str(user_agent).map_err(|_| {
        ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "user agent contains invalid header characters",
        )
    })?;
    headers.insert(USER_AGENT, agent);

    reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new(namespace, "client_init_failed"),
                format!("failed to build HTTP client: {error}"),
                ErrorClass::NonRetriable,
            )
        })
}

/// Send `request` and buffer the body, aborting as soon as `ctx` is cancelled.
pub async fn send(
    ctx: &RequestContext,
    namespace: &'static str,
    operation: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<RawResponse> {
    ctx.ensure_not_cancelled(operation)?;

    let response = tokio::select! {
        () = ctx.cancelled() => return Err(cancelled_error(operation)),
        result = request.send() => result.map_err(|error| map_reqwest_error(namespace, &error))?,
    };

    let status = response.status().as_u16();
    let body = tokio::select! {
        () = ctx.cancelled() => return Err(cancelled_error(operation)),
        result = response.bytes() => result.map_err(|error| map_reqwest_error(namespace, &error))?,
    };
    tracing::debug!(operation, status, bytes = body.len(), "http response");
    Ok(RawResponse { status, body })
}

pub fn cancelled_error(operation: &'static str) -> ErrorEnvelope {
    ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", operation)
}

pub fn map_reqwest_error(namespace: &'static str, error: &reqwest::Error) -> ErrorEnvelope {
    if error.is_timeout() {
        return ErrorEnvelope::unexpected(
            ErrorCode::timeout(),
            "request timed out",
            ErrorClass::Retriable,
        );
    }
    if error.is_connect() {
        return ErrorEnvelope::unexpected(
            ErrorCode::io(),
            format!("connection failed: {error}"),
            ErrorClass::Retriable,
        );
    }
    ErrorEnvelope::unexpected(
        ErrorCode::new(namespace, "request_failed"),
        format!("request failed: {error}"),
        ErrorClass::NonRetriable,
    )
}
