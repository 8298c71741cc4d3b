//! Third-party auth key set resolution.

use crate::http;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use supaconf_config::Jwk;
use supaconf_config::schema::ThirdPartyIssuer;
use supaconf_shared::{
    ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result, ResultExt, redact_json_body,
};

const NAMESPACE: &str = "jwks";
/// Budget for one key set fetch, connect to last body byte.
pub const JWKS_TIMEOUT: Duration = Duration::from_secs(10);

/// A published JSON Web Key Set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    /// Public keys.
    #[serde(default)]
    pub keys: Vec<Jwk>,
}

/// Fetches key sets of third-party issuers.
#[derive(Debug, Clone)]
pub struct JwksResolver {
    client: reqwest::Client,
    budget: Duration,
}

impl JwksResolver {
    /// Resolver with the default 10 second budget.
    pub fn new() -> Result<Self> {
        Self::with_budget(JWKS_TIMEOUT)
    }

    /// Resolver with a custom per-resolution budget.
    pub fn with_budget(budget: Duration) -> Result<Self> {
        let user_agent = format!("supaconf/{}", env!("CARGO_PKG_VERSION"));
        let client = http::build_client(NAMESPACE, None, &user_agent, budget)?;
        Ok(Self { client, budget })
    }

    /// Fetch `<issuer>/.well-known/jwks.json`.
    pub async fn resolve_issuer(&self, ctx: &RequestContext, issuer_url: &str) -> Result<JwkSet> {
        let url = format!("{}/.well-known/jwks.json", issuer_url.trim_end_matches('/'));
        self.fetch(ctx, &url).await
    }

    /// Fetch the key set an enabled third-party provider publishes.
    pub async fn resolve(&self, ctx: &RequestContext, issuer: &ThirdPartyIssuer) -> Result<JwkSet> {
        tracing::debug!(provider = issuer.provider, url = %issuer.jwks_url, "resolving third-party JWKS");
        self.fetch(ctx, &issuer.jwks_url)
            .await
            .map(|keys| {
                tracing::debug!(provider = issuer.provider, keys = keys.keys.len(), "resolved JWKS");
                keys
            })
            .with_metadata("provider", issuer.provider)
    }

    async fn fetch(&self, ctx: &RequestContext, url: &str) -> Result<JwkSet> {
        let operation = "jwks.fetch";
        let request = self.client.get(url);
        let sent =
            tokio::time::timeout(self.budget, http::send(ctx, NAMESPACE, operation, request)).await;
        let raw = match sent {
            Ok(result) => result,
            Err(_) => Err(budget_exceeded(self.budget)),
        }
        .with_metadata("url", url.to_string())?;
        if !(200..300).contains(&raw.status) {
            return Err(ErrorEnvelope::unexpected(
                ErrorCode::new(NAMESPACE, "fetch_failed"),
                format!(
                    "failed to fetch JWKS: {} {}",
                    raw.status,
                    redact_json_body(&raw.body)
                ),
                ErrorClass::NonRetriable,
            )
            .with_metadata("url", url.to_string())
            .with_metadata("status", raw.status.to_string()));
        }
        serde_json::from_slice(&raw.body).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new(NAMESPACE, "invalid_response"),
                format!("failed to decode JWKS: {error}"),
                ErrorClass::NonRetriable,
            )
            .with_metadata("url", url.to_string())
        })
    }
}

fn budget_exceeded(budget: Duration) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::timeout(),
        format!("JWKS fetch exceeded {}ms", budget.as_millis()),
        ErrorClass::Retriable,
    )
    .with_metadata("budget_ms", budget.as_millis().to_string())
}
