//! Third-party JWKS resolution against a mock issuer.

use serde_json::json;
use std::time::Duration;
use supaconf_adapters::JwksResolver;
use supaconf_config::schema::ThirdPartyIssuer;
use supaconf_shared::{ErrorCode, RequestContext, Result};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn jwks_body() -> serde_json::Value {
    json!({
        "keys": [{
            "kty": "EC",
            "kid": "key-1",
            "use": "sig",
            "alg": "ES256",
            "crv": "P-256",
            "x": "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU",
            "y": "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0"
        }]
    })
}

#[tokio::test]
async fn resolves_well_known_key_set() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = JwksResolver::new()?;
    let keys = resolver
        .resolve_issuer(&RequestContext::new_run(), &format!("{}/", server.uri()))
        .await?;
    assert_eq!(keys.keys.len(), 1);
    assert_eq!(keys.keys.first().map(|key| key.kid.as_str()), Some("key-1"));
    Ok(())
}

#[tokio::test]
async fn provider_errors_carry_provider_name() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let issuer = ThirdPartyIssuer {
        provider: "clerk",
        issuer_url: server.uri(),
        jwks_url: format!("{}/.well-known/jwks.json", server.uri()),
    };
    let error = JwksResolver::new()?
        .resolve(&RequestContext::new_run(), &issuer)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::new("jwks", "fetch_failed"));
    assert_eq!(error.metadata.get("provider").map(String::as_str), Some("clerk"));
    assert_eq!(error.metadata.get("status").map(String::as_str), Some("404"));
    Ok(())
}

#[tokio::test]
async fn cancelled_context_skips_the_request() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = RequestContext::new_run();
    ctx.cancellation_token().cancel();
    let error = JwksResolver::new()?
        .resolve_issuer(&ctx, &server.uri())
        .await
        .unwrap_err();
    assert!(error.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn slow_issuer_hits_the_budget() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(jwks_body())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let error = JwksResolver::with_budget(Duration::from_millis(50))?
        .resolve_issuer(&RequestContext::new_run(), &server.uri())
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::timeout());
    assert!(error.class.is_retriable());
    assert_eq!(
        error.metadata.get("url").map(String::as_str),
        Some(format!("{}/.well-known/jwks.json", server.uri()).as_str())
    );
    Ok(())
}
