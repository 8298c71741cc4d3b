//! API key minting.
//!
//! Keys are compact JWTs signed either with the JWT secret (HS256) or with the
//! first key from `auth.signing_keys_path` (RS256 or ES256). The header and
//! claims are serialized in a fixed field order so the default anon key
//! matches the published demo key byte for byte.

use crate::error::ConfigError;
use crate::schema::AuthConfig;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::EncodePrivateKey;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::{BigUint, RsaPrivateKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use supaconf_ports::{FileSystemPort, FileSystemPortExt};
use supaconf_shared::{REDACTED, Result};

/// Issuer of locally minted keys.
pub const DEMO_ISSUER: &str = "supabase-demo";

/// Expiry of locally minted keys (the published demo key's `exp`).
pub const DEMO_EXPIRY: i64 = 1_983_812_996;

/// Shortest JWT secret accepted for HS256 signing.
pub const MIN_JWT_SECRET_LEN: usize = 16;

/// Role of the publishable key.
pub const ANON_ROLE: &str = "anon";

/// Role of the service key.
pub const SERVICE_ROLE: &str = "service_role";

/// A JSON Web Key with private components.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Jwk {
    /// `RSA` or `EC`.
    pub kty: String,
    /// Key id, copied into the JWT header.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kid: String,
    /// Intended use, usually `sig`.
    #[serde(rename = "use", skip_serializing_if = "String::is_empty")]
    pub key_use: String,
    /// Permitted operations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_ops: Vec<String>,
    /// `RS256` or `ES256`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alg: String,
    /// WebCrypto extractable flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
    /// RSA modulus.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub n: String,
    /// RSA public exponent.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub e: String,
    /// Private exponent (RSA) or scalar (EC).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub d: String,
    /// First RSA prime.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub p: String,
    /// Second RSA prime.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub q: String,
    /// RSA CRT exponent for `p`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dp: String,
    /// RSA CRT exponent for `q`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dq: String,
    /// RSA CRT coefficient.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub qi: String,
    /// Curve name; only `P-256` is supported.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub crv: String,
    /// EC x coordinate.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub x: String,
    /// EC y coordinate.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub y: String,
}

impl fmt::Debug for Jwk {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("kid", &self.kid)
            .field("alg", &self.alg)
            .field("crv", &self.crv)
            .field("private", &REDACTED)
            .finish_non_exhaustive()
    }
}

impl Jwk {
    /// Generate a fresh P-256 signing key.
    pub fn generate_es256() -> Self {
        let secret = p256::SecretKey::random(&mut rand::rngs::OsRng);
        let point = secret.public_key().to_encoded_point(false);
        let encode = |bytes: Option<&[u8]>| bytes.map(|bytes| URL_SAFE_NO_PAD.encode(bytes)).unwrap_or_default();
        Self {
            kty: "EC".to_string(),
            kid: uuid::Uuid::new_v4().to_string(),
            key_use: "sig".to_string(),
            key_ops: vec!["sign".to_string(), "verify".to_string()],
            alg: "ES256".to_string(),
            ext: Some(true),
            crv: "P-256".to_string(),
            x: encode(point.x().map(|x| x.as_slice())),
            y: encode(point.y().map(|y| y.as_slice())),
            d: URL_SAFE_NO_PAD.encode(secret.to_bytes()),
            ..Self::default()
        }
    }

    /// The key with private components removed, as published in a JWKS.
    #[must_use]
    pub fn to_public(&self) -> Self {
        Self {
            kty: self.kty.clone(),
            kid: self.kid.clone(),
            key_use: self.key_use.clone(),
            key_ops: vec!["verify".to_string()],
            alg: self.alg.clone(),
            ext: self.ext,
            n: self.n.clone(),
            e: self.e.clone(),
            crv: self.crv.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
            ..Self::default()
        }
    }

    fn encoding_key(&self) -> std::result::Result<(Algorithm, EncodingKey), ConfigError> {
        match (self.kty.as_str(), self.alg.as_str()) {
            ("RSA", "RS256") => {
                let component = |name: &str, value: &str| {
                    decode_component(name, value).map(|bytes| BigUint::from_bytes_be(&bytes))
                };
                let key = RsaPrivateKey::from_components(
                    component("n", &self.n)?,
                    component("e", &self.e)?,
                    component("d", &self.d)?,
                    vec![component("p", &self.p)?, component("q", &self.q)?],
                )
                .map_err(|error| signer_failure(format!("invalid RSA key: {error}")))?;
                let der = key
                    .to_pkcs1_der()
                    .map_err(|error| signer_failure(format!("failed to encode RSA key: {error}")))?;
                Ok((Algorithm::RS256, EncodingKey::from_rsa_der(der.as_bytes())))
            },
            ("EC", "ES256") => {
                if self.crv != "P-256" {
                    return Err(signer_failure(format!("unsupported curve: {}", self.crv)));
                }
                let scalar = decode_component("d", &self.d)?;
                let secret = p256::SecretKey::from_slice(&scalar)
                    .map_err(|error| signer_failure(format!("invalid EC key: {error}")))?;
                let der = secret
                    .to_pkcs8_der()
                    .map_err(|error| signer_failure(format!("failed to encode EC key: {error}")))?;
                Ok((Algorithm::ES256, EncodingKey::from_ec_der(der.as_bytes())))
            },
            (kty, alg) => Err(signer_failure(format!("unsupported signing key: kty={kty} alg={alg}"))),
        }
    }
}

fn decode_component(name: &str, value: &str) -> std::result::Result<Vec<u8>, ConfigError> {
    URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|_| signer_failure(format!("JWK component {name} is not base64url")))
}

fn check_jwt_secret(secret: &str) -> std::result::Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LEN {
        return Err(signer_failure(format!(
            "auth.jwt_secret must be at least {MIN_JWT_SECRET_LEN} characters"
        )));
    }
    Ok(())
}

fn signer_failure(reason: impl Into<String>) -> ConfigError {
    ConfigError::SignerFailure {
        reason: reason.into(),
    }
}

#[derive(Serialize)]
struct Header<'a> {
    alg: &'a str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

/// Claims of a minted API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiKeyClaims {
    /// Issuer.
    pub iss: String,
    /// Project the key is scoped to.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub project_ref: Option<String>,
    /// Postgres role the key assumes.
    pub role: String,
    /// Set for anonymous sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_anonymous: Option<bool>,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl ApiKeyClaims {
    /// Demo claims for `role`.
    pub fn demo(role: &str) -> Self {
        Self {
            iss: DEMO_ISSUER.to_string(),
            project_ref: None,
            role: role.to_string(),
            is_anonymous: None,
            exp: DEMO_EXPIRY,
        }
    }
}

/// Signing material for API keys.
pub enum ApiKeySigner<'a> {
    /// HS256 with the JWT secret.
    Symmetric(&'a str),
    /// The algorithm declared by the key.
    Asymmetric(&'a Jwk),
}

impl ApiKeySigner<'_> {
    /// Sign `claims` into a compact JWT.
    pub fn sign(&self, claims: &ApiKeyClaims) -> std::result::Result<String, ConfigError> {
        let (algorithm, key, kid) = match self {
            Self::Symmetric(secret) => {
                check_jwt_secret(secret)?;
                (Algorithm::HS256, EncodingKey::from_secret(secret.as_bytes()), None)
            },
            Self::Asymmetric(jwk) => {
                let (algorithm, key) = jwk.encoding_key()?;
                let kid = Some(jwk.kid.as_str()).filter(|kid| !kid.is_empty());
                (algorithm, key, kid)
            },
        };
        let alg = match algorithm {
            Algorithm::RS256 => "RS256",
            Algorithm::ES256 => "ES256",
            _ => "HS256",
        };
        let header = Header { alg, typ: "JWT", kid };
        let header = serde_json::to_vec(&header)
            .map_err(|error| signer_failure(format!("failed to encode header: {error}")))?;
        let payload = serde_json::to_vec(claims)
            .map_err(|error| signer_failure(format!("failed to encode claims: {error}")))?;
        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = jsonwebtoken::crypto::sign(message.as_bytes(), &key, algorithm)
            .map_err(|error| signer_failure(error.to_string()))?;
        Ok(format!("{message}.{signature}"))
    }
}

/// Load signing keys and mint any empty API key.
///
/// A known, non-empty JWT secret shorter than 16 characters fails even when
/// both keys are given or an asymmetric key signs.
/// A configured `signing_keys_path` is read relative to `supabase_dir`; its
/// first key signs. Without a path, a P-256 key is generated into
/// `auth.signing_keys` and the JWT secret signs with HS256.
pub fn generate_api_keys(
    auth: &mut AuthConfig,
    fs: &dyn FileSystemPort,
    supabase_dir: &Path,
    installation_key: &[u8],
) -> Result<()> {
    if let Some(secret) = auth.jwt_secret.value().filter(|secret| !secret.is_empty()) {
        check_jwt_secret(secret)?;
    }
    if auth.signing_keys_path.is_empty() {
        if auth.signing_keys.is_empty() {
            auth.signing_keys = vec![Jwk::generate_es256()];
        }
    } else {
        let path = supabase_dir.join(&auth.signing_keys_path);
        if fs.exists(&path)? {
            let bytes = fs.read_file(&path)?;
            auth.signing_keys =
                serde_json::from_slice(&bytes).map_err(|error| ConfigError::UnparsableConfig {
                    source_name: path.display().to_string(),
                    reason: error.to_string(),
                })?;
        } else {
            tracing::warn!(
                path = %path.display(),
                "signing keys file not found; falling back to HS256"
            );
        }
    }

    if !auth.anon_key.is_empty() && !auth.service_role_key.is_empty() {
        return Ok(());
    }
    let signer = match auth.signing_keys.first() {
        Some(jwk) if !auth.signing_keys_path.is_empty() => ApiKeySigner::Asymmetric(jwk),
        _ => ApiKeySigner::Symmetric(auth.jwt_secret.value().ok_or_else(|| {
            signer_failure("auth.jwt_secret is only known by its hash")
        })?),
    };
    let anon_key = if auth.anon_key.is_empty() {
        Some(signer.sign(&ApiKeyClaims::demo(ANON_ROLE))?)
    } else {
        None
    };
    let service_role_key = if auth.service_role_key.is_empty() {
        Some(signer.sign(&ApiKeyClaims::demo(SERVICE_ROLE))?)
    } else {
        None
    };
    for (slot, minted) in [
        (&mut auth.anon_key, anon_key),
        (&mut auth.service_role_key, service_role_key),
    ] {
        if let Some(token) = minted {
            *slot = crate::secret::Secret::plain(token);
            slot.seal(installation_key);
        }
    }
    Ok(())
}
