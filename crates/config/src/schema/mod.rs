//! The typed project configuration tree.
//!
//! Every section derives `Default` and decodes with `#[serde(default)]`; the
//! real defaults live in the embedded `config.toml` template so that one
//! document describes them. Enum-like strings use local enums that the remote
//! mapper translates to transport constants.

mod api;
mod auth;
mod db;
mod functions;
mod services;
mod storage;

pub use api::{ApiConfig, TlsConfig};
pub use auth::{
    Auth0Auth, AuthConfig, Captcha, CaptchaProvider, ClerkAuth, CognitoAuth, EMAIL_TEMPLATES,
    EXTERNAL_PROVIDERS, EmailConfig, EmailTemplate, ExternalProvider, FactorToggle, FirebaseAuth,
    HookConfig, HookEntry, MessagebirdConfig, MfaConfig, PasswordRequirements, PhoneFactor,
    RateLimit, SECRETLESS_PROVIDERS, SessionsConfig, SmsConfig, SmsProviderKind, SmtpConfig,
    SolanaConfig, TextlocalConfig, ThirdPartyConfig, ThirdPartyIssuer, TwilioConfig, VonageConfig,
    Web3Config, WorkosAuth,
};
pub use db::{
    DbConfig, DbSettings, MigrationsConfig, NetworkRestrictions, PoolMode, PoolerConfig,
    SUPPORTED_MAJOR_VERSIONS, SeedConfig, SessionReplicationRole,
};
pub use functions::FunctionConfig;
pub use services::{
    AddressFamily, AnalyticsConfig, EdgeRuntimeConfig, ExperimentalConfig, InbucketConfig,
    LogflareBackend, RealtimeConfig, RequestPolicy, StudioConfig, WebhooksConfig,
};
pub use storage::{BucketConfig, ImageTransformation, StorageConfig};

use crate::error::ConfigError;
use crate::secret::Secret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A loaded project configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project identifier; sanitized on load.
    pub project_id: String,
    /// Host the local stack is reachable on.
    pub hostname: String,
    /// `[api]`.
    pub api: ApiConfig,
    /// `[db]`.
    pub db: DbConfig,
    /// `[realtime]`.
    pub realtime: RealtimeConfig,
    /// `[studio]`.
    pub studio: StudioConfig,
    /// `[inbucket]`.
    pub inbucket: InbucketConfig,
    /// `[storage]`.
    pub storage: StorageConfig,
    /// `[auth]`.
    pub auth: AuthConfig,
    /// `[edge_runtime]`.
    pub edge_runtime: EdgeRuntimeConfig,
    /// Edge functions keyed by slug.
    pub functions: BTreeMap<String, FunctionConfig>,
    /// `[analytics]`.
    pub analytics: AnalyticsConfig,
    /// `[experimental]`.
    pub experimental: ExperimentalConfig,
    /// Per-environment override documents keyed by remote name, kept as written.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub remotes: BTreeMap<String, toml::Table>,
}

impl Config {
    /// Every secret in the tree with its dotted path.
    pub fn secrets_mut(&mut self) -> Vec<(String, &mut Secret)> {
        let mut secrets = prefixed("db", self.db.secrets_mut());
        secrets.push(("studio.openai_api_key".to_string(), &mut self.studio.openai_api_key));
        secrets.extend(prefixed("auth", self.auth.secrets_mut()));
        secrets.extend(prefixed("edge_runtime", self.edge_runtime.secrets_mut()));
        secrets
    }

    /// Render the full tree as TOML; secrets appear as `hash:<hex>`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|error| ConfigError::UnparsableConfig {
            source_name: "config".to_string(),
            reason: error.to_string(),
        })
    }
}

fn prefixed<'a>(section: &str, secrets: Vec<(String, &'a mut Secret)>) -> Vec<(String, &'a mut Secret)> {
    secrets
        .into_iter()
        .map(|(path, secret)| (format!("{section}.{path}"), secret))
        .collect()
}
