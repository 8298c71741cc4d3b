//! Cross-field validation of a decoded config.
//!
//! Checks run in a fixed order and the first failure is returned. Messages
//! carry dotted paths only, never values.

use crate::error::ConfigError;
use crate::patterns::{
    BUCKET_NAME_PATTERN, FUNCTION_SLUG_PATTERN, PROJECT_ID_PATTERN, PROJECT_REF_PATTERN,
    is_valid_bucket_name, is_valid_function_slug, is_valid_project_ref, sanitize_project_id,
};
use crate::schema::{
    AddressFamily, AnalyticsConfig, AuthConfig, CaptchaProvider, Config, EMAIL_TEMPLATES,
    EXTERNAL_PROVIDERS, HookEntry, LogflareBackend, PasswordRequirements, PoolMode,
    RequestPolicy, SECRETLESS_PROVIDERS, SUPPORTED_MAJOR_VERSIONS, SessionReplicationRole,
    SmsConfig, SmsProviderKind, ThirdPartyConfig,
};
use crate::secret::Secret;
use std::collections::BTreeMap;
use url::Url;

type Checked = Result<(), ConfigError>;

const ENUM_FIELDS: [(&str, &[&str]); 7] = [
    ("db.pooler.pool_mode", &PoolMode::ALLOWED),
    ("db.settings.session_replication_role", &SessionReplicationRole::ALLOWED),
    ("realtime.ip_version", &AddressFamily::ALLOWED),
    ("edge_runtime.policy", &RequestPolicy::ALLOWED),
    ("analytics.backend", &LogflareBackend::ALLOWED),
    ("auth.password_requirements", &PasswordRequirements::ALLOWED),
    ("auth.captcha.provider", &CaptchaProvider::ALLOWED),
];

/// Check enum-valued fields on the composed document, before decoding, so
/// errors can name the path and the allowed set.
pub fn check_enum_fields(document: &toml::Value) -> Checked {
    for (path, allowed) in ENUM_FIELDS {
        let Some(value) = lookup(document, path) else {
            continue;
        };
        if !value.as_str().is_some_and(|text| allowed.contains(&text)) {
            return Err(ConfigError::invalid_enum(path, allowed));
        }
    }
    Ok(())
}

fn lookup<'a>(document: &'a toml::Value, path: &str) -> Option<&'a toml::Value> {
    path.split('.').try_fold(document, |value, key| value.get(key))
}

/// Validate a decoded config.
///
/// `unresolved` maps dotted paths to `env(...)` names that were unset at load
/// time, so a missing required secret can name the variable.
pub fn validate_config(config: &Config, unresolved: &BTreeMap<String, String>) -> Checked {
    validate_project_id(config)?;
    validate_remotes(config)?;
    if !SUPPORTED_MAJOR_VERSIONS.contains(&config.db.major_version) {
        return Err(ConfigError::invalid_enum(
            "db.major_version",
            &["13", "14", "15", "17"],
        ));
    }
    for name in config.storage.buckets.keys() {
        if !is_valid_bucket_name(name) {
            return Err(ConfigError::InvalidPattern {
                path: format!("storage.buckets.{name}"),
                pattern: BUCKET_NAME_PATTERN.to_string(),
            });
        }
    }
    for slug in config.functions.keys() {
        if !is_valid_function_slug(slug) {
            return Err(ConfigError::InvalidPattern {
                path: format!("functions.{slug}"),
                pattern: FUNCTION_SLUG_PATTERN.to_string(),
            });
        }
    }
    validate_auth(&config.auth, unresolved)?;
    validate_analytics(&config.analytics)
}

fn validate_project_id(config: &Config) -> Checked {
    if config.project_id.is_empty() {
        return Err(ConfigError::missing("project_id"));
    }
    if sanitize_project_id(&config.project_id) != config.project_id {
        return Err(ConfigError::InvalidPattern {
            path: "project_id".to_string(),
            pattern: PROJECT_ID_PATTERN.to_string(),
        });
    }
    Ok(())
}

fn validate_remotes(config: &Config) -> Checked {
    for (name, remote) in &config.remotes {
        let path = format!("remotes.{name}.project_id");
        let project_id = remote
            .get("project_id")
            .and_then(toml::Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConfigError::missing(path.clone()))?;
        if !is_valid_project_ref(project_id) {
            return Err(ConfigError::InvalidPattern {
                path,
                pattern: PROJECT_REF_PATTERN.to_string(),
            });
        }
    }
    Ok(())
}

/// Fail when a required secret is empty, naming the unset variable if there is one.
pub fn require_secret(path: &str, secret: &Secret, unresolved: &BTreeMap<String, String>) -> Checked {
    if !secret.is_empty() {
        return Ok(());
    }
    match unresolved.get(path) {
        Some(name) => Err(ConfigError::UnsetEnvReference {
            name: name.clone(),
            path: path.to_string(),
        }),
        None => Err(ConfigError::missing(path)),
    }
}

fn require_text(path: &str, value: &str) -> Checked {
    if value.is_empty() {
        Err(ConfigError::missing(path))
    } else {
        Ok(())
    }
}

fn validate_auth(auth: &AuthConfig, unresolved: &BTreeMap<String, String>) -> Checked {
    require_secret("auth.anon_key", &auth.anon_key, unresolved)?;
    require_secret("auth.service_role_key", &auth.service_role_key, unresolved)?;
    if !auth.enabled {
        return Ok(());
    }
    require_text("auth.site_url", &auth.site_url)?;

    if let Some(captcha) = auth.captcha.as_ref().filter(|captcha| captcha.enabled) {
        require_secret("auth.captcha.secret", &captcha.secret, unresolved)?;
    }
    for (name, hook) in auth.hook.entries() {
        if let Some(hook) = hook {
            validate_hook(name, hook, unresolved)?;
        }
    }

    for name in auth.email.template.keys() {
        if !EMAIL_TEMPLATES.contains(&name.as_str()) {
            return Err(ConfigError::invalid_enum(
                format!("auth.email.template.{name}"),
                &EMAIL_TEMPLATES,
            ));
        }
    }
    if let Some(smtp) = auth.email.smtp.as_ref().filter(|smtp| smtp.enabled) {
        require_text("auth.email.smtp.host", &smtp.host)?;
        if smtp.port == 0 {
            return Err(ConfigError::missing("auth.email.smtp.port"));
        }
    }

    validate_sms(&auth.sms, unresolved)?;

    for (name, provider) in &auth.external {
        if !EXTERNAL_PROVIDERS.contains(&name.as_str()) {
            return Err(ConfigError::invalid_enum(
                format!("auth.external.{name}"),
                &EXTERNAL_PROVIDERS,
            ));
        }
        if !provider.enabled {
            continue;
        }
        require_text(&format!("auth.external.{name}.client_id"), &provider.client_id)?;
        if !SECRETLESS_PROVIDERS.contains(&name.as_str()) {
            require_secret(
                &format!("auth.external.{name}.secret"),
                &provider.secret,
                unresolved,
            )?;
        }
    }

    validate_third_party(&auth.third_party)
}

fn validate_hook(name: &str, hook: &HookEntry, unresolved: &BTreeMap<String, String>) -> Checked {
    if !hook.enabled {
        return Ok(());
    }
    let uri_path = format!("auth.hook.{name}.uri");
    require_text(&uri_path, &hook.uri)?;
    let parsed = Url::parse(&hook.uri)
        .map_err(|error| ConfigError::invalid_value(&uri_path, error.to_string()))?;
    match parsed.scheme().to_ascii_lowercase().as_str() {
        "http" | "https" => require_secret(&format!("auth.hook.{name}.secrets"), &hook.secrets, unresolved),
        "pg-functions" if !hook.secrets.is_empty() => Err(ConfigError::HookSecretUnsupported {
            hook: name.to_string(),
        }),
        "pg-functions" => Ok(()),
        _ => Err(ConfigError::HookSchemeUnsupported {
            hook: name.to_string(),
        }),
    }
}

fn validate_sms(sms: &SmsConfig, unresolved: &BTreeMap<String, String>) -> Checked {
    let enabled = sms.enabled_providers();
    if enabled.len() > 1 {
        let names: Vec<&str> = enabled.iter().map(|kind| kind.name()).collect();
        return Err(ConfigError::invalid_value(
            "auth.sms",
            format!("at most one SMS provider may be enabled (found: {})", names.join(", ")),
        ));
    }
    let Some(kind) = enabled.first() else {
        return Ok(());
    };
    match kind {
        SmsProviderKind::Twilio | SmsProviderKind::TwilioVerify => {
            let (prefix, twilio) = if *kind == SmsProviderKind::Twilio {
                ("auth.sms.twilio", &sms.twilio)
            } else {
                ("auth.sms.twilio_verify", &sms.twilio_verify)
            };
            require_text(&format!("{prefix}.account_sid"), &twilio.account_sid)?;
            require_text(&format!("{prefix}.message_service_sid"), &twilio.message_service_sid)?;
            require_secret(&format!("{prefix}.auth_token"), &twilio.auth_token, unresolved)
        },
        SmsProviderKind::Messagebird => {
            require_text("auth.sms.messagebird.originator", &sms.messagebird.originator)?;
            require_secret(
                "auth.sms.messagebird.access_key",
                &sms.messagebird.access_key,
                unresolved,
            )
        },
        SmsProviderKind::Textlocal => {
            require_text("auth.sms.textlocal.sender", &sms.textlocal.sender)?;
            require_secret("auth.sms.textlocal.api_key", &sms.textlocal.api_key, unresolved)
        },
        SmsProviderKind::Vonage => {
            require_text("auth.sms.vonage.from", &sms.vonage.from)?;
            require_text("auth.sms.vonage.api_key", &sms.vonage.api_key)?;
            require_secret("auth.sms.vonage.api_secret", &sms.vonage.api_secret, unresolved)
        },
    }
}

fn validate_third_party(third_party: &ThirdPartyConfig) -> Checked {
    let enabled = third_party.enabled_providers();
    if enabled.len() > 1 {
        return Err(ConfigError::ThirdPartyAuthAmbiguous {
            enabled: enabled.join(", "),
        });
    }
    if third_party.firebase.enabled {
        require_text("auth.third_party.firebase.project_id", &third_party.firebase.project_id)?;
    }
    if third_party.auth0.enabled {
        require_text("auth.third_party.auth0.tenant", &third_party.auth0.tenant)?;
    }
    if third_party.aws_cognito.enabled {
        require_text(
            "auth.third_party.aws_cognito.user_pool_id",
            &third_party.aws_cognito.user_pool_id,
        )?;
        require_text(
            "auth.third_party.aws_cognito.user_pool_region",
            &third_party.aws_cognito.user_pool_region,
        )?;
    }
    if third_party.clerk.enabled {
        require_text("auth.third_party.clerk.domain", &third_party.clerk.domain)?;
    }
    if third_party.workos.enabled {
        require_text("auth.third_party.workos.issuer_url", &third_party.workos.issuer_url)?;
    }
    Ok(())
}

fn validate_analytics(analytics: &AnalyticsConfig) -> Checked {
    if !analytics.enabled || analytics.backend != LogflareBackend::Bigquery {
        return Ok(());
    }
    require_text("analytics.gcp_project_id", &analytics.gcp_project_id)?;
    require_text("analytics.gcp_project_number", &analytics.gcp_project_number)?;
    require_text("analytics.gcp_jwt_path", &analytics.gcp_jwt_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BucketConfig, ClerkAuth, ExternalProvider, FirebaseAuth};

    fn valid_config() -> Config {
        let mut config = Config {
            project_id: "demo".to_string(),
            ..Config::default()
        };
        config.db.major_version = 17;
        config.auth.enabled = true;
        config.auth.site_url = "http://127.0.0.1:3000".to_string();
        config.auth.anon_key = Secret::hashed("anon");
        config.auth.service_role_key = Secret::hashed("service");
        config
    }

    fn hook(uri: &str, secret: &str) -> HookEntry {
        let mut secrets = Secret::plain(secret);
        secrets.seal(b"key");
        HookEntry {
            enabled: true,
            uri: uri.to_string(),
            secrets,
        }
    }

    fn check(config: &Config) -> Checked {
        validate_config(config, &BTreeMap::new())
    }

    #[test]
    fn baseline_is_valid() {
        assert_eq!(check(&valid_config()), Ok(()));
    }

    #[test]
    fn hook_schemes() {
        let mut config = valid_config();
        config.auth.hook.send_sms = Some(hook("http://example.com", "v1,whsec_abc"));
        assert_eq!(check(&config), Ok(()));

        config.auth.hook.send_sms = Some(hook("ftp://example.com", "v1,whsec_abc"));
        let error = check(&config).expect_err("ftp rejected");
        assert!(error.to_string().contains("send_sms"));
        assert!(matches!(error, ConfigError::HookSchemeUnsupported { .. }));

        config.auth.hook.send_sms = Some(hook("pg-functions://postgres/public/fn", "v1,whsec_abc"));
        assert!(matches!(
            check(&config),
            Err(ConfigError::HookSecretUnsupported { .. })
        ));

        config.auth.hook.send_sms = Some(hook("pg-functions://postgres/public/fn", ""));
        assert_eq!(check(&config), Ok(()));
    }

    #[test]
    fn major_version_twelve_is_rejected() {
        let mut config = valid_config();
        config.db.major_version = 12;
        assert!(matches!(
            check(&config),
            Err(ConfigError::InvalidEnum { ref path, .. }) if path == "db.major_version"
        ));
    }

    #[test]
    fn one_third_party_provider_at_most() {
        let mut config = valid_config();
        config.auth.third_party.firebase = FirebaseAuth {
            enabled: true,
            project_id: "p".to_string(),
        };
        config.auth.third_party.clerk = ClerkAuth {
            enabled: true,
            domain: "d".to_string(),
        };
        assert_eq!(
            check(&config),
            Err(ConfigError::ThirdPartyAuthAmbiguous {
                enabled: "firebase, clerk".to_string()
            })
        );
    }

    #[test]
    fn external_provider_requirements() {
        let mut config = valid_config();
        config.auth.external.insert(
            "google".to_string(),
            ExternalProvider {
                enabled: true,
                client_id: "id".to_string(),
                ..ExternalProvider::default()
            },
        );
        assert_eq!(check(&config), Ok(()));

        config.auth.external.insert(
            "github".to_string(),
            ExternalProvider {
                enabled: true,
                client_id: "id".to_string(),
                ..ExternalProvider::default()
            },
        );
        assert_eq!(
            check(&config),
            Err(ConfigError::missing("auth.external.github.secret"))
        );

        config.auth.external.clear();
        config
            .auth
            .external
            .insert("myspace".to_string(), ExternalProvider::default());
        assert!(matches!(check(&config), Err(ConfigError::InvalidEnum { .. })));
    }

    #[test]
    fn unresolved_env_is_named_for_required_secret() {
        let mut config = valid_config();
        config.auth.sms.twilio.enabled = true;
        config.auth.sms.twilio.account_sid = "sid".to_string();
        config.auth.sms.twilio.message_service_sid = "msid".to_string();
        let unresolved = BTreeMap::from([(
            "auth.sms.twilio.auth_token".to_string(),
            "TWILIO_TOKEN".to_string(),
        )]);
        assert_eq!(
            validate_config(&config, &unresolved),
            Err(ConfigError::UnsetEnvReference {
                name: "TWILIO_TOKEN".to_string(),
                path: "auth.sms.twilio.auth_token".to_string(),
            })
        );
    }

    #[test]
    fn names_must_match_patterns() {
        let mut config = valid_config();
        config
            .storage
            .buckets
            .insert("bad/name".to_string(), BucketConfig::default());
        assert!(matches!(check(&config), Err(ConfigError::InvalidPattern { .. })));

        let mut config = valid_config();
        config.functions.insert("1fn".to_string(), crate::schema::FunctionConfig::default());
        assert!(matches!(check(&config), Err(ConfigError::InvalidPattern { ref path, .. }) if path == "functions.1fn"));
    }

    #[test]
    fn bigquery_needs_gcp_fields() {
        let mut config = valid_config();
        config.analytics.enabled = true;
        config.analytics.backend = LogflareBackend::Bigquery;
        assert_eq!(
            check(&config),
            Err(ConfigError::missing("analytics.gcp_project_id"))
        );
    }

    #[test]
    fn enum_fields_are_checked_on_the_document() {
        let document: toml::Value = toml::Value::Table(
            "[db.pooler]\npool_mode = \"statement\"\n"
                .parse()
                .expect("toml"),
        );
        assert_eq!(
            check_enum_fields(&document),
            Err(ConfigError::invalid_enum(
                "db.pooler.pool_mode",
                &["transaction", "session"]
            ))
        );
        let document = toml::Value::Table("[realtime]\nip_version = \"IPv6\"\n".parse().expect("toml"));
        assert_eq!(check_enum_fields(&document), Ok(()));
    }

    #[test]
    fn unsanitized_project_id_is_rejected() {
        let mut config = valid_config();
        config.project_id = "_abc".to_string();
        assert!(matches!(check(&config), Err(ConfigError::InvalidPattern { .. })));
    }
}
