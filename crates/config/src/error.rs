//! Typed configuration errors.
//!
//! Messages name the dotted config path and never carry secret values.

use supaconf_shared::{ErrorCode, ErrorEnvelope};
use thiserror::Error;

/// Failures raised while loading or validating a project config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {reason}")]
    UnreadableConfig {
        /// File that failed to load.
        path: String,
        /// Underlying I/O reason.
        reason: String,
    },
    /// The config document is not valid TOML or does not fit the schema.
    #[error("failed to parse config {source_name}: {reason}")]
    UnparsableConfig {
        /// Document label (file path or `defaults`).
        source_name: String,
        /// Parser message.
        reason: String,
    },
    /// A field required by an enabled feature is empty.
    #[error("missing required field in config: {path}")]
    MissingRequiredField {
        /// Dotted config path.
        path: String,
    },
    /// A field holds a value outside its allowed set.
    #[error("invalid config for {path}: must be one of [{allowed}]")]
    InvalidEnum {
        /// Dotted config path.
        path: String,
        /// Comma-separated allowed values.
        allowed: String,
    },
    /// A name or identifier does not match its pattern.
    #[error("invalid config for {path}: must match {pattern}")]
    InvalidPattern {
        /// Dotted config path.
        path: String,
        /// Expected pattern.
        pattern: String,
    },
    /// A field is malformed (size, duration, URL, number).
    #[error("invalid config for {path}: {reason}")]
    InvalidValue {
        /// Dotted config path.
        path: String,
        /// Human-readable reason.
        reason: String,
    },
    /// A required secret refers to an unset environment variable.
    #[error("environment variable is unset: {name} (required by {path})")]
    UnsetEnvReference {
        /// Variable name inside `env(...)`.
        name: String,
        /// Dotted config path.
        path: String,
    },
    /// No candidate private key decrypted an `encrypted:` value.
    #[error("failed to decrypt secret: {path}")]
    SecretDecryptionFailed {
        /// Dotted config path.
        path: String,
    },
    /// API key minting failed.
    #[error("failed to generate API keys: {reason}")]
    SignerFailure {
        /// Human-readable reason.
        reason: String,
    },
    /// A hook URI uses an unsupported scheme.
    #[error("invalid hook config: auth.hook.{hook}.uri should be a HTTP, HTTPS, or pg-functions URI")]
    HookSchemeUnsupported {
        /// Hook name, e.g. `send_sms`.
        hook: String,
    },
    /// A pg-functions hook declares secrets.
    #[error("invalid hook config: auth.hook.{hook}.secrets is unsupported for pg-functions URI")]
    HookSecretUnsupported {
        /// Hook name.
        hook: String,
    },
    /// More than one third-party auth provider is enabled.
    #[error("at most one third-party auth provider may be enabled (found: {enabled})")]
    ThirdPartyAuthAmbiguous {
        /// Comma-separated enabled providers.
        enabled: String,
    },
}

impl ConfigError {
    /// Convenience constructor for [`Self::MissingRequiredField`].
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingRequiredField { path: path.into() }
    }

    /// Convenience constructor for [`Self::InvalidEnum`].
    pub fn invalid_enum(path: impl Into<String>, allowed: &[&str]) -> Self {
        Self::InvalidEnum {
            path: path.into(),
            allowed: allowed.join(", "),
        }
    }

    /// Convenience constructor for [`Self::InvalidValue`].
    pub fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::UnreadableConfig { .. } => "unreadable_config",
            Self::UnparsableConfig { .. } => "unparsable_config",
            Self::MissingRequiredField { .. } => "missing_required_field",
            Self::InvalidEnum { .. } => "invalid_enum",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::InvalidValue { .. } => "invalid_value",
            Self::UnsetEnvReference { .. } => "unset_env_reference",
            Self::SecretDecryptionFailed { .. } => "secret_decryption_failed",
            Self::SignerFailure { .. } => "signer_failure",
            Self::HookSchemeUnsupported { .. } => "hook_scheme_unsupported",
            Self::HookSecretUnsupported { .. } => "hook_secret_unsupported",
            Self::ThirdPartyAuthAmbiguous { .. } => "third_party_auth_ambiguous",
        };
        ErrorCode::new("config", code)
    }
}

impl From<ConfigError> for ErrorEnvelope {
    fn from(error: ConfigError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());

        match error {
            ConfigError::UnreadableConfig { path, .. } => envelope.with_metadata("file", path),
            ConfigError::UnparsableConfig { source_name, .. } => {
                envelope.with_metadata("file", source_name)
            },
            ConfigError::MissingRequiredField { path }
            | ConfigError::InvalidValue { path, .. }
            | ConfigError::SecretDecryptionFailed { path } => envelope.with_path(path),
            ConfigError::InvalidEnum { path, allowed } => {
                envelope.with_path(path).with_metadata("allowed", allowed)
            },
            ConfigError::InvalidPattern { path, pattern } => {
                envelope.with_path(path).with_metadata("pattern", pattern)
            },
            ConfigError::UnsetEnvReference { name, path } => {
                envelope.with_path(path).with_metadata("env", name)
            },
            ConfigError::SignerFailure { .. } => envelope,
            ConfigError::HookSchemeUnsupported { hook }
            | ConfigError::HookSecretUnsupported { hook } => {
                envelope.with_path(format!("auth.hook.{hook}"))
            },
            ConfigError::ThirdPartyAuthAmbiguous { enabled } => {
                envelope.with_metadata("enabled", enabled)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_code_and_path() {
        let envelope: ErrorEnvelope = ConfigError::missing("auth.sms.twilio.auth_token").into();
        assert_eq!(envelope.code.to_string(), "config:missing_required_field");
        assert_eq!(envelope.path(), Some("auth.sms.twilio.auth_token"));
        assert!(envelope.message.contains("auth.sms.twilio.auth_token"));
    }

    #[test]
    fn invalid_enum_lists_allowed_values() {
        let error = ConfigError::invalid_enum("db.pooler.pool_mode", &["transaction", "session"]);
        assert_eq!(
            error.to_string(),
            "invalid config for db.pooler.pool_mode: must be one of [transaction, session]"
        );
        let envelope = ErrorEnvelope::from(error);
        assert_eq!(
            envelope.metadata.get("allowed").map(String::as_str),
            Some("transaction, session")
        );
    }

    #[test]
    fn hook_errors_name_the_hook() {
        let error = ConfigError::HookSchemeUnsupported {
            hook: "send_sms".to_string(),
        };
        assert!(error.to_string().contains("auth.hook.send_sms.uri"));
    }
}
