//! Config loading: defaults, file, environment, remote overlay, secrets,
//! derived fields, validation.
//!
//! Composition happens on a `toml::Value` so every layer can be expressed as a
//! partial document, then the result is decoded once into [`Config`].
//! Precedence, lowest first: defaults template, user file, `SUPABASE_*`
//! variables, selected remote.

use crate::decrypt::decrypt_secret;
use crate::env::{LoadEnv, apply_env_overrides, interpolate_env, join_path};
use crate::error::ConfigError;
use crate::jwt::generate_api_keys;
use crate::paths::ConfigPaths;
use crate::patterns::sanitize_project_id;
use crate::schema::Config;
use crate::secret::{ENCRYPTED_PREFIX, Secret};
use crate::validate::{check_enum_fields, validate_config};
use std::collections::BTreeMap;
use std::path::PathBuf;
use supaconf_ports::{FileSystemPort, FileSystemPortExt};
use supaconf_shared::{Result, SecretString};

/// Embedded defaults; `{{ .ProjectId }}` is replaced before parsing.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/config.toml");

const PROJECT_ID_PLACEHOLDER: &str = "{{ .ProjectId }}";
const REMOTES_KEY: &str = "remotes";

/// Inputs to [`load_config`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Path to `config.toml`; `"."` means `supabase/config.toml`.
    pub config_path: PathBuf,
    /// Project id used when the file does not set one.
    pub project_id: Option<String>,
    /// Remote to overlay, by name or by its `project_id`.
    pub remote: Option<String>,
    /// Per-installation key for secret hashes.
    pub installation_key: SecretString,
}

impl LoadOptions {
    /// Options for the config at `config_path`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            ..Self::default()
        }
    }

    /// Set the fallback project id.
    #[must_use]
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Select a remote overlay.
    #[must_use]
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    /// Set the secret hashing key.
    #[must_use]
    pub fn with_installation_key(mut self, key: impl Into<SecretString>) -> Self {
        self.installation_key = key.into();
        self
    }
}

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The validated tree.
    pub config: Config,
    /// Layout derived from the config path.
    pub paths: ConfigPaths,
    /// Non-fatal findings such as unknown keys.
    pub warnings: Vec<String>,
    /// `env(...)` references left unresolved, by dotted path.
    pub unresolved_env: BTreeMap<String, String>,
    /// Name of the remote that was overlaid.
    pub remote: Option<String>,
}

/// Load, compose, decode and validate the config described by `options`.
pub fn load_config(fs: &dyn FileSystemPort, env: &LoadEnv, options: &LoadOptions) -> Result<LoadedConfig> {
    let paths = ConfigPaths::new(&options.config_path);
    let mut env = env.clone();
    env.merge_dotenv_files(fs, &paths.supabase_dir)?;

    let source_name = paths.config_path.display().to_string();
    let text = fs
        .read_to_string(&paths.config_path)
        .map_err(|error| ConfigError::UnreadableConfig {
            path: source_name.clone(),
            reason: error.message,
        })?;
    let user = parse_document(&text, &source_name)?;

    let fallback_id = options
        .project_id
        .clone()
        .or_else(|| user.get("project_id").and_then(toml::Value::as_str).map(str::to_string))
        .unwrap_or_default();
    let mut document = render_defaults(&sanitize_project_id(&fallback_id))?;
    merge_tables(&mut document, user);

    let remotes = take_remotes(&mut document)?;
    let mut value = toml::Value::Table(document);
    apply_env_overrides(&mut value, &env)?;

    let mut remote = None;
    if let Some(selector) = options.remote.as_deref() {
        match find_remote(&remotes, selector) {
            Some((name, overlay)) => {
                tracing::debug!(remote = name, "applying remote overrides");
                if let toml::Value::Table(table) = &mut value {
                    merge_tables(table, overlay.clone());
                }
                remote = Some(name.to_string());
            },
            None => tracing::warn!(remote = selector, "no matching remote config; using base config"),
        }
    }

    let unresolved_env = interpolate_env(&mut value, &env);
    sanitize_project_id_field(&mut value);
    check_enum_fields(&value)?;

    let mut config: Config = value
        .clone()
        .try_into()
        .map_err(|error: toml::de::Error| ConfigError::UnparsableConfig {
            source_name: source_name.clone(),
            reason: error.message().to_string(),
        })?;
    let warnings = report_unknown_keys(&value, &config);
    config.remotes = remotes;

    let installation_key = options.installation_key.expose().as_bytes();
    resolve_secrets(&mut config, &env, &unresolved_env, installation_key)?;
    fill_derived_fields(&mut config, fs, &paths, installation_key)?;
    validate_config(&config, &unresolved_env)?;

    Ok(LoadedConfig {
        config,
        paths,
        warnings,
        unresolved_env,
        remote,
    })
}

/// Parse a TOML document, reporting errors against `source_name`.
pub fn parse_document(text: &str, source_name: &str) -> std::result::Result<toml::Table, ConfigError> {
    text.parse::<toml::Table>()
        .map_err(|error| ConfigError::UnparsableConfig {
            source_name: source_name.to_string(),
            reason: error.message().to_string(),
        })
}

/// The defaults template rendered for `project_id`.
pub fn render_defaults(project_id: &str) -> std::result::Result<toml::Table, ConfigError> {
    parse_document(
        &DEFAULT_TEMPLATE.replace(PROJECT_ID_PLACEHOLDER, project_id),
        "defaults",
    )
}

/// Deep-merge `overlay` into `base`; tables merge, everything else replaces.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            },
            (_, value) => {
                base.insert(key, value);
            },
        }
    }
}

fn take_remotes(document: &mut toml::Table) -> std::result::Result<BTreeMap<String, toml::Table>, ConfigError> {
    let Some(raw) = document.remove(REMOTES_KEY) else {
        return Ok(BTreeMap::new());
    };
    let toml::Value::Table(entries) = raw else {
        return Err(ConfigError::invalid_value(REMOTES_KEY, "must be a table"));
    };
    entries
        .into_iter()
        .map(|(name, value)| match value {
            toml::Value::Table(table) => Ok((name, table)),
            _ => Err(ConfigError::invalid_value(
                format!("{REMOTES_KEY}.{name}"),
                "must be a table",
            )),
        })
        .collect()
}

/// The remote named `selector`, or the one whose `project_id` is `selector`.
fn find_remote<'a>(
    remotes: &'a BTreeMap<String, toml::Table>,
    selector: &str,
) -> Option<(&'a str, &'a toml::Table)> {
    remotes
        .get_key_value(selector)
        .or_else(|| {
            remotes.iter().find(|(_, table)| {
                table.get("project_id").and_then(toml::Value::as_str) == Some(selector)
            })
        })
        .map(|(name, table)| (name.as_str(), table))
}

fn sanitize_project_id_field(value: &mut toml::Value) {
    let Some(toml::Value::String(project_id)) = value.get_mut("project_id") else {
        return;
    };
    let sanitized = sanitize_project_id(project_id);
    if sanitized != *project_id {
        tracing::warn!(
            original = %project_id,
            sanitized = %sanitized,
            "project_id contains invalid characters; using the sanitized value"
        );
        *project_id = sanitized;
    }
}

fn report_unknown_keys(input: &toml::Value, config: &Config) -> Vec<String> {
    let Ok(known) = toml::Value::try_from(config) else {
        return Vec::new();
    };
    let mut unknown = Vec::new();
    collect_unknown_keys(input, &known, "", &mut unknown);
    unknown
        .into_iter()
        .map(|path| {
            tracing::warn!("Unknown config field: [{path}]");
            format!("Unknown config field: [{path}]")
        })
        .collect()
}

fn collect_unknown_keys(input: &toml::Value, known: &toml::Value, path: &str, unknown: &mut Vec<String>) {
    let (toml::Value::Table(input), toml::Value::Table(known)) = (input, known) else {
        return;
    };
    for (key, value) in input {
        let child = join_path(path, key);
        match known.get(key) {
            Some(known_value) => collect_unknown_keys(value, known_value, &child, unknown),
            None => unknown.push(child),
        }
    }
}

fn resolve_secrets(
    config: &mut Config,
    env: &LoadEnv,
    unresolved: &BTreeMap<String, String>,
    installation_key: &[u8],
) -> std::result::Result<(), ConfigError> {
    let private_keys = env.private_keys();
    for (path, secret) in config.secrets_mut() {
        if unresolved.contains_key(&path) {
            *secret = Secret::default();
            continue;
        }
        if let Some(value) = secret.value().filter(|value| value.starts_with(ENCRYPTED_PREFIX)) {
            if let Some(plain) = decrypt_secret(&path, value, &private_keys)? {
                *secret = Secret::plain(plain);
            }
        }
        secret.seal(installation_key);
    }
    Ok(())
}

fn fill_derived_fields(
    config: &mut Config,
    fs: &dyn FileSystemPort,
    paths: &ConfigPaths,
    installation_key: &[u8],
) -> Result<()> {
    config.api.resolve_external_url(&config.hostname);
    generate_api_keys(&mut config.auth, fs, &paths.supabase_dir, installation_key)?;
    config.storage.inherit_bucket_limits();
    for (slug, function) in &mut config.functions {
        function.resolve_paths(fs, paths, slug)?;
    }
    config.auth.email.load_templates(fs, &paths.project_root)?;
    Ok(())
}
