//! Environment snapshot, `env(...)` interpolation, and `SUPABASE_*` overrides.
//!
//! The loader reads the process environment exactly once into a [`LoadEnv`];
//! nothing in this crate calls `std::env` after that.

use crate::error::ConfigError;
use crate::patterns::parse_env_reference;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use supaconf_ports::{FileSystemPort, FileSystemPortExt};
use supaconf_shared::Result;

/// Prefix of environment overrides for config leaves.
pub const OVERRIDE_PREFIX: &str = "SUPABASE_";

/// Prefix of the variables holding ECIES private keys.
pub const PRIVATE_KEY_PREFIX: &str = "DOTENV_PRIVATE_KEY";

/// Variable selecting which `.env.<ENV>` files load.
pub const ENV_SELECTOR: &str = "ENV";

const DEFAULT_ENV_NAME: &str = "development";

/// Immutable-after-load snapshot of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadEnv {
    vars: BTreeMap<String, String>,
}

impl LoadEnv {
    /// Snapshot the process environment.
    pub fn from_std_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs.
    pub fn from_map<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Look up a variable by name, ignoring ASCII case; an exact match wins.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.get(name).or_else(|| {
            self.vars
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    /// Look up a variable, treating empty values as unset.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    /// Add a variable unless one with the same name exists.
    pub fn set_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Merge `.env` files from `dir` without overriding existing variables.
    ///
    /// Files load in order `.env.<ENV>.local`, `.env.local` (skipped when
    /// `ENV=test`), `.env.<ENV>`, `.env`; earlier files win. Returns the files
    /// that were read.
    pub fn merge_dotenv_files(&mut self, fs: &dyn FileSystemPort, dir: &Path) -> Result<Vec<PathBuf>> {
        let env_name = self
            .get_non_empty(ENV_SELECTOR)
            .unwrap_or(DEFAULT_ENV_NAME)
            .to_string();
        let mut candidates = vec![format!(".env.{env_name}.local")];
        if env_name != "test" {
            candidates.push(".env.local".to_string());
        }
        candidates.push(format!(".env.{env_name}"));
        candidates.push(".env".to_string());

        let mut loaded = Vec::new();
        for name in candidates {
            let path = dir.join(name);
            if !fs.exists(&path)? {
                continue;
            }
            let reader = fs.open(&path)?;
            for item in dotenvy::from_read_iter(reader) {
                let (key, value) = item.map_err(|error| ConfigError::UnparsableConfig {
                    source_name: path.display().to_string(),
                    reason: error.to_string(),
                })?;
                self.set_if_absent(key, value);
            }
            tracing::debug!(file = %path.display(), "loaded env file");
            loaded.push(path);
        }
        Ok(loaded)
    }

    /// Candidate ECIES private keys, hex encoded.
    ///
    /// Variables are visited in name order and each value may hold several
    /// comma-separated keys.
    pub fn private_keys(&self) -> Vec<String> {
        self.vars
            .iter()
            .filter(|(name, _)| name.starts_with(PRIVATE_KEY_PREFIX))
            .flat_map(|(_, value)| value.split(','))
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Outcome of resolving one string against the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    /// Not an `env(...)` reference.
    Literal,
    /// Substituted from the variable or its default.
    Resolved(String),
    /// Variable unset or empty, and no default given.
    Unset {
        /// Referenced variable.
        name: String,
    },
}

/// Resolve `env(NAME)` / `env(NAME, default)` in `text`.
pub fn resolve_env_reference(text: &str, env: &LoadEnv) -> EnvValue {
    let Some((name, default)) = parse_env_reference(text) else {
        return EnvValue::Literal;
    };
    match (env.get_non_empty(name), default) {
        (Some(value), _) => EnvValue::Resolved(value.to_string()),
        (None, Some(default)) => EnvValue::Resolved(default.to_string()),
        (None, None) => EnvValue::Unset {
            name: name.to_string(),
        },
    }
}

/// Substitute every `env(...)` string leaf in `value`.
///
/// Unset references without a default keep their literal text and are
/// returned keyed by dotted path, so required secrets can report them later.
pub fn interpolate_env(value: &mut toml::Value, env: &LoadEnv) -> BTreeMap<String, String> {
    let mut unresolved = BTreeMap::new();
    interpolate_at(value, env, "", &mut unresolved);
    unresolved
}

fn interpolate_at(
    value: &mut toml::Value,
    env: &LoadEnv,
    path: &str,
    unresolved: &mut BTreeMap<String, String>,
) {
    match value {
        toml::Value::String(text) => match resolve_env_reference(text, env) {
            EnvValue::Literal => {},
            EnvValue::Resolved(resolved) => *text = resolved,
            EnvValue::Unset { name } => {
                unresolved.insert(path.to_string(), name);
            },
        },
        toml::Value::Array(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                interpolate_at(item, env, &join_path(path, &index.to_string()), unresolved);
            }
        },
        toml::Value::Table(table) => {
            for (key, item) in table.iter_mut() {
                interpolate_at(item, env, &join_path(path, key), unresolved);
            }
        },
        _ => {},
    }
}

/// Replace scalar leaves with `SUPABASE_<PATH>` variables, coerced to the leaf's type.
pub fn apply_env_overrides(value: &mut toml::Value, env: &LoadEnv) -> std::result::Result<(), ConfigError> {
    override_at(value, env, "")
}

fn override_at(value: &mut toml::Value, env: &LoadEnv, path: &str) -> std::result::Result<(), ConfigError> {
    match value {
        toml::Value::Table(table) => {
            for (key, item) in table.iter_mut() {
                override_at(item, env, &join_path(path, key))?;
            }
            Ok(())
        },
        toml::Value::Array(_) | toml::Value::Datetime(_) => Ok(()),
        scalar => {
            let Some(raw) = env.get_ignore_case(&override_name(path)) else {
                return Ok(());
            };
            *scalar = coerce_like(scalar, raw).ok_or_else(|| {
                ConfigError::invalid_value(path, format!("cannot parse override as {}", scalar.type_str()))
            })?;
            Ok(())
        },
    }
}

/// Environment variable name overriding the leaf at `path`.
pub fn override_name(path: &str) -> String {
    let suffix: String = path
        .chars()
        .map(|ch| match ch {
            '.' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect();
    format!("{OVERRIDE_PREFIX}{suffix}")
}

fn coerce_like(existing: &toml::Value, raw: &str) -> Option<toml::Value> {
    let raw_trimmed = raw.trim();
    match existing {
        toml::Value::String(_) => Some(toml::Value::String(raw.to_string())),
        toml::Value::Integer(_) => raw_trimmed.parse().ok().map(toml::Value::Integer),
        toml::Value::Float(_) => raw_trimmed.parse().ok().map(toml::Value::Float),
        toml::Value::Boolean(_) => match raw_trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(toml::Value::Boolean(true)),
            "false" | "0" => Some(toml::Value::Boolean(false)),
            _ => None,
        },
        toml::Value::Array(_) | toml::Value::Table(_) | toml::Value::Datetime(_) => None,
    }
}

pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
