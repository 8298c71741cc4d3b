//! Unified diffs between a local section and its remote-seeded copy.
//!
//! Both sides are rendered as TOML. Secrets render as `hash:<hex>` and are
//! swapped for sentinels before diffing, so neither hashes nor cleartext
//! reach the output.

use crate::error::ConfigError;
use crate::secret::HASHED_PREFIX;
use serde::Serialize;
use similar::TextDiff;
use toml::Value;

/// Shown on both sides when the local and remote hashes agree.
pub const UNCHANGED_SENTINEL: &str = "<unchanged-sensitive-value-hidden>";
/// Shown on the local side when the hashes differ.
pub const CHANGED_SENTINEL: &str = "<changed-sensitive-value-hidden>";
/// Shown on the remote side when the hashes differ.
pub const ORIGINAL_SENTINEL: &str = "<original-sensitive-value-hidden>";

/// Diff `local` against a clone seeded by `seed`; empty means no drift.
pub fn diff_with_seed<T, F>(section: &str, local: &T, seed: F) -> Result<String, ConfigError>
where
    T: Serialize + Clone,
    F: FnOnce(&mut T),
{
    let mut remote = local.clone();
    seed(&mut remote);
    diff_section(section, local, &remote)
}

/// Unified diff from `remote` to `local`, labelled `remote[<section>]` and
/// `local[<section>]`. Returns an empty string when both render the same.
pub fn diff_section<T: Serialize>(section: &str, local: &T, remote: &T) -> Result<String, ConfigError> {
    let mut local = render_value(section, local)?;
    let mut remote = render_value(section, remote)?;
    redact_pair(&mut local, &mut remote);
    let local = render_text(section, &local)?;
    let remote = render_text(section, &remote)?;
    if local == remote {
        return Ok(String::new());
    }
    Ok(TextDiff::from_lines(&remote, &local)
        .unified_diff()
        .header(&format!("remote[{section}]"), &format!("local[{section}]"))
        .to_string())
}

fn render_value<T: Serialize>(section: &str, value: &T) -> Result<Value, ConfigError> {
    Value::try_from(value).map_err(|error| ConfigError::UnparsableConfig {
        source_name: section.to_string(),
        reason: error.to_string(),
    })
}

fn render_text(section: &str, value: &Value) -> Result<String, ConfigError> {
    toml::to_string(value).map_err(|error| ConfigError::UnparsableConfig {
        source_name: section.to_string(),
        reason: error.to_string(),
    })
}

fn is_hash(text: &str) -> bool {
    text.starts_with(HASHED_PREFIX)
}

fn redact_pair(local: &mut Value, remote: &mut Value) {
    match (local, remote) {
        (Value::Table(local), Value::Table(remote)) => {
            for (key, local_value) in local.iter_mut() {
                match remote.get_mut(key) {
                    Some(remote_value) => redact_pair(local_value, remote_value),
                    None => redact_all(local_value, CHANGED_SENTINEL),
                }
            }
            for (key, remote_value) in remote.iter_mut() {
                if !local.contains_key(key) {
                    redact_all(remote_value, ORIGINAL_SENTINEL);
                }
            }
        },
        (Value::Array(local), Value::Array(remote)) => {
            let shared = local.len().min(remote.len());
            for (local_value, remote_value) in local.iter_mut().zip(remote.iter_mut()) {
                redact_pair(local_value, remote_value);
            }
            for value in local.iter_mut().skip(shared) {
                redact_all(value, CHANGED_SENTINEL);
            }
            for value in remote.iter_mut().skip(shared) {
                redact_all(value, ORIGINAL_SENTINEL);
            }
        },
        (Value::String(local), Value::String(remote)) if local == remote => {
            if is_hash(local) {
                UNCHANGED_SENTINEL.clone_into(local);
                UNCHANGED_SENTINEL.clone_into(remote);
            }
        },
        (local, remote) => {
            redact_all(local, CHANGED_SENTINEL);
            redact_all(remote, ORIGINAL_SENTINEL);
        },
    }
}

fn redact_all(value: &mut Value, sentinel: &str) {
    match value {
        Value::String(text) if is_hash(text) => sentinel.clone_into(text),
        Value::Table(table) => table
            .iter_mut()
            .for_each(|(_, value)| redact_all(value, sentinel)),
        Value::Array(items) => items.iter_mut().for_each(|value| redact_all(value, sentinel)),
        _ => {},
    }
}
