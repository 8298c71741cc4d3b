//! Per-installation key used to hash secrets for diffs and ejected files.

use std::path::Path;
use supaconf_config::LoadEnv;
use supaconf_ports::{DIR_MODE, FileSystemPort, FileSystemPortExt};
use supaconf_shared::{ErrorCode, ErrorEnvelope, Result, SecretString};

/// Overrides the key file when set.
pub const INSTALLATION_KEY_ENV: &str = "SUPABASE_INSTALLATION_KEY";

const KEY_DIR: &str = ".supabase";
const KEY_FILE: &str = "installation-key";
const KEY_MODE: u32 = 0o600;

/// Read the installation key, creating `$HOME/.supabase/installation-key` on first use.
pub fn resolve_installation_key(fs: &dyn FileSystemPort, env: &LoadEnv) -> Result<SecretString> {
    if let Some(key) = env.get_non_empty(INSTALLATION_KEY_ENV) {
        return Ok(SecretString::from(key.trim()));
    }
    let home = env.get_non_empty("HOME").ok_or_else(|| {
        ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            format!("HOME is not set; set {INSTALLATION_KEY_ENV} instead"),
        )
    })?;
    let dir = Path::new(home).join(KEY_DIR);
    let path = dir.join(KEY_FILE);

    if fs.exists(&path)? {
        let stored = fs.read_to_string(&path)?;
        let stored = stored.trim();
        if !stored.is_empty() {
            return Ok(SecretString::from(stored));
        }
    }

    let key = uuid::Uuid::new_v4().to_string();
    fs.mkdir_all(&dir, DIR_MODE)?;
    fs.write_file(&path, key.as_bytes(), KEY_MODE)?;
    tracing::debug!(path = %path.display(), "created installation key");
    Ok(SecretString::from(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use supaconf_testkit::InMemoryFileSystem;

    #[test]
    fn variable_wins_over_key_file() -> Result<()> {
        let fs = InMemoryFileSystem::new().with_file("/home/dev/.supabase/installation-key", "from-file");
        let env = LoadEnv::from_map([(INSTALLATION_KEY_ENV, "from-env"), ("HOME", "/home/dev")]);
        assert_eq!(resolve_installation_key(&fs, &env)?.expose(), "from-env");
        Ok(())
    }

    #[test]
    fn key_file_is_created_once_and_reused() -> Result<()> {
        let fs = InMemoryFileSystem::new();
        let env = LoadEnv::from_map([("HOME", "/home/dev")]);
        let first = resolve_installation_key(&fs, &env)?;
        assert_eq!(first.expose().len(), 36);
        assert_eq!(
            fs.contents("/home/dev/.supabase/installation-key"),
            Some(first.expose().to_string())
        );
        let second = resolve_installation_key(&fs, &env)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn missing_home_is_invalid_input() {
        let error = resolve_installation_key(&InMemoryFileSystem::new(), &LoadEnv::default())
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::invalid_input());
    }
}
