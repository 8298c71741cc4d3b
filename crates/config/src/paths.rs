//! Filesystem layout derived from a single config-file path.

use std::path::{Path, PathBuf};

/// Directory holding the project config.
pub const SUPABASE_DIR: &str = "supabase";

/// Config file name inside [`SUPABASE_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Every path the engine derives from the config location.
///
/// All paths are rooted at the directory containing the config file and are
/// never canonicalized, so relative inputs stay relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// The config file itself.
    pub config_path: PathBuf,
    /// Directory containing the config file.
    pub supabase_dir: PathBuf,
    /// Parent of the supabase directory; email templates resolve against it.
    pub project_root: PathBuf,
    /// Scratch directory for linked-project state.
    pub temp_dir: PathBuf,
    /// Linked project ref.
    pub project_ref: PathBuf,
    /// Linked pooler connection string.
    pub pooler_url: PathBuf,
    /// Pinned postgres image version.
    pub postgres_version: PathBuf,
    /// Pinned gotrue image version.
    pub gotrue_version: PathBuf,
    /// Pinned rest image version.
    pub rest_version: PathBuf,
    /// Pinned storage image version.
    pub storage_version: PathBuf,
    /// Pinned studio image version.
    pub studio_version: PathBuf,
    /// Pinned pgmeta image version.
    pub pgmeta_version: PathBuf,
    /// Pinned pooler image version.
    pub pooler_version: PathBuf,
    /// Pinned realtime image version.
    pub realtime_version: PathBuf,
    /// Pinned edge-runtime image version.
    pub edge_runtime_version: PathBuf,
    /// Last seen CLI release.
    pub cli_version: PathBuf,
    /// Selected local branch.
    pub current_branch: PathBuf,
    /// Migrations directory.
    pub migrations_dir: PathBuf,
    /// Functions directory.
    pub functions_dir: PathBuf,
    /// Shared import map used when a function has none.
    pub fallback_import_map: PathBuf,
    /// Env file passed to functions by default.
    pub fallback_env: PathBuf,
    /// Seed file.
    pub seed_file: PathBuf,
    /// Schemas directory.
    pub schemas_dir: PathBuf,
    /// Snippets directory.
    pub snippets_dir: PathBuf,
    /// Tests directory.
    pub tests_dir: PathBuf,
    /// Custom roles SQL.
    pub custom_roles: PathBuf,
}

impl ConfigPaths {
    /// Derive the layout for `config_path`; `"."` and `""` mean `supabase/config.toml`.
    #[must_use]
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        let raw = config_path.as_ref();
        let config_path = if raw.as_os_str().is_empty() || raw == Path::new(".") {
            Path::new(SUPABASE_DIR).join(CONFIG_FILE)
        } else {
            raw.to_path_buf()
        };
        let supabase_dir = config_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let project_root = supabase_dir
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let temp_dir = supabase_dir.join(".temp");
        let functions_dir = supabase_dir.join("functions");

        Self {
            project_ref: temp_dir.join("project-ref"),
            pooler_url: temp_dir.join("pooler-url"),
            postgres_version: temp_dir.join("postgres-version"),
            gotrue_version: temp_dir.join("gotrue-version"),
            rest_version: temp_dir.join("rest-version"),
            storage_version: temp_dir.join("storage-version"),
            studio_version: temp_dir.join("studio-version"),
            pgmeta_version: temp_dir.join("pgmeta-version"),
            pooler_version: temp_dir.join("pooler-version"),
            realtime_version: temp_dir.join("realtime-version"),
            edge_runtime_version: temp_dir.join("edge-runtime-version"),
            cli_version: temp_dir.join("cli-latest"),
            current_branch: supabase_dir.join(".branches").join("_current_branch"),
            migrations_dir: supabase_dir.join("migrations"),
            fallback_import_map: functions_dir.join("import_map.json"),
            fallback_env: functions_dir.join(".env"),
            seed_file: supabase_dir.join("seed.sql"),
            schemas_dir: supabase_dir.join("schemas"),
            snippets_dir: supabase_dir.join("snippets"),
            tests_dir: supabase_dir.join("tests"),
            custom_roles: supabase_dir.join("roles.sql"),
            functions_dir,
            temp_dir,
            project_root,
            supabase_dir,
            config_path,
        }
    }

    /// Directory of a single function.
    #[must_use]
    pub fn function_dir(&self, slug: &str) -> PathBuf {
        self.functions_dir.join(slug)
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_defaults_to_supabase_dir() {
        let paths = ConfigPaths::new(".");
        assert_eq!(paths.config_path, PathBuf::from("supabase/config.toml"));
        assert_eq!(paths.supabase_dir, PathBuf::from("supabase"));
        assert_eq!(paths.project_root, PathBuf::from(""));
        assert_eq!(paths.project_ref, PathBuf::from("supabase/.temp/project-ref"));
        assert_eq!(
            paths.current_branch,
            PathBuf::from("supabase/.branches/_current_branch")
        );
        assert_eq!(ConfigPaths::new(""), paths);
    }

    #[test]
    fn paths_follow_custom_location() {
        let paths = ConfigPaths::new("/work/app/supabase/config.toml");
        assert_eq!(paths.project_root, PathBuf::from("/work/app"));
        assert_eq!(
            paths.fallback_import_map,
            PathBuf::from("/work/app/supabase/functions/import_map.json")
        );
        assert_eq!(
            paths.function_dir("hello"),
            PathBuf::from("/work/app/supabase/functions/hello")
        );
        assert_eq!(
            paths.pooler_url,
            PathBuf::from("/work/app/supabase/.temp/pooler-url")
        );
    }
}
