//! `[functions.<slug>]`: edge function settings.

use crate::glob::resolve_globs;
use crate::paths::ConfigPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use supaconf_ports::{FileSystemPort, FileSystemPortExt};
use supaconf_shared::Result;

const IMPORT_MAP_CANDIDATES: [&str; 3] = ["deno.json", "deno.jsonc", "import_map.json"];

/// Settings for one edge function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    /// Serve and deploy this function.
    pub enabled: bool,
    /// Require a valid JWT on invocation. Unset leaves the choice to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_jwt: Option<bool>,
    /// Entrypoint file; defaults to `functions/<slug>/index.ts`.
    pub entrypoint: String,
    /// Import map or Deno config file.
    pub import_map: String,
    /// Extra files bundled with the function, as globs.
    pub static_files: Vec<String>,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            verify_jwt: None,
            entrypoint: String::new(),
            import_map: String::new(),
            static_files: Vec::new(),
        }
    }
}

impl FunctionConfig {
    /// Resolve the entrypoint, import map and static files against the project layout.
    pub fn resolve_paths(&mut self, fs: &dyn FileSystemPort, paths: &ConfigPaths, slug: &str) -> Result<()> {
        let function_dir = paths.function_dir(slug);
        self.entrypoint = if self.entrypoint.is_empty() {
            path_string(&function_dir.join("index.ts"))
        } else {
            path_string(&rooted(&paths.supabase_dir, &self.entrypoint))
        };

        if self.import_map.is_empty() {
            if let Some(found) = find_import_map(fs, paths, &function_dir, slug)? {
                self.import_map = path_string(&found);
            }
        } else {
            self.import_map = path_string(&rooted(&paths.supabase_dir, &self.import_map));
        }

        if !self.static_files.is_empty() {
            self.static_files = resolve_globs(fs, &paths.supabase_dir, &self.static_files)?
                .iter()
                .map(|path| path_string(path))
                .collect();
        }
        Ok(())
    }
}

fn find_import_map(
    fs: &dyn FileSystemPort,
    paths: &ConfigPaths,
    function_dir: &Path,
    slug: &str,
) -> Result<Option<PathBuf>> {
    for name in IMPORT_MAP_CANDIDATES {
        let candidate = function_dir.join(name);
        if fs.exists(&candidate)? {
            if name == "import_map.json" {
                tracing::warn!(
                    function = slug,
                    "import_map.json is deprecated; use deno.json in the function directory"
                );
            }
            return Ok(Some(candidate));
        }
    }
    if fs.exists(&paths.fallback_import_map)? {
        tracing::warn!(
            function = slug,
            path = %paths.fallback_import_map.display(),
            "using the shared functions import map is deprecated; add deno.json to the function directory"
        );
        return Ok(Some(paths.fallback_import_map.clone()));
    }
    Ok(None)
}

fn rooted(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
