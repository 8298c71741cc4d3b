//! Glob expansion for configured path lists.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use supaconf_ports::FileSystemPort;
use supaconf_shared::Result;

/// Expand `patterns` relative to `base_dir`.
///
/// Absolute patterns are used as-is. Matches are de-duplicated across
/// patterns, keeping the position of the first occurrence. Patterns that
/// match nothing are logged and skipped.
pub fn resolve_globs<S: AsRef<str>>(
    fs: &dyn FileSystemPort,
    base_dir: &Path,
    patterns: &[S],
) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let full = if Path::new(pattern).is_absolute() {
            PathBuf::from(pattern)
        } else {
            base_dir.join(pattern)
        };
        let full = full.to_string_lossy();
        let matches = fs.glob(&full)?;
        if matches.is_empty() {
            tracing::warn!(pattern = %full, "no files matched pattern");
            continue;
        }
        for path in matches {
            if seen.insert(path.clone()) {
                resolved.push(path);
            }
        }
    }
    Ok(resolved)
}
