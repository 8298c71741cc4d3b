//! In-memory [`FileSystemPort`] for loader and resolver tests.
//!
//! Paths are normalized by dropping `.` components, so `./supabase/seed.sql`
//! and `supabase/seed.sql` name the same entry. Directories exist either
//! because they were created explicitly or because a file lives below them.

use glob::{MatchOptions, Pattern};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use supaconf_ports::{FileSystemEntryKind, FileSystemPort, FileSystemStat, not_found};
use supaconf_shared::{ErrorCode, ErrorEnvelope, Result};

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

impl Tree {
    fn is_dir(&self, path: &Path) -> bool {
        path.as_os_str().is_empty()
            || self.dirs.contains(path)
            || self.files.keys().any(|file| file.starts_with(path) && file != path)
    }
}

/// Thread-safe in-memory file tree.
#[derive(Debug, Default)]
pub struct InMemoryFileSystem {
    tree: Mutex<Tree>,
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

impl InMemoryFileSystem {
    /// Empty file tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Self::insert`].
    #[must_use]
    pub fn with_file(self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Create or replace a file.
    pub fn insert(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        self.lock()
            .files
            .insert(normalize(path.as_ref()), contents.as_ref().to_vec());
    }

    /// File contents as UTF-8 text, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock()
            .files
            .get(&normalize(path.as_ref()))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// All file paths in lexical order.
    pub fn files(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl FileSystemPort for InMemoryFileSystem {
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let bytes = self.read_file(path)?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn stat(&self, path: &Path) -> Result<FileSystemStat> {
        let key = normalize(path);
        let tree = self.lock();
        if let Some(bytes) = tree.files.get(&key) {
            return Ok(FileSystemStat {
                kind: FileSystemEntryKind::File,
                size_bytes: bytes.len() as u64,
                mtime_ms: 0,
            });
        }
        if tree.is_dir(&key) {
            return Ok(FileSystemStat {
                kind: FileSystemEntryKind::Directory,
                size_bytes: 0,
                mtime_ms: 0,
            });
        }
        Err(not_found(path))
    }

    fn mkdir_all(&self, path: &Path, _mode: u32) -> Result<()> {
        let key = normalize(path);
        let mut tree = self.lock();
        if tree.files.contains_key(&key) {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "path exists and is not a directory",
            )
            .with_metadata("file", path.display().to_string()));
        }
        for ancestor in key.ancestors().filter(|dir| !dir.as_os_str().is_empty()) {
            tree.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &[u8], _mode: u32) -> Result<()> {
        let key = normalize(path);
        let mut tree = self.lock();
        if let Some(parent) = key.parent()
            && !tree.is_dir(parent)
        {
            return Err(not_found(parent));
        }
        tree.files.insert(key, contents.to_vec());
        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.lock()
            .files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let key = normalize(path);
        let mut tree = self.lock();
        if tree.files.remove(&key).is_some() {
            return Ok(());
        }
        if tree.files.keys().any(|file| file.starts_with(&key)) {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "directory not empty",
            )
            .with_metadata("file", path.display().to_string()));
        }
        if tree.dirs.remove(&key) {
            return Ok(());
        }
        Err(not_found(path))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let normalized = normalize(Path::new(pattern));
        let matcher = Pattern::new(&normalized.to_string_lossy()).map_err(|error| {
            ErrorEnvelope::expected(ErrorCode::invalid_input(), error.to_string())
                .with_metadata("pattern", pattern.to_string())
        })?;
        Ok(self
            .lock()
            .files
            .keys()
            .filter(|file| matcher.matches_path_with(file, GLOB_OPTIONS))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supaconf_ports::{FILE_MODE, FileSystemPortExt};

    #[test]
    fn dot_prefixed_paths_resolve_to_the_same_file() -> Result<()> {
        let fs = InMemoryFileSystem::new().with_file("supabase/seed.sql", "select 1;");
        assert_eq!(fs.read_to_string(Path::new("./supabase/seed.sql"))?, "select 1;");
        assert!(fs.stat(Path::new("supabase"))?.is_dir());
        Ok(())
    }

    #[test]
    fn missing_paths_report_not_found() {
        let fs = InMemoryFileSystem::new();
        let error = fs.read_file(Path::new("nope.toml")).err();
        assert_eq!(error.map(|error| error.code), Some(ErrorCode::not_found()));
        assert!(matches!(fs.exists(Path::new("nope.toml")), Ok(false)));
    }

    #[test]
    fn write_requires_parent_directory() -> Result<()> {
        let fs = InMemoryFileSystem::new();
        assert!(fs.write_file(Path::new("a/b.txt"), b"x", FILE_MODE).is_err());
        fs.mkdir_all(Path::new("a"), supaconf_ports::DIR_MODE)?;
        fs.write_file(Path::new("a/b.txt"), b"x", FILE_MODE)?;
        assert_eq!(fs.contents("a/b.txt").as_deref(), Some("x"));
        Ok(())
    }

    #[test]
    fn glob_star_stays_within_one_directory() -> Result<()> {
        let fs = InMemoryFileSystem::new()
            .with_file("supabase/seeds/b.sql", "")
            .with_file("supabase/seeds/a.sql", "")
            .with_file("supabase/seeds/nested/c.sql", "");
        assert_eq!(
            fs.glob("./supabase/seeds/*.sql")?,
            vec![
                PathBuf::from("supabase/seeds/a.sql"),
                PathBuf::from("supabase/seeds/b.sql"),
            ]
        );
        assert_eq!(fs.glob("supabase/seeds/**/*.sql")?.len(), 3);
        Ok(())
    }
}
