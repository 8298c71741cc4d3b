//! Filesystem boundary contract.
//!
//! Loading is synchronous, so this port is too. Paths are passed exactly as
//! the config engine derives them (usually relative to the working
//! directory); implementations must not rewrite them.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use supaconf_shared::{ErrorCode, ErrorEnvelope, Result};

/// Default permission bits for created directories.
pub const DIR_MODE: u32 = 0o755;

/// Default permission bits for written files.
pub const FILE_MODE: u32 = 0o644;

/// File system entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSystemEntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Other / unknown.
    Other,
}

/// File system stat info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemStat {
    /// Kind of the entry.
    pub kind: FileSystemEntryKind,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Modification time as milliseconds since epoch.
    pub mtime_ms: u64,
}

impl FileSystemStat {
    /// Returns true for directories.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == FileSystemEntryKind::Directory
    }
}

/// Boundary contract for filesystem access.
pub trait FileSystemPort: Send + Sync {
    /// Open a file for streaming reads.
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>>;

    /// Read file metadata. Missing paths yield a `core:not_found` error.
    fn stat(&self, path: &Path) -> Result<FileSystemStat>;

    /// Create a directory and all missing parents.
    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()>;

    /// Create or truncate a file with the given contents.
    fn write_file(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()>;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Remove a file or empty directory.
    fn remove(&self, path: &Path) -> Result<()>;

    /// Expand a glob pattern, returning matches in lexical order.
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

/// Convenience helpers built on [`FileSystemPort`].
pub trait FileSystemPortExt {
    /// Returns whether the path exists; errors other than not-found propagate.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

impl<T> FileSystemPortExt for T
where
    T: FileSystemPort + ?Sized,
{
    fn exists(&self, path: &Path) -> Result<bool> {
        match self.stat(path) {
            Ok(_) => Ok(true),
            Err(error) if error.code == ErrorCode::not_found() => Ok(false),
            Err(error) => Err(error),
        }
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes).map_err(|_| {
            ErrorEnvelope::expected(ErrorCode::invalid_input(), "file is not valid UTF-8")
                .with_metadata("file", path.display().to_string())
        })
    }
}

/// Shared filesystem handle.
pub type SharedFileSystem = Arc<dyn FileSystemPort>;

/// Build the not-found error every implementation reports for missing paths.
pub fn not_found(path: &Path) -> ErrorEnvelope {
    ErrorEnvelope::expected(ErrorCode::not_found(), "no such file or directory")
        .with_metadata("file", path.display().to_string())
}
