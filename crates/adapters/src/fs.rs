//! Local filesystem adapter.

use glob::MatchOptions;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use supaconf_ports::{FileSystemEntryKind, FileSystemPort, FileSystemStat, not_found};
use supaconf_shared::{ErrorCode, ErrorEnvelope, Result};

/// [`FileSystemPort`] over `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    /// Build the adapter.
    pub const fn new() -> Self {
        Self
    }
}

fn io_error(path: &Path, error: io::Error) -> ErrorEnvelope {
    if error.kind() == io::ErrorKind::NotFound {
        return not_found(path);
    }
    ErrorEnvelope::from(error).with_metadata("file", path.display().to_string())
}

impl FileSystemPort for LocalFileSystem {
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let file = std::fs::File::open(path).map_err(|error| io_error(path, error))?;
        Ok(Box::new(file))
    }

    fn stat(&self, path: &Path) -> Result<FileSystemStat> {
        let metadata = std::fs::metadata(path).map_err(|error| io_error(path, error))?;
        let file_type = metadata.file_type();
        let kind = if file_type.is_file() {
            FileSystemEntryKind::File
        } else if file_type.is_dir() {
            FileSystemEntryKind::Directory
        } else {
            FileSystemEntryKind::Other
        };

        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
            .unwrap_or(Duration::from_secs(0))
            .as_millis();
        let mtime_ms = u64::try_from(mtime_ms).unwrap_or(0);

        Ok(FileSystemStat {
            kind,
            size_bytes: metadata.len(),
            mtime_ms,
        })
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()> {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(path).map_err(|error| io_error(path, error))
    }

    fn write_file(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()> {
        use std::io::Write;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        let mut file = options.open(path).map_err(|error| io_error(path, error))?;
        file.write_all(contents).map_err(|error| io_error(path, error))
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|error| io_error(path, error))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let metadata = std::fs::symlink_metadata(path).map_err(|error| io_error(path, error))?;
        if metadata.is_dir() {
            std::fs::remove_dir(path)
        } else {
            std::fs::remove_file(path)
        }
        .map_err(|error| io_error(path, error))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let entries = glob::glob_with(pattern, options).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                format!("invalid glob pattern: {}", error.msg),
            )
            .with_metadata("pattern", pattern.to_string())
        })?;

        let mut matches = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => matches.push(path),
                Err(error) => {
                    tracing::debug!(path = %error.path().display(), "skipping unreadable glob entry");
                },
            }
        }
        matches.sort();
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supaconf_ports::{FILE_MODE, FileSystemPortExt};

    #[test]
    fn missing_file_maps_to_not_found() {
        let fs = LocalFileSystem::new();
        let error = fs
            .read_file(Path::new("/definitely/not/here.toml"))
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::not_found());
        assert_eq!(
            error.metadata.get("file").map(String::as_str),
            Some("/definitely/not/here.toml")
        );
    }

    #[test]
    fn write_requires_existing_parent() -> Result<()> {
        let root = tempfile::tempdir().map_err(ErrorEnvelope::from)?;
        let fs = LocalFileSystem::new();
        let error = fs
            .write_file(&root.path().join("missing/config.toml"), b"x", FILE_MODE)
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::not_found());
        assert!(!fs.exists(&root.path().join("missing"))?);
        Ok(())
    }

    #[test]
    fn invalid_pattern_is_invalid_input() {
        let error = LocalFileSystem::new().glob("seeds/[.sql").unwrap_err();
        assert_eq!(error.code, ErrorCode::invalid_input());
    }
}
