//! Durable storage for the watermark, the sha of the last processed commit.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading or writing the watermark.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read watermark from {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write watermark to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Result alias for watermark store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persists the watermark across process restarts.
pub trait WatermarkStore {
    /// Returns the persisted watermark, or [None] if no commit has been processed yet.
    fn read(&self) -> StoreResult<Option<String>>;

    /// Replaces the persisted watermark. The write is all-or-nothing.
    fn write(&self, sha: &str) -> StoreResult<()>;
}

/// A [WatermarkStore] backed by a single plain-text file.
#[derive(Debug, Clone)]
pub struct FileWatermarkStore {
    path: PathBuf,
}

impl FileWatermarkStore {
    /// Creates a store persisting to `path`. Nothing is touched on disk until the first read or
    /// write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forgets the persisted watermark.
    pub fn clear(&self) -> StoreResult<()> {
        self.write("")
    }

    /// Returns the persisted watermark without creating the backing file when it is missing.
    pub fn peek(&self) -> StoreResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let sha = contents.trim();
                Ok((!sha.is_empty()).then(|| sha.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.read_error(e)),
        }
    }

    fn read_error(&self, source: io::Error) -> StoreError {
        StoreError::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl WatermarkStore for FileWatermarkStore {
    fn read(&self) -> StoreResult<Option<String>> {
        if !self.path.try_exists().map_err(|e| self.read_error(e))? {
            debug!(path = %self.path.display(), "creating empty watermark file");
            write_atomic(&self.path, b"").map_err(|e| self.read_error(e))?;
            return Ok(None);
        }
        self.peek()
    }

    fn write(&self, sha: &str) -> StoreResult<()> {
        write_atomic(&self.path, sha.as_bytes()).map_err(|e| self.write_error(e))?;
        debug!(path = %self.path.display(), sha, "watermark persisted");
        Ok(())
    }
}

/// Writes `data` to `path` by staging it in a sibling temporary file and renaming it into place,
/// so that readers observe either the old or the new contents.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    staged.write_all(data)?;
    staged.flush()?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}
