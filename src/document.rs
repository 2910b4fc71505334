use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::edit::{Edit, EditError, EditResult};

/// The single target file, held fully in memory while the rule sequence runs.
///
/// Loaded once, mutated through [`Edit`]s, written back wholesale. The write
/// is atomic (tempfile + fsync + rename) so a crash mid-run never leaves a
/// half-rewritten component behind.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: PathBuf,
    content: String,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        source: std::str::Utf8Error,
    },
}

impl SourceDocument {
    /// Read the full text of `path` as UTF-8.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let path = path.into();
        let bytes = fs::read(&path).map_err(|source| DocumentError::Read {
            path: path.clone(),
            source,
        })?;
        let content = std::str::from_utf8(&bytes)
            .map_err(|source| DocumentError::Encoding {
                path: path.clone(),
                source,
            })?
            .to_string();
        Ok(Self { path, content })
    }

    /// Construct a document from already-loaded text (scratch copies, tests).
    pub fn from_string(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Apply a single edit to the in-memory text.
    pub fn apply(&mut self, edit: &Edit) -> Result<EditResult, EditError> {
        edit.apply_to(&mut self.content)
    }

    /// Write the current text back to the original path, atomically.
    ///
    /// Also bumps the file's mtime so dev-server watchers pick up the change
    /// even on filesystems with coarse timestamp resolution.
    pub fn save(&self) -> Result<(), DocumentError> {
        atomic_write(&self.path, self.content.as_bytes()).map_err(|source| {
            DocumentError::Write {
                path: self.path.clone(),
                source,
            }
        })?;

        let now = filetime::FileTime::now();
        filetime::set_file_mtime(&self.path, now).map_err(|source| DocumentError::Write {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the original file is untouched.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
    // Tempfile in the same directory to stay on the same filesystem
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
