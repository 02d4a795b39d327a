//! Access to the uploads directory.
//!
//! The directory is flat and is the only source of truth: there is no index or metadata
//! sidecar, and nothing is ever deleted. Concurrent writers to the same name race, last
//! writer wins.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The name would escape the uploads directory or is not a plain file name
    #[error("invalid file name: {name:?}")]
    InvalidFileName { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Accept only a single, normal path component.
///
/// Rejects empty names, `.`/`..`, anything containing a separator, and absolute or prefixed
/// paths, so that a resolved name always stays inside the uploads directory.
pub fn validate_file_name(name: &str) -> Result<&str> {
    let invalid = || StorageError::InvalidFileName { name: name.to_string() };

    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(invalid());
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(invalid()),
    }
}

/// Local directory holding uploaded files, keyed by their client-supplied name.
#[derive(Debug, Clone)]
pub struct UploadStore {
    base_path: PathBuf,
}

impl UploadStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Create the directory (and any parents) if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    /// Names of all non-directory entries, in the order the filesystem enumerates them
    pub async fn list_files(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(names)
    }

    /// Path of `name` inside the uploads directory
    pub fn resolve_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.base_path.join(validate_file_name(name)?))
    }

    /// Like [`resolve_path`](Self::resolve_path), except that an empty name resolves to the
    /// uploads directory itself
    pub fn resolve_path_or_dir(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() {
            return Ok(self.base_path.clone());
        }
        self.resolve_path(name)
    }

    /// Open `name` for writing, truncating any existing content
    pub async fn create(&self, name: &str) -> Result<fs::File> {
        let path = self.resolve_path(name)?;
        Ok(fs::File::create(path).await?)
    }
}
