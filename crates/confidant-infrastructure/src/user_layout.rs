//! On-disk layout of a user's persisted state.

use confidant_core::naming::{HISTORY_DIR, PORTRAIT_DIR, validate_segment};
use confidant_core::{ConfidantError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Resolves and creates per-user directories.
///
/// Directory structure:
/// ```text
/// base/
/// └── <user_id>/
///     ├── history/
///     │   └── history_YYYYMMDD_HHMMSS.txt
///     └── portrait/
///         └── <label>_YYYYMMDD_HHMMSS.txt
/// ```
#[derive(Debug, Clone)]
pub struct UserDirectoryLayout {
    base: PathBuf,
}

impl UserDirectoryLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `<base>/<user_id>`
    pub fn user_root(&self, user_id: &str) -> Result<PathBuf> {
        validate_segment("user id", user_id)?;
        Ok(self.base.join(user_id))
    }

    /// `<base>/<user_id>/history`
    pub fn history_dir(&self, user_id: &str) -> Result<PathBuf> {
        Ok(self.user_root(user_id)?.join(HISTORY_DIR))
    }

    /// `<base>/<user_id>/portrait`
    pub fn portrait_dir(&self, user_id: &str) -> Result<PathBuf> {
        Ok(self.user_root(user_id)?.join(PORTRAIT_DIR))
    }

    /// Path of a transcript file; `file_name` must be a bare file name.
    pub fn history_file(&self, user_id: &str, file_name: &str) -> Result<PathBuf> {
        validate_segment("file name", file_name)?;
        Ok(self.history_dir(user_id)?.join(file_name))
    }

    /// Path of a portrait file; `file_name` must be a bare file name.
    pub fn portrait_file(&self, user_id: &str, file_name: &str) -> Result<PathBuf> {
        validate_segment("file name", file_name)?;
        Ok(self.portrait_dir(user_id)?.join(file_name))
    }

    /// Creates `history/` and `portrait/` under the user root.
    ///
    /// Idempotent. Fails with a fatal `Layout` error only when the
    /// filesystem refuses to create a directory.
    pub async fn ensure(&self, user_id: &str) -> Result<()> {
        self.ensure_history_dir(user_id).await?;
        self.ensure_portrait_dir(user_id).await?;
        Ok(())
    }

    pub async fn ensure_history_dir(&self, user_id: &str) -> Result<PathBuf> {
        let dir = self.history_dir(user_id)?;
        create_dir(&dir).await?;
        Ok(dir)
    }

    pub async fn ensure_portrait_dir(&self, user_id: &str) -> Result<PathBuf> {
        let dir = self.portrait_dir(user_id)?;
        create_dir(&dir).await?;
        Ok(dir)
    }
}

async fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).await.map_err(|e| {
        tracing::error!(path = %dir.display(), error = %e, "Failed to create directory");
        ConfidantError::layout(dir, e)
    })
}
