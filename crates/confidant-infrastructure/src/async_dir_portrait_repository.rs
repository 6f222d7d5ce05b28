//! Directory-backed PortraitRepository implementation.

use crate::user_layout::UserDirectoryLayout;
use async_trait::async_trait;
use confidant_core::naming::{portrait_file_name, validate_segment};
use confidant_core::portrait::PortraitRepository;
use confidant_core::{ConfidantError, Result};
use tokio::fs;

/// Stores portraits verbatim under `<base>/<user_id>/portrait/`.
#[derive(Debug, Clone)]
pub struct AsyncDirPortraitRepository {
    layout: UserDirectoryLayout,
}

impl AsyncDirPortraitRepository {
    pub fn new(layout: UserDirectoryLayout) -> Self {
        Self { layout }
    }
}

#[async_trait]
impl PortraitRepository for AsyncDirPortraitRepository {
    async fn save(&self, user_id: &str, label: &str, content: &str) -> Result<String> {
        validate_segment("portrait label", label)?;
        let dir = self.layout.ensure_portrait_dir(user_id).await?;
        let file_name = portrait_file_name(label, chrono::Local::now());
        let path = dir.join(&file_name);

        fs::write(&path, content)
            .await
            .map_err(|e| ConfidantError::storage(&path, e))?;

        tracing::info!(user_id, file = %file_name, "Portrait saved");
        Ok(file_name)
    }

    async fn load(&self, user_id: &str, file_name: &str) -> Result<String> {
        let path = self.layout.portrait_file(user_id, file_name)?;
        if !fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Err(ConfidantError::not_found("Portrait", file_name));
        }

        fs::read_to_string(&path)
            .await
            .map_err(|e| ConfidantError::storage(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_keeps_content_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let repo = AsyncDirPortraitRepository::new(UserDirectoryLayout::new(temp_dir.path()));
        let raw = "  - Emotional state: anxious\n- Age: not mentioned\n\n";

        let file_name = repo.save("alice", "user_portrait", raw).await.unwrap();

        assert!(file_name.starts_with("user_portrait_"));
        let on_disk =
            std::fs::read_to_string(temp_dir.path().join("alice/portrait").join(&file_name))
                .unwrap();
        assert_eq!(on_disk, raw);
        assert_eq!(repo.load("alice", &file_name).await.unwrap(), raw);
    }

    #[tokio::test]
    async fn test_load_missing_portrait_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let repo = AsyncDirPortraitRepository::new(UserDirectoryLayout::new(temp_dir.path()));

        let err = repo.load("alice", "missing.txt").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_label_cannot_leave_portrait_dir() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("base");
        let repo = AsyncDirPortraitRepository::new(UserDirectoryLayout::new(&base));

        let err = repo
            .save("alice", "../../../escaped", "portrait")
            .await
            .unwrap_err();

        assert!(err.is_invalid_argument());
        let stray = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("escaped"))
            .count();
        assert_eq!(stray, 0);
    }
}
