//! Enumeration of a user's persisted transcripts and portraits.

use crate::user_layout::UserDirectoryLayout;
use confidant_core::naming::is_persisted_file_name;
use confidant_core::{ConfidantError, Result};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Lists persisted files for a user, sorted by name.
///
/// Names embed a `YYYYMMDD_HHMMSS` timestamp, so the last entry is the most
/// recent one.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    layout: UserDirectoryLayout,
}

impl FileCatalog {
    pub fn new(layout: UserDirectoryLayout) -> Self {
        Self { layout }
    }

    /// Base names of all `*.txt` files under `history/`, ascending.
    ///
    /// A user without prior activity yields an empty list.
    pub async fn list_history_files(&self, user_id: &str) -> Result<Vec<String>> {
        list_txt_files(&self.layout.history_dir(user_id)?).await
    }

    /// Base names of all `*.txt` files under `portrait/`, ascending.
    pub async fn list_portrait_files(&self, user_id: &str) -> Result<Vec<String>> {
        list_txt_files(&self.layout.portrait_dir(user_id)?).await
    }

    /// Most recent transcript, suggested as the default selection.
    pub async fn latest_history_file(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.list_history_files(user_id).await?.pop())
    }

    /// Most recent portrait, suggested as the default selection.
    pub async fn latest_portrait_file(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.list_portrait_files(user_id).await?.pop())
    }
}

async fn list_txt_files(dir: &Path) -> Result<Vec<String>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ConfidantError::storage(dir, e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ConfidantError::storage(dir, e))?
    {
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_persisted_file_name(name) {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}
