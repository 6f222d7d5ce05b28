//! File naming rules for persisted transcripts and portraits.
//!
//! Names embed a `YYYYMMDD_HHMMSS` local timestamp, so sorting names
//! lexicographically also sorts them chronologically.

use crate::error::{ConfidantError, Result};
use chrono::{DateTime, Local};

/// Subdirectory of a user root that holds transcripts.
pub const HISTORY_DIR: &str = "history";
/// Subdirectory of a user root that holds portraits.
pub const PORTRAIT_DIR: &str = "portrait";
/// Prefix of every transcript file name.
pub const TRANSCRIPT_PREFIX: &str = "history";
/// Default prefix of portrait file names.
pub const DEFAULT_PORTRAIT_LABEL: &str = "user_portrait";
/// Extension shared by transcripts and portraits.
pub const FILE_EXTENSION: &str = "txt";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Formats `at` with second resolution, e.g. `20240131_235959`.
pub fn file_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// `history_<timestamp>.txt`
pub fn transcript_file_name(at: DateTime<Local>) -> String {
    format!(
        "{}_{}.{}",
        TRANSCRIPT_PREFIX,
        file_timestamp(at),
        FILE_EXTENSION
    )
}

/// `<label>_<timestamp>.txt`
pub fn portrait_file_name(label: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.{}", label, file_timestamp(at), FILE_EXTENSION)
}

/// Rejects values that cannot be used as a single path component.
///
/// Empty values, `.`, `..`, and anything containing a path separator would
/// escape the directory they are joined onto.
pub fn validate_segment(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfidantError::invalid_argument(format!("no {what} specified")));
    }
    if value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(ConfidantError::invalid_argument(format!(
            "{what} must not contain path separators: '{value}'"
        )));
    }
    Ok(())
}

/// Whether `name` has the persisted-file extension.
pub fn is_persisted_file_name(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        == Some(FILE_EXTENSION)
}
