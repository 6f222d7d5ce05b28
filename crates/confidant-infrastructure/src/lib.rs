pub mod async_dir_portrait_repository;
pub mod async_dir_transcript_repository;
pub mod catalog;
pub mod config_service;
pub mod paths;
pub mod user_layout;

pub use crate::async_dir_portrait_repository::AsyncDirPortraitRepository;
pub use crate::async_dir_transcript_repository::AsyncDirTranscriptRepository;
pub use crate::catalog::FileCatalog;
pub use crate::config_service::ConfigService;
pub use crate::user_layout::UserDirectoryLayout;
