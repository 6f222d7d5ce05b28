use clap::Parser;
use confidant_core::config::AppConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "confidant")]
#[command(about = "Confidant - counseling sessions with saved transcripts and user portraits", long_about = None)]
pub struct Args {
    /// User whose session to open
    #[arg(short, long)]
    pub user: Option<String>,

    /// Directory holding one folder per user
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Configuration file (defaults to ~/.config/confidant/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// OpenAI-compatible base URL, e.g. http://localhost:8000/v1
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model name sent with each request
    #[arg(short, long)]
    pub model: Option<String>,
}

impl Args {
    /// Command-line values win over the configuration file.
    pub fn apply_to(&self, mut config: AppConfig) -> AppConfig {
        if let Some(user) = &self.user {
            config.user_id = user.clone();
        }
        if let Some(base_dir) = &self.base_dir {
            config.base_dir = Some(base_dir.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.generation.endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model {
            config.generation.model = model.clone();
        }
        config
    }
}
