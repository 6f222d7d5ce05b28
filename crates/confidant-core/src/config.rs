use crate::error::{ConfidantError, Result};
use crate::naming::{DEFAULT_PORTRAIT_LABEL, validate_segment};
use crate::session::DEFAULT_INSTRUCTION;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User id used when none is configured.
pub const DEFAULT_USER_ID: &str = "cli_user";

const DEFAULT_ENDPOINT: &str = "http://localhost:8000/v1";
const DEFAULT_MODEL: &str = "PsyBPLLM";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Root of `config.toml`.
///
/// Every field has a default, so an empty or missing file is a valid
/// configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// User whose session the REPL drives.
    pub user_id: String,
    /// Root holding one directory per user. Platform data dir when unset.
    pub base_dir: Option<PathBuf>,
    /// Prefix of generated portrait file names.
    pub portrait_label: String,
    /// Replaces the built-in leading instruction for new sessions.
    pub system_prompt: Option<String>,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
    pub generation: GenerationSettings,
    pub chat_sampling: SamplingSettings,
    pub portrait_sampling: SamplingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            base_dir: None,
            portrait_label: DEFAULT_PORTRAIT_LABEL.to_string(),
            system_prompt: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            generation: GenerationSettings::default(),
            chat_sampling: SamplingSettings::chat(),
            portrait_sampling: SamplingSettings::portrait(),
        }
    }
}

impl AppConfig {
    /// Checks the values that become path components under the user-data base.
    ///
    /// # Errors
    ///
    /// `Config` when `user_id` or `portrait_label` is empty or could escape
    /// its directory.
    pub fn validate(&self) -> Result<()> {
        validate_segment("user id", &self.user_id)
            .and_then(|()| validate_segment("portrait label", &self.portrait_label))
            .map_err(|err| match err {
                ConfidantError::InvalidArgument(message) => ConfidantError::config(message),
                other => other,
            })
    }

    /// Leading instruction for new sessions.
    pub fn leading_instruction(&self) -> &str {
        self.system_prompt
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_INSTRUCTION)
    }
}

/// Connection settings for the OpenAI-compatible generation endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    /// Base URL up to and including `/v1`.
    pub endpoint: String,
    pub model: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            request_timeout_secs: 600,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SamplingSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl SamplingSettings {
    /// Sampled decoding for live chat turns.
    pub fn chat() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.8,
            top_p: 0.95,
        }
    }

    /// Greedy decoding for portraits, so the same transcript yields the same portrait.
    pub fn portrait() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.0,
            top_p: 1.0,
        }
    }
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self::chat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.user_id, "cli_user");
        assert_eq!(config.portrait_sampling.max_tokens, 2048);
        assert_eq!(config.chat_sampling.max_tokens, 1024);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            user_id = "alice"

            [generation]
            model = "qwen2.5-7b-instruct"
            "#,
        )
        .unwrap();
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.generation.model, "qwen2.5-7b-instruct");
        assert_eq!(config.generation.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.portrait_label, "user_portrait");
    }

    #[test]
    fn test_leading_instruction_override() {
        let mut config = AppConfig::default();
        assert_eq!(config.leading_instruction(), DEFAULT_INSTRUCTION);

        config.system_prompt = Some("   ".to_string());
        assert_eq!(config.leading_instruction(), DEFAULT_INSTRUCTION);

        config.system_prompt = Some("Be brief.".to_string());
        assert_eq!(config.leading_instruction(), "Be brief.");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unusable_user_id_is_rejected() {
        for user_id in ["", "a/b", ".."] {
            let config = AppConfig {
                user_id: user_id.to_string(),
                ..AppConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Config, "{user_id:?}");
        }
    }

    #[test]
    fn test_escaping_portrait_label_is_rejected() {
        let config: AppConfig = toml::from_str(r#"portrait_label = "../../../escaped""#).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: portrait label must not contain path separators: '../../../escaped'"
        );
    }
}
