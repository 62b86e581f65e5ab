//! Configuration management for chatpipe.
//!
//! Configuration is loaded from `~/.config/chatpipe/config.toml` when present.
//! Every key is optional; command-line flags and environment variables win.

use crate::error::ChatpipeError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable consulted when `--api-key` is absent.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Model identifier (default: gpt-4o).
    #[serde(default = "default_model")]
    pub model: String,
    /// Completion token limit (default: 4000).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API base URL, without the `/chat/completions` suffix.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// API key (prefer OPENAI_API_KEY env var).
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("chatpipe"))
            .context("Could not determine config directory")
    }

    /// Get the default config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// location is tried and defaults are used if nothing is there.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = match Self::config_path() {
                    Ok(path) => path,
                    // No home/config dir at all (e.g. minimal containers).
                    Err(_) => return Ok(Self::default()),
                };
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Pick the credential: flag, then environment, then config file.
///
/// Empty strings are treated as absent.
pub fn resolve_api_key(
    flag: Option<&str>,
    env: Option<&str>,
    config: &Config,
) -> Result<String, ChatpipeError> {
    [flag, env, config.api_key.as_deref()]
        .into_iter()
        .flatten()
        .find(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or(ChatpipeError::MissingApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_deserialization_partial() {
        let toml = r#"
model = "gpt-4o-mini"
timeout_secs = 30
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"sk-from-file\"\nmax_tokens = 256").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-from-file"));
        assert_eq!(config.max_tokens, 256);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_tokens = \"lots\"").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_flag_beats_env_and_config() {
        let config = Config {
            api_key: Some("sk-config".to_string()),
            ..Config::default()
        };
        let key = resolve_api_key(Some("sk-flag"), Some("sk-env"), &config).unwrap();
        assert_eq!(key, "sk-flag");
    }

    #[test]
    fn test_env_used_when_no_flag() {
        let key = resolve_api_key(None, Some("sk-env"), &Config::default()).unwrap();
        assert_eq!(key, "sk-env");
    }

    #[test]
    fn test_config_key_is_last_resort() {
        let config = Config {
            api_key: Some("sk-config".to_string()),
            ..Config::default()
        };
        let key = resolve_api_key(None, None, &config).unwrap();
        assert_eq!(key, "sk-config");
    }

    #[test]
    fn test_missing_key() {
        let err = resolve_api_key(None, None, &Config::default()).unwrap_err();
        assert!(matches!(err, ChatpipeError::MissingApiKey));
        assert_eq!(
            err.to_string(),
            "Error: API key is required either as an argument or in the OPENAI_API_KEY environment variable."
        );
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let err = resolve_api_key(Some(""), Some(""), &Config::default()).unwrap_err();
        assert!(matches!(err, ChatpipeError::MissingApiKey));
    }
}
