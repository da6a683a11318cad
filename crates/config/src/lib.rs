//! Configuration for InfoAgent.
//!
//! Settings come from `~/.infoagent/config.toml`, with environment
//! variables filling any key the file leaves unset. The file always
//! wins over the environment.

use infoagent_core::ToolDispatch;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything configurable, mirroring `~/.infoagent/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API key for the web_search tool (Tavily)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_api_key: Option<String>,

    /// LLM provider
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier, as the provider names it
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per model response (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Model invocations allowed per question
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// What to do when one response requests several tool calls
    #[serde(default)]
    pub tool_dispatch: ToolDispatch,
}

fn default_provider() -> String {
    "openrouter".into()
}
fn default_model() -> String {
    "meta-llama/llama-3.1-8b-instruct".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_iterations() -> u32 {
    5
}

/// Secrets never appear in Debug output, only a redaction marker.
fn redact(secret: &Option<String>) -> &'static str {
    if secret.is_some() {
        "[REDACTED]"
    } else {
        "None"
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("search_api_key", &redact(&self.search_api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_iterations", &self.max_iterations)
            .field("tool_dispatch", &self.tool_dispatch)
            .finish()
    }
}

impl AppConfig {
    /// Load from the default path, `~/.infoagent/config.toml`.
    ///
    /// Keys the file leaves unset fall back to the environment:
    /// - model key: `INFOAGENT_API_KEY`, then `OPENROUTER_API_KEY`
    /// - search key: `INFOAGENT_SEARCH_API_KEY`, then `TAVILY_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&path)?;

        if config.api_key.is_none() {
            config.api_key = env_fallback("INFOAGENT_API_KEY", "OPENROUTER_API_KEY");
        }
        if config.search_api_key.is_none() {
            config.search_api_key = env_fallback("INFOAGENT_SEARCH_API_KEY", "TAVILY_API_KEY");
        }

        Ok(config)
    }

    /// Load and validate one specific file. A missing file is not an
    /// error; it just means defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file at {}, falling back to defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let parsed: Self = toml::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Directory holding the config file.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".infoagent")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model must not be empty".into(),
            ));
        }

        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "max_iterations must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Is a model API key available, from file or environment?
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Render the defaults as TOML, for a starter config file.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            search_api_key: None,
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            max_iterations: default_max_iterations(),
            tool_dispatch: ToolDispatch::default(),
        }
    }
}

/// First environment variable that is set, of the two names.
fn env_fallback(primary: &str, secondary: &str) -> Option<String> {
    std::env::var(primary)
        .ok()
        .or_else(|| std::env::var(secondary).ok())
}

/// Home directory, with a writable fallback when unset.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// What can go wrong while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_pass_validation() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "openrouter");
        assert_eq!(config.model, "meta-llama/llama-3.1-8b-instruct");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.tool_dispatch, ToolDispatch::All);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_roundtrip_preserves_settings() {
        let config = AppConfig {
            max_tokens: Some(512),
            tool_dispatch: ToolDispatch::First,
            ..AppConfig::default()
        };
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.max_tokens, Some(512));
        assert_eq!(parsed.tool_dispatch, ToolDispatch::First);
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_model_is_rejected() {
        let config = AppConfig {
            model: "  ".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let config = AppConfig {
            max_iterations: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn absent_file_means_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.provider, "openrouter");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"sk-or-test\"").unwrap();
        writeln!(file, "tool_dispatch = \"first\"").unwrap();
        file.flush().unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-or-test"));
        assert_eq!(config.tool_dispatch, ToolDispatch::First);
        assert_eq!(config.model, "meta-llama/llama-3.1-8b-instruct");
        assert_eq!(config.max_iterations, 5);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_iterations = \"lots\"").unwrap();
        file.flush().unwrap();

        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let config = AppConfig {
            api_key: Some("sk-or-secret-key".into()),
            search_api_key: Some("tvly-secret-key".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn starter_toml_names_every_knob() {
        let rendered = AppConfig::default_toml();
        assert!(rendered.contains("openrouter"));
        assert!(rendered.contains("meta-llama/llama-3.1-8b-instruct"));
        assert!(rendered.contains("tool_dispatch"));
        assert!(rendered.contains("max_iterations"));
    }
}
