use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::agent::AgentConfig;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONFIG_PATH: &str = "config/agent.toml";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key. The key
    /// itself never lives in the config file.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
    pub agent: AgentConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    model: Option<String>,
    base_url: Option<String>,
    api_key_env: Option<String>,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    request_timeout_secs: Option<u64>,
    max_action_rounds: Option<usize>,
}

impl AppConfig {
    /// Loads from an explicit path, or from the default path when present;
    /// a missing default file falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return read_config(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        match read_config(default_path) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("Configuration file not found; using defaults");
                Ok(Self::default())
            }
            Err(other) => Err(other),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            agent: AgentConfig::default(),
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let defaults = AppConfig::default();
    let mut agent = AgentConfig::default();
    if let Some(model) = parsed.model {
        agent.model = model;
    }
    agent.system_prompt = parsed.system_prompt;
    if let Some(temperature) = parsed.temperature {
        agent.temperature = temperature;
    }
    if let Some(max_tokens) = parsed.max_tokens {
        agent.max_tokens = max_tokens;
    }
    if let Some(max_action_rounds) = parsed.max_action_rounds {
        agent.max_action_rounds = max_action_rounds;
    }

    Ok(AppConfig {
        base_url: parsed.base_url.unwrap_or(defaults.base_url),
        api_key_env: parsed.api_key_env.unwrap_or(defaults.api_key_env),
        request_timeout_secs: parsed
            .request_timeout_secs
            .unwrap_or(defaults.request_timeout_secs),
        agent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        let error = AppConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }

    #[test]
    fn reads_model_and_system_prompt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.toml");
        fs::write(
            &path,
            r#"
model = "deepseek-chat"
system_prompt = "keep short"
"#,
        )
        .expect("write config");

        let config = AppConfig::load(Some(&path)).expect("load config");
        assert_eq!(config.agent.model, "deepseek-chat");
        assert_eq!(config.agent.system_prompt.as_deref(), Some("keep short"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key_env, DEFAULT_API_KEY_ENV);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.toml");
        fs::write(&path, "base_url = \"http://localhost:8089\"").expect("write config");

        let config = AppConfig::load(Some(&path)).expect("load config");
        assert_eq!(config.base_url, "http://localhost:8089");
        assert_eq!(config.agent.model, "deepseek-reasoner");
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(config.agent.system_prompt.is_none());
    }

    #[test]
    fn reads_engine_limits_and_sampling() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.toml");
        fs::write(
            &path,
            r#"
temperature = 0.2
max_tokens = 512
request_timeout_secs = 90
max_action_rounds = 3
"#,
        )
        .expect("write config");

        let config = AppConfig::load(Some(&path)).expect("load config");
        assert_eq!(config.agent.temperature, 0.2);
        assert_eq!(config.agent.max_tokens, 512);
        assert_eq!(config.request_timeout_secs, 90);
        assert_eq!(config.agent.max_action_rounds, 3);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.toml");
        fs::write(&path, "model = [not toml").expect("write config");

        let error = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }
}
