//! Client configuration and backend factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizflow_core::session::SessionConfig;
use quizflow_core::traits::Level;

use crate::http::{HttpBackend, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Top-level quizflow configuration.
///
/// Note: Custom Debug impl masks the token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the quiz backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request. Supports `${ENV_VAR}`.
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Quiet interval before progress is autosaved.
    #[serde(default = "default_debounce")]
    pub autosave_debounce_ms: u64,
    /// Difficulty used when `take` is given none.
    #[serde(default = "default_level")]
    pub default_level: Level,
    /// Question count used when `take` is given none.
    #[serde(default = "default_questions")]
    pub default_questions: u32,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("autosave_debounce_ms", &self.autosave_debounce_ms)
            .field("default_level", &self.default_level)
            .field("default_questions", &self.default_questions)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_debounce() -> u64 {
    700
}
fn default_level() -> Level {
    Level::Medium
}
fn default_questions() -> u32 {
    5
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout(),
            autosave_debounce_ms: default_debounce(),
            default_level: default_level(),
            default_questions: default_questions(),
        }
    }
}

impl ClientConfig {
    /// Session settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            autosave_debounce: Duration::from_millis(self.autosave_debounce_ms),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizflow.toml` in the current directory
/// 2. `~/.config/quizflow/config.toml`
///
/// Environment variable overrides: `QUIZFLOW_BASE_URL`, `QUIZFLOW_TOKEN`.
pub fn load_config() -> Result<ClientConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizflow.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ClientConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClientConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url) = std::env::var("QUIZFLOW_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(token) = std::env::var("QUIZFLOW_TOKEN") {
        config.token = Some(token);
    }

    config.base_url = resolve_env_vars(&config.base_url);
    config.token = config
        .token
        .as_deref()
        .map(resolve_env_vars)
        .filter(|t| !t.is_empty());

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizflow"))
}

/// Create an HTTP backend from the configuration.
pub fn create_backend(config: &ClientConfig) -> Result<HttpBackend> {
    HttpBackend::new(&config.base_url, config.token.clone(), config.timeout_secs)
        .with_context(|| format!("failed to create backend for {}", config.base_url))
}
