//! Client configuration and factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http::HttpLearningApi;

/// Base URL used in development when none is configured.
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:5000/api";

/// Which deployment the client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// The `[api]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the EduQuest API, including the `/api` prefix.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// Top-level eduquest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EduquestConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub api: ApiConfig,
    /// Where the session store lives.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
    /// Delay between scripted upload progress steps, in milliseconds.
    #[serde(default = "default_progress_step")]
    pub progress_step_ms: u64,
    /// Interval of the notes progress ticker, in milliseconds.
    #[serde(default = "default_notes_tick")]
    pub notes_tick_ms: u64,
}

fn default_timeout() -> u64 {
    120
}
fn default_session_path() -> PathBuf {
    PathBuf::from(".eduquest-session.json")
}
fn default_progress_step() -> u64 {
    1000
}
fn default_notes_tick() -> u64 {
    500
}

impl Default for EduquestConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            api: ApiConfig::default(),
            session_path: default_session_path(),
            progress_step_ms: default_progress_step(),
            notes_tick_ms: default_notes_tick(),
        }
    }
}

impl EduquestConfig {
    /// The base URL to use. Development falls back to the local server;
    /// production has no fallback.
    pub fn base_url(&self) -> Result<String> {
        match (&self.api.base_url, self.environment) {
            (Some(url), _) if !url.trim().is_empty() => {
                Ok(url.trim().trim_end_matches('/').to_string())
            }
            (_, Environment::Development) => Ok(DEVELOPMENT_BASE_URL.to_string()),
            (_, Environment::Production) => {
                anyhow::bail!("api.base_url must be set when environment = \"production\"")
            }
        }
    }

    pub fn progress_step(&self) -> Duration {
        Duration::from_millis(self.progress_step_ms)
    }

    pub fn notes_tick(&self) -> Duration {
        Duration::from_millis(self.notes_tick_ms)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Substituted values are copied as-is and never scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `eduquest.toml` in the current directory
/// 2. `~/.config/eduquest/config.toml`
///
/// Environment variable override: `EDUQUEST_API_URL`.
pub fn load_config_from(path: Option<&Path>) -> Result<EduquestConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("eduquest.toml");
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
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EduquestConfig::default(),
    };

    if let Ok(url) = std::env::var("EDUQUEST_API_URL") {
        if !url.trim().is_empty() {
            config.api.base_url = Some(url);
        }
    }

    Ok(config)
}

/// Parse a TOML config string and resolve `${VAR}` references in it.
pub fn parse_config(content: &str) -> Result<EduquestConfig> {
    let mut config: EduquestConfig = toml::from_str(content)?;
    config.api.base_url = config.api.base_url.as_deref().map(resolve_env_vars);
    config.session_path = PathBuf::from(resolve_env_vars(&config.session_path.to_string_lossy()));
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("eduquest"))
}

/// Create the HTTP API client described by the configuration.
pub fn create_api(config: &EduquestConfig) -> Result<HttpLearningApi> {
    let base_url = config.base_url()?;
    HttpLearningApi::new(&base_url, Duration::from_secs(config.api.timeout_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_EDUQUEST_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_EDUQUEST_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_EDUQUEST_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_EDUQUEST_TEST_VAR");
    }

    #[test]
    fn resolved_values_are_not_rescanned() {
        std::env::set_var("_EDUQUEST_SELF_REF", "${_EDUQUEST_SELF_REF}");
        assert_eq!(
            resolve_env_vars("url=${_EDUQUEST_SELF_REF}/api"),
            "url=${_EDUQUEST_SELF_REF}/api"
        );
        std::env::remove_var("_EDUQUEST_SELF_REF");

        assert_eq!(resolve_env_vars("open ${UNTERMINATED"), "open ${UNTERMINATED");
    }

    #[test]
    fn default_config() {
        let config = EduquestConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.base_url().unwrap(), DEVELOPMENT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 120);
        assert_eq!(config.progress_step(), Duration::from_secs(1));
        assert_eq!(config.notes_tick(), Duration::from_millis(500));
    }

    #[test]
    fn production_requires_base_url() {
        let config = parse_config("environment = \"production\"\n").unwrap();
        assert!(config.base_url().is_err());

        let config = parse_config(
            r#"
environment = "production"

[api]
base_url = "https://learn.example.com/api/"
"#,
        )
        .unwrap();
        assert_eq!(config.base_url().unwrap(), "https://learn.example.com/api");
    }

    #[test]
    fn parse_full_config() {
        std::env::set_var("_EDUQUEST_TEST_HOST", "api.internal");
        let config = parse_config(
            r#"
session_path = "/tmp/eq-session.json"
progress_step_ms = 0
notes_tick_ms = 50

[api]
base_url = "http://${_EDUQUEST_TEST_HOST}:8084/api"
timeout_secs = 30
"#,
        )
        .unwrap();
        std::env::remove_var("_EDUQUEST_TEST_HOST");

        assert_eq!(config.base_url().unwrap(), "http://api.internal:8084/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session_path, PathBuf::from("/tmp/eq-session.json"));
        assert_eq!(config.progress_step(), Duration::ZERO);
    }

    #[test]
    fn explicit_missing_path_fails() {
        let err = load_config_from(Some(Path::new("/no/such/eduquest.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
