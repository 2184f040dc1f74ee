//! Configuration loading and validation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default agent endpoint.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000/a2ui";

/// Default number of inspector log entries a session keeps.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,
}

/// Where and how to reach the agent server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Whole-request timeout in seconds. Unset means no timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Extra headers sent with every request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "a2ui_client=debug").
    #[serde(default)]
    pub filters: Vec<String>,

    /// Output target: "stderr" (default) or "stdout".
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_format() -> String {
    "plain".into()
}

fn default_log_output() -> String {
    "stderr".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: None,
            filters: Vec::new(),
            output: default_log_output(),
        }
    }
}

/// Surface retention and inspector settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Cap on retained surfaces. Unset keeps every surface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_surfaces: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

fn substitute_env_vars(input: &str) -> String {
    let Ok(re) = regex::Regex::new(r"\$\{([^}]+)\}") else {
        return input.to_string();
    };
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::A2uiError::Io)?;
        Self::parse(&raw)
    }

    /// Parse config text (JSON5) after env substitution.
    pub fn parse(raw: &str) -> crate::error::Result<Self> {
        let substituted = substitute_env_vars(raw);

        let config: Config = json5::from_str(&substituted)
            .map_err(|e| crate::error::A2uiError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Default config file location.
    pub fn default_path() -> PathBuf {
        data_dir().join("config.json")
    }

    pub fn server_url(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.server
            .as_ref()
            .and_then(|s| s.timeout_secs)
            .map(std::time::Duration::from_secs)
    }

    pub fn headers(&self) -> BTreeMap<String, String> {
        self.server
            .as_ref()
            .map(|s| s.headers.clone())
            .unwrap_or_default()
    }

    pub fn max_surfaces(&self) -> Option<usize> {
        self.store.as_ref().and_then(|s| s.max_surfaces)
    }

    pub fn history_limit(&self) -> usize {
        self.store
            .as_ref()
            .and_then(|s| s.history_limit)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Check the config for problems. Returns `(warnings, errors)`.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        let url = self.server_url();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("Server URL '{url}' must use http:// or https://"));
        }

        if let Some(0) = self.request_timeout().map(|t| t.as_secs()) {
            warnings.push("server.timeout_secs is 0; every request will time out".to_string());
        }

        if self.max_surfaces() == Some(0) {
            errors.push("store.max_surfaces must be at least 1".to_string());
        }

        if self.history_limit() == 0 {
            warnings.push("store.history_limit is 0; the inspector log will stay empty".to_string());
        }

        if let Some(logging) = &self.logging {
            if logging.format != "plain" && logging.format != "json" {
                warnings.push(format!(
                    "Unknown logging.format '{}'; falling back to plain",
                    logging.format
                ));
            }
            if logging.output != "stderr" && logging.output != "stdout" {
                warnings.push(format!(
                    "Unknown logging.output '{}'; falling back to stderr",
                    logging.output
                ));
            }
        }

        (warnings, errors)
    }
}

/// Base directory for client state.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".a2ui")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_substitution() {
        // SAFETY: test-only, variable name unique to this test
        unsafe { std::env::set_var("A2UI_TEST_TOKEN", "secret") };
        let out = substitute_env_vars(r#"{"token": "${A2UI_TEST_TOKEN}"}"#);
        assert_eq!(out, r#"{"token": "secret"}"#);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_url(), DEFAULT_SERVER_URL);
        assert_eq!(config.history_limit(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.max_surfaces(), None);
        assert!(config.request_timeout().is_none());
        let (warnings, errors) = config.validate();
        assert!(warnings.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_json5_parse() {
        let config = Config::parse(
            r#"{
                // comments are allowed
                server: { url: "https://agent.local/a2ui", timeout_secs: 30, headers: { "x-team": "ui" } },
                store: { max_surfaces: 4 },
                logging: { format: "json", filters: ["a2ui_client=debug"] },
            }"#,
        )
        .unwrap();
        assert_eq!(config.server_url(), "https://agent.local/a2ui");
        assert_eq!(config.request_timeout().map(|d| d.as_secs()), Some(30));
        assert_eq!(config.headers().get("x-team").map(String::as_str), Some("ui"));
        assert_eq!(config.max_surfaces(), Some(4));
        let logging = config.logging();
        assert_eq!(logging.format, "json");
        assert_eq!(logging.output, "stderr");
        assert_eq!(logging.filters, vec!["a2ui_client=debug".to_string()]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            server: Some(ServerConfig {
                url: Some("ftp://nope".into()),
                ..Default::default()
            }),
            store: Some(StoreConfig {
                max_surfaces: Some(0),
                history_limit: None,
            }),
            logging: Some(LoggingConfig {
                format: "xml".into(),
                ..Default::default()
            }),
        };
        let (warnings, errors) = config.validate();
        assert_eq!(errors.len(), 2);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert!(config.server.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ store: { history_limit: 10 } }"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.history_limit(), 10);
    }

    #[test]
    fn test_load_invalid_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, crate::error::A2uiError::Config(_)));
    }
}
