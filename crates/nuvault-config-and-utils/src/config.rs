//! Configuration management for the client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default backend URL (can be overridden at compile time via NUVAULT_API_URL env var).
pub const DEFAULT_API_URL: &str = match option_env!("NUVAULT_API_URL") {
    Some(url) => url,
    None => "https://nuvault-backend.onrender.com/api",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Base URL of the password service, including the `/api` prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_url: default_api_url(),
        }
    }
}

impl Config {
    /// Resolve the effective configuration.
    ///
    /// Order: built-in defaults, then `config.json` if present, then the
    /// `NUVAULT_LOG_LEVEL` / `NUVAULT_API_URL` environment variables. The
    /// resulting API URL is validated before returning.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let file = paths.config_file();
        let mut config = if file.exists() {
            Self::load_from_file(&file)?
        } else {
            Self::default()
        };

        config.apply_env();
        config.api_url()?;
        Ok(config)
    }

    /// Parse a config file. Missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }

    /// Write `config.json`, creating the base directory if needed.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        std::fs::write(paths.config_file(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Some(log_level) = non_empty_env("NUVAULT_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(api_url) = non_empty_env("NUVAULT_API_URL") {
            self.api_url = api_url;
        }
    }

    /// Get the API URL as a parsed URL.
    ///
    /// Only `http` and `https` schemes are accepted.
    pub fn api_url(&self) -> CoreResult<Url> {
        let url = Url::parse(&self.api_url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CoreError::Config(format!(
                "Unsupported API URL scheme: {}",
                other
            ))),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_config(paths: &Paths, json: &str) {
        paths.ensure_dirs().unwrap();
        std::fs::write(paths.config_file(), json).unwrap();
    }

    #[test]
    fn test_defaults_point_at_hosted_backend() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.api_url().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        write_config(&paths, r#"{ "log_level": "debug" }"#);

        let config = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_file_can_target_local_backend() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        write_config(&paths, r#"{ "api_url": "http://localhost:3000/api" }"#);

        let config = Config::load_from_file(&paths.config_file()).unwrap();
        let url = config.api_url().unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(3000));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        write_config(&paths, "{ log_level = debug }");

        assert!(matches!(
            Config::load_from_file(&paths.config_file()),
            Err(CoreError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_loads() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("fresh"));
        assert!(Config::load(&paths).is_ok());
        assert!(!paths.config_file().exists());
    }

    #[test]
    fn test_save_then_reload() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("nested"));

        let config = Config {
            log_level: "trace".to_string(),
            api_url: "http://127.0.0.1:8080/api".to_string(),
        };
        config.save(&paths).unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded.log_level, config.log_level);
        assert_eq!(loaded.api_url, config.api_url);
    }

    #[test]
    fn test_api_url_validation() {
        for (raw, ok) in [
            ("https://nuvault.example/api", true),
            ("http://10.0.2.2:3000/api", true),
            ("ftp://example.com/api", false),
            ("nuvault-backend/api", false),
        ] {
            let config = Config {
                api_url: raw.to_string(),
                ..Config::default()
            };
            assert_eq!(config.api_url().is_ok(), ok, "url {raw}");
        }
    }
}
