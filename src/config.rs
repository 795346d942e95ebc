//! Configuration loading and persistence.
//!
//! Handles reading and writing the clientprojet configuration file and
//! applying environment variable overrides on top of it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;
use std::{fs, path::PathBuf};

use crate::constants;

/// Configuration for the communication layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the project API. Operation paths are appended to it.
    pub server_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Number of background worker threads for non-blocking communications.
    pub worker_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: constants::DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: constants::HTTP_REQUEST_TIMEOUT.as_secs(),
            worker_threads: constants::MAX_CONCURRENT_COMMUNICATIONS,
        }
    }
}

impl Config {
    /// Returns the configuration directory path, creating it if necessary.
    ///
    /// `CLIENTPROJET_CONFIG_DIR` takes priority over the platform config
    /// directory (`~/.config/clientprojet` on Linux).
    pub fn config_dir() -> Result<PathBuf> {
        let dir = if let Ok(dir) = std::env::var("CLIENTPROJET_CONFIG_DIR") {
            PathBuf::from(dir)
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("clientprojet")
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        Ok(dir)
    }

    /// Loads configuration from file, with environment variable overrides.
    ///
    /// A missing or unreadable file falls back to defaults.
    pub fn load() -> Result<Self> {
        let mut config = match Self::load_from_file() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Using default configuration: {e:#}");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_from_file() -> Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Ok(serde_json::from_str(&content).context("Invalid config.json")?)
        } else {
            anyhow::bail!("Config file not found")
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(server_url) = std::env::var("CLIENTPROJET_SERVER_URL") {
            self.server_url = server_url;
        }

        if let Ok(timeout) = std::env::var("CLIENTPROJET_TIMEOUT") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.request_timeout_secs = secs;
            }
        }

        if let Ok(workers) = std::env::var("CLIENTPROJET_WORKERS") {
            if let Ok(count) = workers.parse::<usize>() {
                self.worker_threads = count;
            }
        }
    }

    /// Persists the current configuration to disk.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_dir()?.join("config.json");
        fs::write(&config_path, serde_json::to_string_pretty(self)?)?;

        // Set restrictive permissions (owner read/write only)
        #[cfg(unix)]
        fs::set_permissions(&config_path, fs::Permissions::from_mode(0o600))?;

        Ok(())
    }

    /// Request timeout as a [`Duration`]. Zero is bumped to one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Worker pool size, never below one.
    pub fn worker_count(&self) -> usize {
        self.worker_threads.max(1)
    }

    /// Server URL guaranteed to end with `/` so relative paths join cleanly.
    pub fn normalized_server_url(&self) -> String {
        if self.server_url.ends_with('/') {
            self.server_url.clone()
        } else {
            format!("{}/", self.server_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        std::env::remove_var("CLIENTPROJET_SERVER_URL");
        std::env::remove_var("CLIENTPROJET_TIMEOUT");
        std::env::remove_var("CLIENTPROJET_WORKERS");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:8080/api/");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.worker_threads, 16);
    }

    #[test]
    fn test_load_falls_back_to_defaults_without_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::env::set_var("CLIENTPROJET_CONFIG_DIR", temp_dir.path());
        clear_env();

        let config = Config::load().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load_from_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::env::set_var("CLIENTPROJET_CONFIG_DIR", temp_dir.path());
        clear_env();

        let config = Config {
            server_url: "https://projects.example.com/api/".to_string(),
            request_timeout_secs: 30,
            worker_threads: 4,
        };
        config.save().unwrap();

        assert!(temp_dir.path().join("config.json").exists());
        assert_eq!(Config::load().unwrap(), config);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::env::set_var("CLIENTPROJET_CONFIG_DIR", temp_dir.path());
        clear_env();

        Config::default().save().unwrap();
        std::env::set_var("CLIENTPROJET_SERVER_URL", "http://10.0.0.2:9000");
        std::env::set_var("CLIENTPROJET_TIMEOUT", "3");
        std::env::set_var("CLIENTPROJET_WORKERS", "not-a-number");

        let config = Config::load().unwrap();
        clear_env();

        assert_eq!(config.server_url, "http://10.0.0.2:9000");
        assert_eq!(config.request_timeout_secs, 3);
        // Unparseable override is ignored
        assert_eq!(config.worker_threads, 16);
    }

    #[test]
    fn test_normalized_server_url_appends_slash() {
        let mut config = Config::default();
        config.server_url = "http://host/api".to_string();
        assert_eq!(config.normalized_server_url(), "http://host/api/");

        config.server_url = "http://host/api/".to_string();
        assert_eq!(config.normalized_server_url(), "http://host/api/");
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let config = Config {
            server_url: String::new(),
            request_timeout_secs: 0,
            worker_threads: 0,
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
        assert_eq!(config.worker_count(), 1);
    }
}
