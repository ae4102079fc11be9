//! Configuration loading and management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory.
const CONFIG_FILE: &str = "tasks-api.yaml";

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the JSON snapshot file holding the task collection.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            data_path: default_data_path(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/tasks.json")
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default location or fall back to
    /// environment variables and built-in defaults.
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::load(CONFIG_FILE) {
            return config;
        }

        let mut config = Self::default();

        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            config.server.port = port;
        }

        if let Ok(data_path) = std::env::var("TASKS_DATA_PATH") {
            config.server.data_path = PathBuf::from(data_path);
        }

        config
    }

    /// Ensure the snapshot file's directory exists.
    pub fn ensure_data_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.data_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
