use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::analytics::DEFAULT_WINDOW;
use crate::error::ConfigError;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bind_addr: String,
    pub model_dir: PathBuf,
    pub model_path: Option<PathBuf>,
    pub log_predictions: bool,
    pub history_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            model_dir: PathBuf::from("."),
            model_path: None,
            log_predictions: false,
            history_window: DEFAULT_WINDOW,
        }
    }
}

impl Config {
    /// Reads a JSON config file; missing keys keep their defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(path),
            source,
        })
    }

    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Environment variables win over whatever is already set.
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(addr) = get("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(dir) = get("MODEL_DIR") {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(path) = get("MODEL_PATH") {
            self.model_path = Some(PathBuf::from(path));
        }
        if let Some(flag) = get("LOG_PRED") {
            self.log_predictions = flag == "1";
        }
        if let Some(window) = get("ANALYTICS_WINDOW").and_then(|s| s.parse().ok()) {
            self.history_window = window;
        }
        self
    }
}
