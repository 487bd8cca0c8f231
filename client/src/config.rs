use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/predict";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Classifier route that accepts the multipart upload.
    pub endpoint: String,
    /// Name of the multipart field carrying the image.
    pub file_field: String,
    pub request_timeout_secs: u64,
    /// Delay before the simulated classifier answers.
    pub simulated_latency_ms: u64,
    /// Start in simulated mode instead of live mode.
    pub simulate: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            file_field: "file".to_string(),
            request_timeout_secs: 30,
            simulated_latency_ms: 2000,
            simulate: false,
        }
    }
}

impl ClientConfig {
    /// Reads the YAML file if one is given, then applies `SKINSCAN_*`
    /// environment overrides (including those from a `.env` file).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: ClientConfig = serde_yaml::from_str(&config_str)?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(endpoint) = var("SKINSCAN_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(field) = var("SKINSCAN_FILE_FIELD") {
            self.file_field = field;
        }
        if let Some(timeout) = var("SKINSCAN_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_number("SKINSCAN_REQUEST_TIMEOUT_SECS", timeout)?;
        }
        if let Some(latency) = var("SKINSCAN_SIMULATED_LATENCY_MS") {
            self.simulated_latency_ms = parse_number("SKINSCAN_SIMULATED_LATENCY_MS", latency)?;
        }
        Ok(self)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

fn parse_number(name: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value })
}
