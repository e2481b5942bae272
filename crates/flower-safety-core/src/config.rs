use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::classifier::flower_check::DEFAULT_ENDPOINT;

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "FLOWER_SAFETY_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub endpoint: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self { endpoint: None }
    }

    /// Load `config.json` from the user config directory, or defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Endpoint to use: environment first, then the config file, then the default
    pub fn resolve_endpoint(&self) -> String {
        let from_env = std::env::var(ENDPOINT_ENV).ok();
        self.endpoint_with(from_env)
    }

    fn endpoint_with(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.endpoint.clone().filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("flower-safety").join("config.json"))
    }
}
