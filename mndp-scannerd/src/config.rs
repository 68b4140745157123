use std::path::Path;
use serde::Deserialize;
use anyhow::{Context, Result};
use shared::codec::MacAddress;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub announce: AnnounceConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// What this host says about itself in its beacons
#[derive(Debug, Clone, Deserialize)]
pub struct AnnounceConfig {
    pub mac_address: MacAddress,
    /// Falls back to the system hostname
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_software_id")]
    pub software_id: String,
    #[serde(default = "default_board")]
    pub board: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_version() -> String {
    "0.0.2".to_string()
}

fn default_platform() -> String {
    "MikroTik".to_string()
}

fn default_software_id() -> String {
    "SHT1-SHT2".to_string()
}

fn default_board() -> String {
    "RPI-3".to_string()
}

fn default_listen() -> String {
    "0.0.0.0:5678".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }
}
