use lazy_static::lazy_static;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_BASE_ORIGIN: &str = "http://localhost:8000";
pub const DEFAULT_DISCOVERY_PATH: &str = "/api/steps";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub base_origin: Option<String>,
    pub discovery_path: Option<String>,
    pub server_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub encode_parameters: Option<bool>,
    pub latest_response_only: Option<bool>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("could not read config file {}: {}", path.display(), e))?;
        // An empty file deserializes to unit, not to a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config file {}: {}", path.display(), e))
    }

    /// Loads `path` when it exists, otherwise falls back to the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::from_file(path).unwrap_or_else(|e| {
            eprintln!("{}. Falling back to the default configuration.", e);
            Self::default()
        })
    }

    pub fn base_origin(&self) -> &str {
        self.base_origin
            .as_deref()
            .unwrap_or(DEFAULT_BASE_ORIGIN)
            .trim_end_matches('/')
    }

    pub fn discovery_path(&self) -> &str {
        self.discovery_path.as_deref().unwrap_or(DEFAULT_DISCOVERY_PATH)
    }

    pub fn server_address(&self) -> &str {
        self.server_address.as_deref().unwrap_or(DEFAULT_SERVER_ADDRESS)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn encode_parameters(&self) -> bool {
        self.encode_parameters.unwrap_or(true)
    }

    pub fn latest_response_only(&self) -> bool {
        self.latest_response_only.unwrap_or(true)
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::load_or_default("config.yaml");
}
