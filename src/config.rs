//! CLI configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via CHIANET_CONFIG or --config)
//! 3. Environment variables

use chianet_protocol::{Handshake, NodeType, DEFAULT_PORT, MAINNET};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CHIANET_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity advertised in handshakes.
    pub node: NodeConfig,
    /// Input limits.
    pub limits: LimitsConfig,
}

impl Config {
    /// Loads configuration from `path`, or from `CHIANET_CONFIG` when no path
    /// is given, then applies environment variable overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.node.apply_overrides(&lookup);
        self.limits.apply_overrides(&lookup);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.node.validate()?;
        self.limits.validate()
    }
}

/// Handshake identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub network_id: String,
    pub software_version: String,
    pub server_port: u16,
    pub node_type: NodeType,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network_id: MAINNET.to_string(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            server_port: DEFAULT_PORT,
            node_type: NodeType::FullNode,
        }
    }
}

impl NodeConfig {
    fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(network_id) = lookup("CHIANET_NETWORK_ID") {
            self.network_id = network_id;
        }

        if let Some(version) = lookup("CHIANET_SOFTWARE_VERSION") {
            self.software_version = version;
        }

        if let Some(port) = lookup("CHIANET_SERVER_PORT") {
            match port.parse() {
                Ok(port) => self.server_port = port,
                Err(_) => tracing::warn!(value = %port, "ignoring invalid CHIANET_SERVER_PORT"),
            }
        }

        if let Some(node_type) = lookup("CHIANET_NODE_TYPE") {
            match node_type.parse() {
                Ok(node_type) => self.node_type = node_type,
                Err(e) => tracing::warn!(error = %e, "ignoring invalid CHIANET_NODE_TYPE"),
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.network_id.is_empty() {
            return Err(ConfigError::Validation(
                "node.network_id must not be empty".to_string(),
            ));
        }
        if self.server_port == 0 {
            return Err(ConfigError::Validation(
                "node.server_port must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the handshake this node would send.
    pub fn handshake(&self) -> Handshake {
        Handshake::new(
            self.network_id.clone(),
            self.software_version.clone(),
            self.server_port,
            self.node_type,
        )
    }
}

/// Input limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest envelope the CLI will decode, in bytes.
    pub max_message_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_size: 50 * 1024 * 1024,
        }
    }
}

impl LimitsConfig {
    fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(size) = lookup("CHIANET_MAX_MESSAGE_SIZE") {
            match size.parse() {
                Ok(size) => self.max_message_size = size,
                Err(_) => {
                    tracing::warn!(value = %size, "ignoring invalid CHIANET_MAX_MESSAGE_SIZE")
                }
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_size == 0 {
            return Err(ConfigError::Validation(
                "limits.max_message_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {1}", .0.display())]
    Parse(PathBuf, String),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
