use crate::models::{UPDATE_ACTION, UPDATE_AUDIENCE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 88,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: "./characters.db.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub rpc_url: String,
    pub contract_address: Option<String>,
    /// Deadline for a single `ownerOf` lookup
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:7545".to_string(),
            contract_address: None,
            timeout_secs: 10,
        }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Claims every signed update must carry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub audience: String,
    pub action: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            audience: UPDATE_AUDIENCE.to_string(),
            action: UPDATE_ACTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub oracle: OracleConfig,
    pub auth: AuthConfig,
}

impl NodeConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: NodeConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.oracle.timeout_secs == 0 {
            anyhow::bail!("oracle.timeout_secs must be greater than zero");
        }
        if self.auth.audience.is_empty() || self.auth.action.is_empty() {
            anyhow::bail!("auth.audience and auth.action must not be empty");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
