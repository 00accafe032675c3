use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::shared::errors::AppError;
use crate::shared::types::{BlockHeight, TimestampMs};

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3002,
        }
    }
}

/// Defaults applied to pool operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolsConfig {
    /// Swap fee in tenths of a percent (3 = 0.3%)
    pub default_fee: u32,
    /// Allowed deviation of a deposit from the pool ratio, in basis points
    pub ratio_tolerance_bps: u32,
}

impl Default for PoolsConfig {
    fn default() -> Self {
        Self {
            default_fee: 3,
            ratio_tolerance_bps: 50,
        }
    }
}

/// Anchor used to estimate the chain tip between blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub anchor_height: BlockHeight,
    pub anchor_time_ms: TimestampMs,
    pub block_interval_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            anchor_height: 840_000,
            anchor_time_ms: 1_713_571_767_000, // block 840000 (first runes block)
            block_interval_ms: 600_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub simulate_only: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { simulate_only: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub snapshot_path: Option<String>,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub pools: PoolsConfig,
    pub chain: ChainConfig,
    pub execution: ExecutionConfig,
    pub storage: StorageConfig,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            pools: PoolsConfig::default(),
            chain: ChainConfig::default(),
            execution: ExecutionConfig::default(),
            storage: StorageConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, AppError> {
        let config_content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::parse(&config_content)
    }

    /// Load `Config.toml` from the working directory, falling back to defaults
    pub fn load_config() -> Result<ServiceConfig, AppError> {
        if Path::new("Config.toml").exists() {
            Self::load_from("Config.toml")
        } else {
            Ok(ServiceConfig::default())
        }
    }

    pub fn parse(content: &str) -> Result<ServiceConfig, AppError> {
        let config: ServiceConfig = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        if config.pools.default_fee >= 1000 {
            return Err(AppError::ConfigError(format!(
                "pools.default_fee must be below 1000, got {}",
                config.pools.default_fee
            )));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ConfigLoader::parse("").unwrap();
        assert_eq!(config.server.port, 3002);
        assert_eq!(config.pools.default_fee, 3);
        assert!(config.execution.simulate_only);
        assert!(config.storage.snapshot_path.is_none());
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let config = ConfigLoader::parse(
            r#"
            log_level = "debug"

            [server]
            port = 8080

            [storage]
            snapshot_path = "state.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.storage.snapshot_path.as_deref(), Some("state.json"));
        assert_eq!(config.chain.block_interval_ms, 600_000);
    }

    #[test]
    fn test_fee_out_of_range_is_rejected() {
        let err = ConfigLoader::parse("[pools]\ndefault_fee = 1000\n").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
