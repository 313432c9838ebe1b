use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::validation::ConfigValidator;
use crate::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON 种子文件（模板与实例快照）
    pub seed_file: Option<String>,
    /// 单次运行结束后把存储快照写回种子文件
    pub persist: bool,
}

impl ConfigValidator for StoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.persist && self.seed_file.is_none() {
            return Err(ConfigError::Validation(
                "store.seed_file is required when store.persist is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotifierConfig {
    pub enabled: bool,
    pub sender: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sender: "noreply@localhost".to_string(),
        }
    }
}

impl ConfigValidator for NotifierConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled && self.sender.trim().is_empty() {
            return Err(ConfigError::Validation(
                "notifier.sender must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub listen_address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl MetricsConfig {
    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        self.listen_address.parse().map_err(|e| {
            ConfigError::Validation(format!(
                "metrics.listen_address '{}' is invalid: {e}",
                self.listen_address
            ))
        })
    }
}

impl ConfigValidator for MetricsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled {
            self.socket_addr()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_persist_requires_seed_file() {
        let config = StoreConfig {
            seed_file: None,
            persist: true,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = MetricsConfig {
            enabled: false,
            listen_address: "not-an-address".to_string(),
        };
        assert!(config.validate().is_ok());
        config.enabled = true;
        assert!(config.validate().is_err());
        config.listen_address = "127.0.0.1:9100".to_string();
        assert_eq!(config.socket_addr().unwrap().port(), 9100);
    }
}
