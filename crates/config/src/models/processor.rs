use recurrence_domain::{DeliveryMode, TemplateFlavor};
use serde::{Deserialize, Serialize};

use crate::validation::ConfigValidator;
use crate::{ConfigError, ConfigResult};

/// 自然日换算所用的最大偏移（不含24小时）
const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60 - 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// 判断"同一天"时使用的固定UTC偏移（分钟）
    pub utc_offset_minutes: i32,
}

impl ConfigValidator for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::Validation(format!(
                "engine.utc_offset_minutes must be within ±{MAX_UTC_OFFSET_MINUTES}, got {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessorConfig {
    pub delivery_mode: DeliveryMode,
    /// 同一次运行中并发处理的模板数量上限
    pub max_concurrency: usize,
    /// 守护模式下两次运行的间隔
    pub run_interval_seconds: u64,
    /// 每次运行处理的模板类别，按顺序执行
    pub flavors: Vec<TemplateFlavor>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            delivery_mode: DeliveryMode::AtLeastOnce,
            max_concurrency: 1,
            run_interval_seconds: 3600,
            flavors: TemplateFlavor::all().to_vec(),
        }
    }
}

impl ConfigValidator for ProcessorConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::Validation(
                "processor.max_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.run_interval_seconds == 0 {
            return Err(ConfigError::Validation(
                "processor.run_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.flavors.is_empty() {
            return Err(ConfigError::Validation(
                "processor.flavors must list at least one template flavor".to_string(),
            ));
        }
        Ok(())
    }
}
