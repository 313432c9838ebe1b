use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    logging::LogConfig,
    processor::{EngineConfig, ProcessorConfig},
    store_observability::{MetricsConfig, NotifierConfig, StoreConfig},
};
use crate::validation::ConfigValidator;
use crate::{ConfigError, ConfigResult};

const DEFAULT_CONFIG_PATHS: [&str; 2] = ["config/recurrence.toml", "recurrence.toml"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub logging: LogConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl AppConfig {
    /// 加载配置：显式路径必须存在；否则依次尝试默认路径，都不存在时使用内置默认值。
    /// 环境变量 `RECURRENCE__<SECTION>__<KEY>` 覆盖文件中的值。
    pub fn load(config_path: Option<&str>) -> ConfigResult<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(ConfigError::File(format!("配置文件不存在: {path}")));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("RECURRENCE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("processor.flavors"),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> ConfigResult<Self> {
        let config: AppConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("序列化配置为TOML失败: {e}")))
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.engine.validate()?;
        self.processor.validate()?;
        self.store.validate()?;
        self.notifier.validate()?;
        self.logging.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}
