use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use recurrence_config::{AppConfig, LogConfig};
use recurrence_domain::{Notifier, TemplateFlavor};
use recurrence_engine::RecurrenceEngine;
use recurrence_infrastructure::{InMemoryEntityStore, LogNotifier, LoggingConfig, MetricsCollector};
use recurrence_processor::{ProcessingSummary, RecurringProcessor};
use tokio::sync::broadcast;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// 应用运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// 处理一次后退出
    Once,
    /// 按配置的间隔持续处理，直到收到关闭信号
    Daemon,
}

impl std::str::FromStr for AppMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "once" => Ok(AppMode::Once),
            "daemon" => Ok(AppMode::Daemon),
            _ => Err(anyhow::anyhow!("不支持的运行模式: {s}")),
        }
    }
}

/// 主应用程序
pub struct Application {
    config: AppConfig,
    store: Arc<InMemoryEntityStore>,
    processor: RecurringProcessor,
}

impl Application {
    /// 根据配置创建应用：加载种子文件，装配通知器、引擎和处理器
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store = match &config.store.seed_file {
            Some(path) => InMemoryEntityStore::load_from_file(path)
                .await
                .with_context(|| format!("加载种子文件失败: {path}"))?,
            None => {
                info!("未配置种子文件，使用空存储");
                InMemoryEntityStore::new()
            }
        };
        Self::with_store(config, store)
    }

    pub fn with_store(config: AppConfig, store: InMemoryEntityStore) -> Result<Self> {
        let store = Arc::new(store);

        let engine = RecurrenceEngine::with_utc_offset_minutes(config.engine.utc_offset_minutes)
            .context("创建周期引擎失败")?;

        let notifier: Option<Arc<dyn Notifier>> = if config.notifier.enabled {
            Some(Arc::new(LogNotifier::new(config.notifier.sender.clone())))
        } else {
            info!("通知已禁用，提醒实例将标记为未投递");
            None
        };

        let processor = RecurringProcessor::new(
            store.clone(),
            store.clone(),
            notifier,
            engine,
            config.processor.clone(),
            Arc::new(MetricsCollector::new()),
        );

        Ok(Self {
            config,
            store,
            processor,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &InMemoryEntityStore {
        &self.store
    }

    /// 以给定时间处理一次，必要时把存储快照写回种子文件
    pub async fn run_once(
        &self,
        flavors: &[TemplateFlavor],
        now: DateTime<Utc>,
    ) -> Result<Vec<ProcessingSummary>> {
        let summaries = self
            .processor
            .process_all(flavors, now)
            .await
            .context("处理周期模板失败")?;

        if let Some(path) = self.persist_path() {
            self.store
                .save_to_file(&path)
                .await
                .with_context(|| format!("写回存储快照失败: {}", path.display()))?;
            info!("存储快照已写回 {}", path.display());
        }

        Ok(summaries)
    }

    /// 守护模式：按间隔处理，直到收到关闭信号
    pub async fn run(
        &self,
        flavors: &[TemplateFlavor],
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let interval_seconds = self.config.processor.run_interval_seconds;
        info!("启动周期处理循环，间隔 {} 秒", interval_seconds);
        let mut interval = processing_interval(interval_seconds);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_once(flavors, Utc::now()).await {
                        Ok(summaries) => {
                            let errors: usize = summaries.iter().map(|s| s.errors.len()).sum();
                            if errors > 0 {
                                warn!("本次处理有 {} 个模板错误", errors);
                            }
                        }
                        Err(e) => error!("周期处理失败: {e:#}"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("处理循环收到关闭信号");
                    break;
                }
            }
        }

        Ok(())
    }

    fn persist_path(&self) -> Option<PathBuf> {
        if !self.config.store.persist {
            return None;
        }
        self.config.store.seed_file.as_ref().map(PathBuf::from)
    }
}

/// 处理耗时超过间隔时顺延下一次，不补跑错过的 tick
fn processing_interval(seconds: u64) -> Interval {
    let mut interval = tokio::time::interval(Duration::from_secs(seconds));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// 把配置中的日志段转换为日志初始化参数
pub fn logging_config(config: &LogConfig) -> LoggingConfig {
    LoggingConfig {
        level: config.filter_string(),
        format: config.format,
        include_location: config.include_location,
    }
}
