use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Arg, ArgMatches, Command};
use recurrence::{AppMode, Application, ShutdownManager};
use recurrence_config::{AppConfig, ConfigValidator, LogLevel, OutputFormat};
use recurrence_domain::TemplateFlavor;
use recurrence_infrastructure::{init_metrics, init_structured_logging};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("recurrence")
        .version("1.0.0")
        .about("周期性任务/交易/提醒的到期处理")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径（默认依次查找 config/recurrence.toml、recurrence.toml）"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("运行模式")
                .value_parser(["once", "daemon"])
                .default_value("once"),
        )
        .arg(
            Arg::new("flavor")
                .short('f')
                .long("flavor")
                .value_name("FLAVOR")
                .help("处理的模板类别")
                .value_parser(["task", "transaction", "reminder", "all"])
                .default_value("all"),
        )
        .arg(
            Arg::new("now")
                .long("now")
                .value_name("RFC3339")
                .help("评估时间（仅 once 模式），默认当前时间"),
        )
        .arg(
            Arg::new("store")
                .short('s')
                .long("store")
                .value_name("FILE")
                .help("种子文件路径，覆盖配置中的 store.seed_file"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty", "compact"]),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config");
    let mut config = AppConfig::load(config_path.map(String::as_str)).with_context(|| {
        format!(
            "加载配置失败: {}",
            config_path.map(String::as_str).unwrap_or("<默认路径>")
        )
    })?;
    apply_overrides(&mut config, &matches)?;

    init_structured_logging(&recurrence::app::logging_config(&config.logging))?;
    if config.metrics.enabled {
        init_metrics(config.metrics.socket_addr()?)?;
    }

    let mode: AppMode = matches
        .get_one::<String>("mode")
        .map(String::as_str)
        .unwrap_or("once")
        .parse()?;
    let flavors = selected_flavors(&matches, &config)?;

    info!("启动周期处理服务, 模式: {:?}, 类别: {:?}", mode, flavors);

    let app = Application::new(config).await?;

    match mode {
        AppMode::Once => {
            let now = match matches.get_one::<String>("now") {
                Some(value) => DateTime::parse_from_rfc3339(value)
                    .with_context(|| format!("无效的评估时间: {value}"))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };
            let summaries = app.run_once(&flavors, now).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&summaries).context("序列化处理汇总失败")?
            );
        }
        AppMode::Daemon => run_daemon(app, flavors).await?,
    }

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, matches: &ArgMatches) -> Result<()> {
    if let Some(path) = matches.get_one::<String>("store") {
        config.store.seed_file = Some(path.clone());
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level
            .parse::<LogLevel>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.logging.format = format
            .parse::<OutputFormat>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    config.validate().context("命令行覆盖后的配置无效")?;
    Ok(())
}

fn selected_flavors(matches: &ArgMatches, config: &AppConfig) -> Result<Vec<TemplateFlavor>> {
    match matches.get_one::<String>("flavor").map(String::as_str) {
        None | Some("all") => Ok(config.processor.flavors.clone()),
        Some(flavor) => Ok(vec![flavor
            .parse::<TemplateFlavor>()
            .map_err(|e| anyhow::anyhow!("{e}"))?]),
    }
}

async fn run_daemon(app: Application, flavors: Vec<TemplateFlavor>) -> Result<()> {
    let shutdown_manager = ShutdownManager::new();
    let shutdown_rx = shutdown_manager.subscribe().await;

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app.run(&flavors, shutdown_rx).await {
            error!("应用运行失败: {e:#}");
        }
    });

    wait_for_shutdown_signal().await;
    info!("收到关闭信号，开始优雅关闭...");
    shutdown_manager.shutdown().await;

    match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
        Ok(Ok(())) => info!("应用已优雅关闭"),
        Ok(Err(e)) => error!("应用关闭时发生错误: {e}"),
        Err(_) => warn!("应用关闭超时，强制退出"),
    }
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到Ctrl+C信号"),
        _ = terminate => info!("收到SIGTERM信号"),
    }
}
