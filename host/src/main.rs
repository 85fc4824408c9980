//! # Host 演示程序
//!
//! 无窗口运行一段脚本化的菜单场景，并把每个调度事件写入日志。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p host
//! cargo run -p host -- --config config.json --fps 30 --seconds 12
//! cargo run -p host -- --settings /tmp/settings.json --log-level debug
//! ```

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use host::{App, AppConfig, JsonSettingsStore, LogBackend, default_script, run_demo};
use tracing::info;

#[derive(Parser)]
#[command(name = "host")]
#[command(about = "UI 动画调度演示 - 以固定帧率运行菜单场景")]
#[command(version)]
struct Cli {
    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// 用户设置文件，覆盖配置中的 audio.settings_path
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// 固定帧率，覆盖配置中的 demo.fps
    #[arg(long)]
    fps: Option<u32>,

    /// 演示时长（秒），覆盖配置中的 demo.seconds
    #[arg(long)]
    seconds: Option<f32>,

    /// 随机种子（加载停留、灯光闪烁）
    #[arg(long)]
    seed: Option<u64>,

    /// 日志级别
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(cli.log_level))
        .init();

    info!("Host 演示 v{}", env!("CARGO_PKG_VERSION"));

    // 命令行参数优先于配置文件
    let mut config = AppConfig::load(&cli.config);
    if let Some(path) = cli.settings {
        config.audio.settings_path = path;
    }
    if let Some(fps) = cli.fps {
        config.demo.fps = fps;
    }
    if let Some(seconds) = cli.seconds {
        config.demo.seconds = seconds;
    }
    config
        .validate()
        .with_context(|| format!("配置无效: {}", cli.config.display()))?;

    let settings = Box::new(JsonSettingsStore::open(config.audio.settings_path.clone()));
    let backend = Rc::new(LogBackend);
    let mut app = match cli.seed {
        Some(seed) => App::with_seed(&config, backend, settings, seed),
        None => App::new(&config, backend, settings),
    };

    let report = run_demo(
        &mut app,
        &default_script(),
        config.demo.fps,
        config.demo.seconds,
    );
    info!(
        frames = report.frames,
        started = report.started,
        rejected = report.rejected,
        killed = report.killed,
        completed = report.completed,
        "演示完成"
    );

    Ok(())
}
