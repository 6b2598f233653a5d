use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the file writer's worker thread alive for the life of the process.
static FILE_GUARD: OnceCell<Option<WorkerGuard>> = OnceCell::new();

const LOG_FILE_PREFIX: &str = "app";
const LOG_FILE_SUFFIX: &str = "log";
const LOG_FILES_KEPT: usize = 3;

/// Configuration for tracing initialization.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    pub env_filter: Option<String>,
    /// Directory for `app.log*`. `None` logs to stderr only.
    pub log_dir: Option<PathBuf>,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "sed-desk",
            env_filter: None,
            log_dir: Some(PathBuf::from("logs")),
        }
    }
}

fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(LOG_FILES_KEPT)
        .build(dir)
        .context("building rolling log appender")
}

/// Install the stderr subscriber plus an optional rolling file layer.
/// Calling it again is a no-op.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if FILE_GUARD.get().is_some() {
        return Ok(());
    }

    let filter = config
        .env_filter
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info,sqlx=warn,sea_orm_migration=warn".to_string());

    let env_filter = EnvFilter::try_new(filter)?;
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    let guard = if let Some(dir) = &config.log_dir {
        let (writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer);
        registry.with(file_layer).try_init()?;
        Some(guard)
    } else {
        registry.try_init()?;
        None
    };

    FILE_GUARD
        .set(guard)
        .map_err(|_| anyhow!("tracing already initialized"))?;
    tracing::debug!(service = config.service_name, "tracing initialized");
    Ok(())
}
