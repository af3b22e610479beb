use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Pick the filter directive: an explicit override wins, then `RUST_LOG`,
/// then the configured level.
pub fn filter(override_level: Option<&str>, configured: &str) -> EnvFilter {
    if let Some(level) = override_level {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

pub fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("learnpark")
        .join("learnpark.log")
}

/// Install the global subscriber, appending to `path`. The terminal belongs
/// to the quiz screen, so nothing is logged to it.
pub fn init_tracing(override_level: Option<&str>, configured: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter(override_level, configured))
        .with(file_layer)
        .try_init()?;
    Ok(())
}
