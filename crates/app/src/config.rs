//! Runtime configuration: database location, store timeout and logging.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use services::StoreConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_DB_URL: &str = "sqlite:progress.sqlite3";
const MEMORY_URL: &str = "sqlite::memory:";

/// Turn a user-supplied database location into an absolute `sqlite://` URL.
///
/// Accepts `sqlite://...` URLs unchanged, plus `sqlite:<path>` and bare paths
/// (relative paths resolve against `cwd`).
pub fn normalize_sqlite_url(raw: &str, cwd: &Path) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("database location is empty");
    }
    if trimmed == MEMORY_URL || trimmed.starts_with("sqlite://") {
        return Ok(trimmed.to_owned());
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    Ok(format!("sqlite://{}", absolute.display()))
}

/// Path of the database file behind `db_url`, or `None` for in-memory URLs.
pub fn sqlite_file_path(db_url: &str) -> Result<Option<PathBuf>> {
    if db_url == MEMORY_URL || db_url.contains("mode=memory") {
        return Ok(None);
    }
    let Some(rest) = db_url.strip_prefix("sqlite://") else {
        bail!("unsupported database URL: {db_url}");
    };
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() {
        bail!("database URL has no path: {db_url}");
    }
    Ok(Some(PathBuf::from(path)))
}

/// Create the database file and its parent directories if they are missing.
pub fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    let Some(path) = sqlite_file_path(db_url)? else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
    }
    Ok(())
}

pub fn store_config(timeout_secs: u64) -> Result<StoreConfig> {
    if timeout_secs == 0 {
        bail!("--timeout-secs must be at least 1");
    }
    Ok(StoreConfig {
        op_timeout: Duration::from_secs(timeout_secs),
    })
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("dsa_tracker={level},services={level},storage={level},warn").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
