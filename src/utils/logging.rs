//! Diagnostic logging.
//!
//! The terminal UI owns stdout, so tracing output goes to a file instead.
//! Nothing is written to the log about message contents beyond lengths.

use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PALAVER_LOG";
const DEFAULT_FILTER: &str = "info";

/// Build the level filter from `PALAVER_LOG`, falling back to `info` when the
/// variable is unset or not a valid filter expression.
pub fn env_filter() -> EnvFilter {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(DEFAULT_FILTER),
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber writing to `path`.
///
/// Returns the path in use. A second call in the same process is a no-op.
pub fn init_file_logging(path: PathBuf) -> Result<PathBuf, Box<dyn Error>> {
    let file = open_log_file(&path)?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();

    if installed.is_ok() {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "palaver starting");
    }
    Ok(path)
}
