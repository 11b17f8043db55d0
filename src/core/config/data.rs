use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::api::postgrest::DEFAULT_TABLE;

pub const ENV_DATASTORE_URL: &str = "PALAVER_DATASTORE_URL";
pub const ENV_MODEL: &str = "PALAVER_MODEL";

/// Where messages are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatastoreKind {
    /// A PostgREST table such as the one Supabase exposes.
    #[default]
    Supabase,
    /// Process-local rows, lost on exit.
    Memory,
}

impl DatastoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DatastoreKind::Supabase => "supabase",
            DatastoreKind::Memory => "memory",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "supabase" | "postgrest" => Some(DatastoreKind::Supabase),
            "memory" | "mem" => Some(DatastoreKind::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Backend for the message table ("supabase" or "memory")
    pub datastore: Option<DatastoreKind>,
    /// Project URL of the datastore, e.g. https://abc.supabase.co
    pub datastore_url: Option<String>,
    /// Table holding message rows
    pub table: Option<String>,
    /// Gemini model used for replies
    pub model: Option<String>,
    /// Override for the Gemini API base URL
    pub gemini_base_url: Option<String>,
    /// Per-request timeout in seconds; unset means no timeout
    pub request_timeout_secs: Option<u64>,
    /// Show the sidebar at startup
    pub sidebar: Option<bool>,
    /// Diagnostic log file
    pub log_file: Option<String>,
}

impl Config {
    pub fn datastore_kind(&self) -> DatastoreKind {
        self.datastore.unwrap_or_default()
    }

    /// Datastore project URL; the environment wins over the file.
    pub fn resolved_datastore_url(&self) -> Option<String> {
        std::env::var(ENV_DATASTORE_URL)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.datastore_url.clone())
    }

    pub fn resolved_table(&self) -> String {
        self.table
            .clone()
            .filter(|table| !table.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string())
    }

    pub fn resolved_model(&self) -> String {
        std::env::var(ENV_MODEL)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.model.clone())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string())
    }

    pub fn resolved_gemini_base_url(&self) -> String {
        self.gemini_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar.unwrap_or(true)
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/palaver/config.toml` → `~/.config/palaver/config.toml`
/// - Windows paths are shown unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
