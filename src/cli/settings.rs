//! `palaver set` / `palaver unset`.
//!
//! Input is validated into a [`SettingUpdate`] before the config file is
//! touched, so a bad value never rewrites the file.

use std::fmt;

use crate::core::config::{Config, DatastoreKind};
use crate::utils::url::is_http_url;

/// Keys accepted by `set` and `unset`, in `palaver config` order.
pub const SETTING_KEYS: [&str; 8] = [
    "datastore",
    "datastore-url",
    "table",
    "model",
    "gemini-base-url",
    "request-timeout",
    "sidebar",
    "log-file",
];

/// Errors that can occur when modifying configuration settings.
#[derive(Debug)]
pub enum SettingError {
    UnknownKey(String),
    InvalidValue {
        key: &'static str,
        input: String,
        expected: &'static str,
    },
    InvalidBoolean(String),
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
    ConfigError(String),
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(key) => {
                eprintln!("❌ Unknown config key: {key}");
                eprintln!("   Known keys: {}", SETTING_KEYS.join(", "));
            }
            SettingError::InvalidValue {
                key,
                input,
                expected,
            } => {
                eprintln!("❌ Invalid value for {key}: {input}");
                eprintln!("   Expected {expected}");
            }
            SettingError::InvalidBoolean(input) => {
                eprintln!("❌ Invalid boolean value: {input}");
                eprintln!("   Use 'on' or 'off' (also accepts true/false, yes/no)");
            }
            SettingError::MissingArgs { hint, example } => {
                eprintln!("⚠️  {hint}");
                eprintln!("Example: {example}");
            }
            SettingError::ConfigError(msg) => {
                eprintln!("❌ Failed to save configuration: {msg}");
            }
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::InvalidValue { key, input, .. } => {
                write!(f, "Invalid value for {key}: {input}")
            }
            SettingError::InvalidBoolean(input) => write!(f, "Invalid boolean value: {input}"),
            SettingError::MissingArgs { hint, .. } => write!(f, "{hint}"),
            SettingError::ConfigError(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for SettingError {}

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no, 1/0 (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn parse_timeout(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    trimmed
        .strip_suffix('s')
        .unwrap_or(trimmed)
        .trim()
        .parse()
        .ok()
}

/// One validated change to the config file. `None` clears the key.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingUpdate {
    Datastore(Option<DatastoreKind>),
    DatastoreUrl(Option<String>),
    Table(Option<String>),
    Model(Option<String>),
    GeminiBaseUrl(Option<String>),
    RequestTimeout(Option<u64>),
    Sidebar(Option<bool>),
    LogFile(Option<String>),
}

impl SettingUpdate {
    pub fn parse_set(key: &str, value: &str) -> Result<Self, SettingError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "Specify a value to set.",
                example: "palaver set model gemini-1.5-pro",
            });
        }
        let invalid = |key: &'static str, expected: &'static str| SettingError::InvalidValue {
            key,
            input: value.to_string(),
            expected,
        };

        match key {
            "datastore" => DatastoreKind::parse(value)
                .map(|kind| SettingUpdate::Datastore(Some(kind)))
                .ok_or_else(|| invalid("datastore", "'supabase' or 'memory'")),
            "datastore-url" if is_http_url(value) => {
                Ok(SettingUpdate::DatastoreUrl(Some(value.to_string())))
            }
            "datastore-url" => Err(invalid("datastore-url", "an http(s) URL")),
            "table" => Ok(SettingUpdate::Table(Some(value.to_string()))),
            "model" => Ok(SettingUpdate::Model(Some(value.to_string()))),
            "gemini-base-url" if is_http_url(value) => {
                Ok(SettingUpdate::GeminiBaseUrl(Some(value.to_string())))
            }
            "gemini-base-url" => Err(invalid("gemini-base-url", "an http(s) URL")),
            "request-timeout" => parse_timeout(value)
                .map(|secs| SettingUpdate::RequestTimeout(Some(secs)))
                .ok_or_else(|| invalid("request-timeout", "a number of seconds (0 disables)")),
            "sidebar" => parse_bool(value)
                .map(|open| SettingUpdate::Sidebar(Some(open)))
                .ok_or_else(|| SettingError::InvalidBoolean(value.to_string())),
            "log-file" => Ok(SettingUpdate::LogFile(Some(value.to_string()))),
            other => Err(SettingError::UnknownKey(other.to_string())),
        }
    }

    pub fn parse_unset(key: &str) -> Result<Self, SettingError> {
        Ok(match key {
            "datastore" => SettingUpdate::Datastore(None),
            "datastore-url" => SettingUpdate::DatastoreUrl(None),
            "table" => SettingUpdate::Table(None),
            "model" => SettingUpdate::Model(None),
            "gemini-base-url" => SettingUpdate::GeminiBaseUrl(None),
            "request-timeout" => SettingUpdate::RequestTimeout(None),
            "sidebar" => SettingUpdate::Sidebar(None),
            "log-file" => SettingUpdate::LogFile(None),
            other => return Err(SettingError::UnknownKey(other.to_string())),
        })
    }

    pub fn key(&self) -> &'static str {
        match self {
            SettingUpdate::Datastore(_) => "datastore",
            SettingUpdate::DatastoreUrl(_) => "datastore-url",
            SettingUpdate::Table(_) => "table",
            SettingUpdate::Model(_) => "model",
            SettingUpdate::GeminiBaseUrl(_) => "gemini-base-url",
            SettingUpdate::RequestTimeout(_) => "request-timeout",
            SettingUpdate::Sidebar(_) => "sidebar",
            SettingUpdate::LogFile(_) => "log-file",
        }
    }

    fn display_value(&self) -> Option<String> {
        match self {
            SettingUpdate::Datastore(kind) => kind.map(|k| k.as_str().to_string()),
            SettingUpdate::DatastoreUrl(v)
            | SettingUpdate::Table(v)
            | SettingUpdate::Model(v)
            | SettingUpdate::GeminiBaseUrl(v)
            | SettingUpdate::LogFile(v) => v.clone(),
            SettingUpdate::RequestTimeout(secs) => secs.map(|s| format!("{s}s")),
            SettingUpdate::Sidebar(open) => open.map(|o| format_bool(o).to_string()),
        }
    }

    pub fn apply(self, config: &mut Config) {
        match self {
            SettingUpdate::Datastore(v) => config.datastore = v,
            SettingUpdate::DatastoreUrl(v) => config.datastore_url = v,
            SettingUpdate::Table(v) => config.table = v,
            SettingUpdate::Model(v) => config.model = v,
            SettingUpdate::GeminiBaseUrl(v) => config.gemini_base_url = v,
            SettingUpdate::RequestTimeout(v) => config.request_timeout_secs = v,
            SettingUpdate::Sidebar(v) => config.sidebar = v,
            SettingUpdate::LogFile(v) => config.log_file = v,
        }
    }

    pub fn success_message(&self) -> String {
        match self.display_value() {
            Some(value) => format!("✅ Set {} to: {}", self.key(), value),
            None => format!("✅ Unset {}", self.key()),
        }
    }
}

fn save(update: SettingUpdate) -> Result<String, SettingError> {
    let message = update.success_message();
    Config::mutate(move |config| {
        update.apply(config);
        Ok(())
    })
    .map_err(|e| SettingError::ConfigError(e.to_string()))?;
    Ok(message)
}

/// `palaver set <key> <value...>`. With no value, prints the current config.
pub fn run_set(key: &str, value: Option<Vec<String>>) -> Result<(), SettingError> {
    let value = value.map(|parts| parts.join(" ")).unwrap_or_default();
    if value.trim().is_empty() {
        let config = Config::load().map_err(|e| SettingError::ConfigError(e.to_string()))?;
        config.print_all();
        return Ok(());
    }

    let update = SettingUpdate::parse_set(key, &value)?;
    println!("{}", save(update)?);
    Ok(())
}

pub fn run_unset(key: &str) -> Result<(), SettingError> {
    let update = SettingUpdate::parse_unset(key)?;
    println!("{}", save(update)?);
    Ok(())
}
