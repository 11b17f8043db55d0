use crate::core::config::data::{path_display, Config};
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        /// Path to the configuration file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        /// Path to the configuration file with invalid TOML.
        path: PathBuf,
        /// The TOML deserialization error.
        source: toml::de::Error,
    },

    /// The platform offers no home or config directory.
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path_display(path), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path_display(path), source)
            }
            ConfigError::NoConfigDir => write!(f, "Could not determine a config directory"),
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::NoConfigDir => None,
        }
    }
}

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "palaver", "palaver")
}

impl Config {
    /// Load from the platform config path. A missing file yields defaults.
    pub fn load() -> Result<Config, Box<dyn StdError>> {
        Self::load_from_path(&Self::get_config_path()?)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn StdError>> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn StdError>> {
        self.save_to_path(&Self::get_config_path()?)
    }

    /// Write atomically: the new contents land in a temp file beside the
    /// target and replace it only once fully synced.
    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn StdError>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };

        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file
            .persist(config_path)
            .map_err(|err| -> Box<dyn StdError> { Box::new(err) })?;
        Ok(())
    }

    /// Load, apply `mutator`, and save in one step.
    pub fn mutate<F, T>(mutator: F) -> Result<T, Box<dyn StdError>>
    where
        F: FnOnce(&mut Config) -> Result<T, Box<dyn StdError>>,
    {
        let path = Self::get_config_path()?;
        let mut config = Self::load_from_path(&path)?;
        let result = mutator(&mut config)?;
        config.save_to_path(&path)?;
        Ok(result)
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Default location of the diagnostic log.
    pub fn default_log_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_local_dir().join("palaver.log"))
    }
}
