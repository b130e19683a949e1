//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from an optional TOML file. A missing file is
//! not an error: the built-in defaults are used. Loading happens before
//! logging is set up, so [`TomlConfig::load`] reports where the settings
//! came from as a [`ConfigOrigin`] for the caller to log afterwards.
//!
//! Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. `TCA_ROOT_FOLDER` environment variable
//! 3. `root_folder` in the TOML config file
//! 4. OS-dependent compiled default (fallback)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "TCA_ROOT_FOLDER";

/// File name of the key-value store inside the root folder
pub const STORE_FILE_NAME: &str = "authoring-store.json";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the store file (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Simulated backend latency (optional)
    #[serde(default)]
    pub latency: LatencyConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Delays awaited by each persistence operation before it runs, standing in
/// for a network round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// Listing suites or tests
    pub read_ms: u64,
    /// Creating, updating or deleting a suite or test
    pub write_ms: u64,
    /// Importing a CSV file
    pub csv_import_ms: u64,
    /// Registering a video upload
    pub video_upload_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            read_ms: 100,
            write_ms: 300,
            csv_import_ms: 1000,
            video_upload_ms: 2000,
        }
    }
}

impl LatencyConfig {
    /// No simulated latency at all
    pub fn none() -> Self {
        Self {
            read_ms: 0,
            write_ms: 0,
            csv_import_ms: 0,
            video_upload_ms: 0,
        }
    }

    pub fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }

    pub fn write(&self) -> Duration {
        Duration::from_millis(self.write_ms)
    }

    pub fn csv_import(&self) -> Duration {
        Duration::from_millis(self.csv_import_ms)
    }

    pub fn video_upload(&self) -> Duration {
        Duration::from_millis(self.video_upload_ms)
    }
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Load the explicit file if given, otherwise the platform config file.
    ///
    /// An explicit file must exist and parse. The platform file is optional:
    /// when it is missing the defaults are returned.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigOrigin)> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            return Ok((config, ConfigOrigin::File(path.to_path_buf())));
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let config = Self::from_file(&path)?;
                Ok((config, ConfigOrigin::File(path)))
            }
            Some(path) => Ok((Self::default(), ConfigOrigin::MissingFile(path))),
            None => Ok((Self::default(), ConfigOrigin::NoConfigDir)),
        }
    }
}

/// Where [`TomlConfig::load`] found its settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// Platform config file does not exist; defaults used
    MissingFile(PathBuf),
    /// No platform config directory; defaults used
    NoConfigDir,
}

impl ConfigOrigin {
    /// Log the outcome; call once a subscriber is installed
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => {
                info!("Loaded TOML configuration from {}", path.display())
            }
            ConfigOrigin::MissingFile(path) => warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            ),
            ConfigOrigin::NoConfigDir => {
                warn!("Could not determine config directory, using built-in defaults")
            }
        }
    }
}

/// Platform config file path (`<config dir>/tca/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tca").join("config.toml"))
}

/// Get OS-dependent default root folder path
pub fn get_default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tca"))
        .unwrap_or_else(|| PathBuf::from("./tca_data"))
}

/// Resolves the root folder using the priority order above
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml_config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_root: toml_config.root_folder.clone(),
        }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("Root folder: {} (from command line)", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("Root folder: {} (from {})", path, ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            info!("Root folder: {} (from config file)", path.display());
            return path.clone();
        }

        let path = get_default_root_folder();
        info!("Root folder: {} (default)", path.display());
        path
    }
}

/// Creates the root folder and locates files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder {}", self.root_folder.display());
        }
        Ok(())
    }

    /// Path of the key-value store file
    pub fn store_path(&self) -> PathBuf {
        self.root_folder.join(STORE_FILE_NAME)
    }
}
