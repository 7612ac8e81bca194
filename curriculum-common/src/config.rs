//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `CURRICULUM_ROOT_FOLDER`
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable platform TOML file is never fatal: compiled
//! defaults are used and the problem is logged once tracing is initialised.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable consulted for the root folder
pub const ROOT_FOLDER_ENV: &str = "CURRICULUM_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "curriculum.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Root folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Import pipeline tuning
    #[serde(default)]
    pub import: ImportConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
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

/// Import pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportConfig {
    /// Workbooks imported concurrently during a directory run
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Upper bound on retrying a file import that hit SQLite lock contention
    #[serde(default = "default_max_lock_wait_ms")]
    pub max_lock_wait_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            max_lock_wait_ms: default_max_lock_wait_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_concurrent_jobs() -> usize {
    1
}

fn default_max_lock_wait_ms() -> u64 {
    5000
}

/// Load TOML config from an explicit path
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| Error::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write TOML config, creating the parent directory if needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Locate the platform config file, if one exists
///
/// Linux checks `~/.config/curriculum/config.toml` then
/// `/etc/curriculum/config.toml`; other platforms only the user config dir.
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("curriculum").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/curriculum/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
    /// File found but unreadable; defaults used instead
    Rejected { path: PathBuf, reason: String },
}

/// Configuration plus its provenance
///
/// Loading happens before the tracing subscriber exists, so the outcome is
/// kept here and reported through [`ConfigLoad::log`] once logging is up.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

impl ConfigLoad {
    pub fn log(&self) {
        match &self.source {
            ConfigSource::File(path) => debug!("Loaded config file {}", path.display()),
            ConfigSource::Defaults => debug!("No config file found, using compiled defaults"),
            ConfigSource::Rejected { path, reason } => {
                warn!("Ignoring config file {}: {}", path.display(), reason)
            }
        }
    }
}

/// Load `path` if given, falling back to defaults on any problem
pub fn load_config_from(path: Option<&Path>) -> ConfigLoad {
    match path {
        Some(path) => match load_toml_config(path) {
            Ok(config) => ConfigLoad {
                config,
                source: ConfigSource::File(path.to_path_buf()),
            },
            Err(e) => ConfigLoad {
                config: TomlConfig::default(),
                source: ConfigSource::Rejected {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                },
            },
        },
        None => ConfigLoad {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
        },
    }
}

/// Load the platform config file, falling back to defaults on any problem
pub fn load_config_or_default() -> ConfigLoad {
    load_config_from(find_config_file().as_deref())
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: default_log_level(),
        }
    }
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/curriculum (or /var/lib/curriculum for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("curriculum"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/curriculum"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("curriculum"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/curriculum"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("curriculum"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\curriculum"))
    } else {
        PathBuf::from("./curriculum_data")
    }
}

/// Resolves the root folder following the documented priority order
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_config: Option<TomlConfig>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command-line override (priority 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Already-loaded TOML config (priority 3)
    pub fn with_toml_config(mut self, config: TomlConfig) -> Self {
        self.toml_config = Some(config);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(root) = self
            .toml_config
            .as_ref()
            .and_then(|config| config.root_folder.clone())
        {
            return root;
        }

        // Priority 4: OS-dependent compiled default
        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder on first run and knows where the database lives
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            debug!("Created root folder {}", self.root_folder.display());
        } else if !self.root_folder.is_dir() {
            return Err(Error::Config(format!(
                "Root folder is not a directory: {}",
                self.root_folder.display()
            )));
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}
