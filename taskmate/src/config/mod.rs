//! Configuration system for the `TaskMate` host.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskmate/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;

use chrono::NaiveDate;
use taskmate_proto::task::Priority;

use crate::tasks::{SortOrder, StatusFilter};
use crate::theme::ThemePolicy;
use crate::timer::{DEFAULT_BREAK_SECS, DEFAULT_WORK_SECS};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A setting parsed but is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted name of the offending setting.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    timer: TimerFileConfig,
    theme: ThemeFileConfig,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_dir: Option<PathBuf>,
    namespace: Option<String>,
}

/// `[timer]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct TimerFileConfig {
    work_secs: Option<u32>,
    break_secs: Option<u32>,
}

/// `[theme]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ThemeFileConfig {
    policy: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the store document. `None` means the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,
    /// Store document name inside `data_dir`.
    pub namespace: String,
    /// Work session length in seconds.
    pub work_secs: u32,
    /// Break session length in seconds.
    pub break_secs: u32,
    /// How the display theme is chosen.
    pub theme_policy: ThemePolicy,
    /// Whether the system asks for a dark theme.
    pub prefers_dark: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            namespace: "local".to_string(),
            work_secs: DEFAULT_WORK_SECS,
            break_secs: DEFAULT_BREAK_SECS,
            theme_policy: ThemePolicy::Toggle,
            prefers_dark: false,
        }
    }
}

impl AppConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an
    /// error. Otherwise the default path is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed,
    /// or if a setting is out of range.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve an `AppConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let work_secs = file.timer.work_secs.unwrap_or(defaults.work_secs);
        if work_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timer.work_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        let break_secs = file.timer.break_secs.unwrap_or(defaults.break_secs);
        if break_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timer.break_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        let theme_policy = match &file.theme.policy {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidValue {
                field: "theme.policy",
                reason,
            })?,
            None => defaults.theme_policy,
        };

        let namespace = file
            .storage
            .namespace
            .clone()
            .unwrap_or(defaults.namespace);
        if namespace.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.namespace",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| file.storage.data_dir.clone()),
            namespace,
            work_secs,
            break_secs,
            theme_policy,
            prefers_dark: cli.prefers_dark,
        })
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Local task list with a work/break timer")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/taskmate/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the task data (default: platform data directory).
    #[arg(long, env = "TASKMATE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Treat the system theme preference as dark.
    #[arg(long, env = "TASKMATE_PREFERS_DARK")]
    pub prefers_dark: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKMATE_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskmate.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// What to do. Lists all tasks when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Host subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show tasks.
    List {
        /// Which tasks to show.
        #[arg(long, value_enum, default_value_t)]
        status: StatusFilter,
        /// Display order.
        #[arg(long, value_enum, default_value_t)]
        sort: SortOrder,
    },
    /// Create a task.
    Add {
        /// Task title.
        title: String,
        /// Longer description.
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD).
        #[arg(long)]
        due: Option<NaiveDate>,
        /// high, medium or low.
        #[arg(long)]
        priority: Option<Priority>,
        /// Comma-separated tags.
        #[arg(long)]
        tags: Option<String>,
    },
    /// Change fields of an existing task.
    Edit {
        /// Task id or unique id prefix.
        id: String,
        /// New title.
        #[arg(long)]
        title: Option<String>,
        /// New description.
        #[arg(long)]
        description: Option<String>,
        /// New due date (YYYY-MM-DD).
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        /// Remove the due date.
        #[arg(long)]
        clear_due: bool,
        /// New priority.
        #[arg(long)]
        priority: Option<Priority>,
        /// Replacement comma-separated tags.
        #[arg(long)]
        tags: Option<String>,
    },
    /// Flip a task between pending and completed.
    Toggle {
        /// Task id or unique id prefix.
        id: String,
    },
    /// Remove a task.
    Delete {
        /// Task id or unique id prefix.
        id: String,
    },
    /// Run the work/break timer, printing every tick.
    Timer {
        /// Stop after printing this many timer updates (default: run until
        /// Ctrl-C).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        ticks: Option<u32>,
    },
    /// Show or toggle the display theme.
    Theme {
        /// Switch to the other theme.
        #[arg(long)]
        toggle: bool,
    },
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    read_optional_config(config_dir.join("taskmate").join("config.toml"))
}

/// Parse the config file at `path`, treating a missing file as empty config.
fn read_optional_config(path: PathBuf) -> Result<ConfigFile, ConfigError> {
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
