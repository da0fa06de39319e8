//! Configuration for tokengraph.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TOKENGRAPH_HOME, TOKENGRAPH_TASKS)
//! 2. Config file (.tokengraph/config.yaml)
//! 3. Defaults (~/.tokengraph)
//!
//! Config file discovery:
//! - Searches current directory and parents for .tokengraph/config.yaml
//! - `paths.home` is relative to the .tokengraph/ directory, `paths.tasks`
//!   to the project root holding it

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::tokenize::DEFAULT_VARIANT;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".tokengraph";
const DEFAULT_CONTENT_TYPE: &str = "text";
const DEFAULT_FILTER: &str = "info";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .tokengraph/)
    pub home: Option<String>,
    /// Task directory (relative to the project root)
    pub tasks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenizerConfig {
    pub variant: Option<String>,
    pub preprocessor: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber` filter directive, e.g. `tokengraph=debug`
    pub filter: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub home: PathBuf,
    /// Directory searched by `tokengraph run <name>`
    pub tasks: PathBuf,
    pub tokenizer: TokenizerSettings,
    pub log_filter: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Tokenizer used by the CLI when no flag overrides it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenizerSettings {
    pub variant: String,
    pub preprocessor: Option<String>,
    pub content_type: String,
}

impl Default for TokenizerSettings {
    fn default() -> Self {
        Self {
            variant: DEFAULT_VARIANT.to_string(),
            preprocessor: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

impl TokenizerSettings {
    fn from_file(config: TokenizerConfig) -> Self {
        let defaults = Self::default();
        Self {
            variant: config.variant.unwrap_or(defaults.variant),
            preprocessor: config.preprocessor,
            content_type: config.content_type.unwrap_or(defaults.content_type),
        }
    }
}

impl ResolvedConfig {
    /// Locate a task by path, or by name inside the tasks directory
    pub fn task_path(&self, task: &str) -> PathBuf {
        let direct = PathBuf::from(task);
        if direct.is_file() {
            return direct;
        }

        let named = self.tasks.join(task);
        if named.extension().is_some() {
            named
        } else {
            named.with_extension("yaml")
        }
    }
}

/// Find config file by searching a directory and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    load_config_from(&cwd)
}

fn load_config_from(start: &Path) -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);

    let config_file = find_config_file(start);

    let (home, tasks, tokenizer, log_filter) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        let config_dir = config_path.parent().unwrap_or(Path::new("."));
        let base_dir = config_dir.parent().unwrap_or(Path::new("."));

        let home = if let Ok(env_home) = std::env::var("TOKENGRAPH_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            resolve_path(config_dir, home_path)
        } else {
            default_home
        };

        let tasks = if let Ok(env_tasks) = std::env::var("TOKENGRAPH_TASKS") {
            PathBuf::from(env_tasks)
        } else if let Some(ref tasks_path) = config.paths.tasks {
            resolve_path(base_dir, tasks_path)
        } else {
            home.join("tasks")
        };

        let log_filter = config
            .logging
            .filter
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        (home, tasks, TokenizerSettings::from_file(config.tokenizer), log_filter)
    } else {
        let home = std::env::var("TOKENGRAPH_HOME")
            .map(PathBuf::from)
            .unwrap_or(default_home);

        let tasks = std::env::var("TOKENGRAPH_TASKS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("tasks"));

        (home, tasks, TokenizerSettings::default(), DEFAULT_FILTER.to_string())
    };

    Ok(ResolvedConfig {
        home,
        tasks,
        tokenizer,
        log_filter,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
