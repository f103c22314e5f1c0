//! Configuration for compose-batch.
//!
//! Settings come from an optional YAML file and are overridden by
//! command-line values. Shell expansions like `~` are resolved for paths.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Default path for the optional configuration file
const DEFAULT_CONFIG_PATH: &str = "~/.compose-batch/config.yml";

/// Env file handed to `docker compose`, relative to each project directory
pub const DEFAULT_ENV_FILE: &str = "../secret.env";

/// Default program used to invoke compose
pub const DEFAULT_COMPOSE_PROGRAM: &str = "docker";

/// Marker file that excludes a project from per-project actions
pub const IGNORE_MARKER: &str = ".projectignore";

/// Positional project name equivalent to `--all`
pub const ALL_PROJECTS_TOKEN: &str = "all";

/// Contents of the configuration file. Every key is optional.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    pub root: Option<String>,
    pub env_file: Option<String>,
    /// Program in front of `compose` for per-project actions. Standalone
    /// actions (`prune`, `df`) always run `docker`.
    pub compose_program: Option<String>,
}

/// Shared prefix of every compose-based action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeSettings {
    pub program: String,
    /// `None` omits `--env-file` entirely.
    pub env_file: Option<String>,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_COMPOSE_PROGRAM.to_string(),
            env_file: Some(DEFAULT_ENV_FILE.to_string()),
        }
    }
}

impl ComposeSettings {
    /// Builds the settings from the config file, letting `env_file_arg` win.
    /// An empty env file disables `--env-file`.
    #[must_use]
    pub fn from_config(config: &BatchConfig, env_file_arg: &Option<String>) -> Self {
        let program = config
            .compose_program
            .clone()
            .unwrap_or_else(|| DEFAULT_COMPOSE_PROGRAM.to_string());

        let env_file = env_file_arg
            .clone()
            .or_else(|| config.env_file.clone())
            .unwrap_or_else(|| DEFAULT_ENV_FILE.to_string());

        Self {
            program,
            env_file: (!env_file.is_empty()).then(|| shellexpand::tilde(&env_file).to_string()),
        }
    }

    /// e.g. `docker compose --env-file ../secret.env`
    #[must_use]
    pub fn prefix(&self) -> Vec<String> {
        let mut prefix = vec![self.program.clone(), "compose".to_string()];
        if let Some(env_file) = &self.env_file {
            prefix.push("--env-file".to_string());
            prefix.push(env_file.clone());
        }
        prefix
    }
}

/// Resolves the configuration file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// configuration path. Shell expansions like `~` are resolved.
pub fn get_config_path(config_path_arg: &Option<String>) -> String {
    let config_path = match config_path_arg {
        Some(config_path) => config_path,
        None => DEFAULT_CONFIG_PATH,
    };

    shellexpand::tilde(config_path).to_string()
}

/// Loads the configuration file.
///
/// A missing file at the default location yields the default config, but a
/// missing file that was asked for explicitly is an error.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML for
/// [`BatchConfig`].
pub fn load_config(config_path_arg: &Option<String>) -> Result<BatchConfig> {
    let path = get_config_path(config_path_arg);

    if config_path_arg.is_none() && !Path::new(&path).exists() {
        debug!("No config file at `{path}`, using defaults");
        return Ok(BatchConfig::default());
    }

    let contents = fs::read_to_string(&path)
        .map_err(|e| Error::io_error("config file".to_string(), path.clone(), e))?;

    if contents.trim().is_empty() {
        return Ok(BatchConfig::default());
    }

    serde_yaml::from_str(&contents).map_err(|e| {
        Error::yaml_error("reading".to_string(), "config".to_string(), path.clone(), e)
    })
}

/// Resolves the directory that holds the projects.
///
/// The command-line value wins over the config file; without either, the
/// current directory is used.
pub fn get_root_directory(root_arg: &Option<String>, config: &BatchConfig) -> PathBuf {
    let root = root_arg
        .as_deref()
        .or(config.root.as_deref())
        .unwrap_or(".");

    PathBuf::from(shellexpand::tilde(root).to_string())
}
