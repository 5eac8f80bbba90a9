//! Configuration loading and discovery for `fmpal.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::FmpalConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Config file name looked up while walking up from the working directory.
pub const CONFIG_FILE_NAME: &str = "fmpal.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse fmpal.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override project id
    pub id: Option<String>,
    /// Override project display name
    pub name: Option<String>,
    /// Override template URL
    pub template_url: Option<String>,
    /// Override local template file
    pub template_path: Option<PathBuf>,
    /// Override directory recursion depth
    pub max_depth: Option<usize>,
    /// Override preview scale
    pub scale: Option<u8>,
    /// Enable strict orphan checks
    pub strict: Option<bool>,
}

/// Find fmpal.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for fmpal.toml
/// 2. Check XDG_CONFIG_HOME/fmpalette/fmpal.toml (or ~/.config/fmpalette/fmpal.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find fmpal.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("fmpalette").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find fmpal.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit path must exist. Without one, [`find_config`] locates the
/// file, and when nothing is found the defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<FmpalConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(FmpalConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<FmpalConfig, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let contents = fs::read_to_string(path)?;
    let mut config: FmpalConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    // A relative template path is relative to the config file
    if let (Some(template), Some(root)) = (config.template.path.as_ref(), project_root(path)) {
        config.template.path = Some(resolve_path(root, template));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. A template URL
/// given on the command line also clears any configured template path.
pub fn merge_cli_overrides(config: &mut FmpalConfig, overrides: &CliOverrides) {
    if let Some(ref id) = overrides.id {
        config.project.id = id.clone();
    }
    if let Some(ref name) = overrides.name {
        config.project.name = name.clone();
    }

    if let Some(ref url) = overrides.template_url {
        config.template.url = url.clone();
        config.template.path = None;
    }
    if let Some(ref path) = overrides.template_path {
        config.template.path = Some(path.clone());
    }

    if let Some(max_depth) = overrides.max_depth {
        config.scan.max_depth = max_depth;
    }
    if let Some(scale) = overrides.scale {
        config.preview.scale = scale;
    }
    if let Some(strict) = overrides.strict {
        config.scan.strict = strict;
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
