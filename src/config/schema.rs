//! Configuration schema types for `fmpal.toml`
//!
//! Every section is optional; a missing file behaves like an empty one.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::container::{DEFAULT_ID, DEFAULT_NAME};
use crate::discovery::DEFAULT_MAX_DEPTH;
use crate::template::{TemplateSource, DEFAULT_TEMPLATE_URL};

/// Largest preview upscale factor.
pub const MAX_PREVIEW_SCALE: u8 = 16;

/// Exported project identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project id, also the output filename stem
    #[serde(default = "default_id")]
    pub id: String,
    /// Display name
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_id() -> String {
    DEFAULT_ID.to_string()
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { id: default_id(), name: default_name() }
    }
}

/// Where the template container comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Template URL
    #[serde(default = "default_url")]
    pub url: String,
    /// Local template file, takes precedence over `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_url() -> String {
    DEFAULT_TEMPLATE_URL.to_string()
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self { url: default_url(), path: None }
    }
}

impl TemplateConfig {
    pub fn source(&self) -> TemplateSource {
        match &self.path {
            Some(path) => TemplateSource::File(path.clone()),
            None => TemplateSource::Url(self.url.clone()),
        }
    }
}

/// Project directory scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directories to descend below the project root
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Extra filename globs ignored by orphan checks
    #[serde(default)]
    pub allow: Vec<String>,
    /// Treat orphan files as fatal
    #[serde(default)]
    pub strict: bool,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { max_depth: default_max_depth(), allow: Vec::new(), strict: false }
    }
}

/// Preview rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Nearest-neighbor upscale factor
    #[serde(default = "default_scale")]
    pub scale: u8,
}

fn default_scale() -> u8 {
    1
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { scale: default_scale() }
    }
}

/// Complete fmpal.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FmpalConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "preview.scale")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fmpal.toml: '{}' {}", self.field, self.message)
    }
}

impl ConfigValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl FmpalConfig {
    /// Validate the configuration and return every error
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.project.id.is_empty() {
            errors.push(ConfigValidationError::new("project.id", "must be a non-empty string"));
        } else if self.project.id.contains(['/', '\\']) {
            errors.push(ConfigValidationError::new("project.id", "must not contain path separators"));
        }
        if self.project.name.is_empty() {
            errors.push(ConfigValidationError::new("project.name", "must be a non-empty string"));
        }

        if self.template.path.is_none() && self.template.url.is_empty() {
            errors.push(ConfigValidationError::new("template.url", "must be set when no path is given"));
        }

        for pattern in &self.scan.allow {
            if let Err(e) = glob::Pattern::new(pattern) {
                errors.push(ConfigValidationError::new(
                    "scan.allow",
                    format!("'{}' is not a valid glob: {}", pattern, e),
                ));
            }
        }

        if self.preview.scale == 0 || self.preview.scale > MAX_PREVIEW_SCALE {
            errors.push(ConfigValidationError::new(
                "preview.scale",
                format!("must be between 1 and {}", MAX_PREVIEW_SCALE),
            ));
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Allowlist globs that passed validation.
    pub fn allow_patterns(&self) -> Vec<glob::Pattern> {
        self.scan.allow.iter().filter_map(|p| glob::Pattern::new(p).ok()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: FmpalConfig = toml::from_str("").unwrap();
        assert_eq!(config, FmpalConfig::default());
        assert_eq!(config.project.id, "paletteeditor");
        assert_eq!(config.project.name, "Palette Editor");
        assert_eq!(config.template.url, DEFAULT_TEMPLATE_URL);
        assert_eq!(config.scan.max_depth, 32);
        assert_eq!(config.preview.scale, 1);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[project]
id = "mymod"
name = "My Mod"

[template]
path = "build/paletteeditor.fra"

[scan]
max_depth = 2
allow = ["*.txt", "notes/*"]
strict = true

[preview]
scale = 4
"#;
        let config: FmpalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.project.id, "mymod");
        assert_eq!(config.scan.max_depth, 2);
        assert_eq!(config.scan.allow.len(), 2);
        assert!(config.scan.strict);
        assert_eq!(config.preview.scale, 4);
        assert_eq!(
            config.template.source(),
            TemplateSource::File(PathBuf::from("build/paletteeditor.fra"))
        );
        assert_eq!(config.allow_patterns().len(), 2);
    }

    #[test]
    fn test_template_source_defaults_to_url() {
        assert_eq!(
            TemplateConfig::default().source(),
            TemplateSource::Url(DEFAULT_TEMPLATE_URL.to_string())
        );
    }

    #[test]
    fn test_validate_collects_every_error() {
        let config = FmpalConfig {
            project: ProjectConfig { id: String::new(), name: String::new() },
            template: TemplateConfig { url: String::new(), path: None },
            scan: ScanConfig { allow: vec!["[".to_string()], ..ScanConfig::default() },
            preview: PreviewConfig { scale: 0 },
        };
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            ["project.id", "project.name", "template.url", "scan.allow", "preview.scale"]
        );
    }

    #[test]
    fn test_validate_scale_upper_bound() {
        let mut config = FmpalConfig::default();
        config.preview.scale = 17;
        assert!(!config.is_valid());
        config.preview.scale = 16;
        assert!(config.is_valid());
    }

    #[test]
    fn test_validate_project_id_path_separator() {
        let mut config = FmpalConfig::default();
        config.project.id = "../escape".to_string();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "fmpal.toml: 'project.id' must not contain path separators");
    }

    #[test]
    fn test_unknown_sections_are_ignored() {
        let config: FmpalConfig = toml::from_str("[future]\nkey = 1\n").unwrap();
        assert!(config.is_valid());
    }
}
