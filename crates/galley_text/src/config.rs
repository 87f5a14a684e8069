//! Layout configuration (galley.toml)

use std::path::{Path, PathBuf};

use galley_core::{WritingMode, Whitespace, Wrap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level layout configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub writing_mode: WritingMode,
    #[serde(default)]
    pub whitespace: Whitespace,
    /// Wrap option for phrases that do not set one
    #[serde(default)]
    pub wrap: Wrap,
    /// Limit on embedding/annotation nesting
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
    #[serde(default)]
    pub fonts: FontsConfig,
}

fn default_max_nesting_depth() -> usize {
    16
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            writing_mode: WritingMode::default(),
            whitespace: Whitespace::default(),
            wrap: Wrap::default(),
            max_nesting_depth: default_max_nesting_depth(),
            fonts: FontsConfig::default(),
        }
    }
}

/// Font discovery configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FontsConfig {
    /// Extra directories scanned for font files
    #[serde(default)]
    pub directories: Vec<PathBuf>,
    #[serde(default = "default_true")]
    pub load_system_fonts: bool,
    #[serde(default = "default_family")]
    pub default_family: String,
    #[serde(default = "default_size")]
    pub default_size: f64,
}

fn default_true() -> bool {
    true
}

fn default_family() -> String {
    "sans-serif".to_string()
}

fn default_size() -> f64 {
    16.0
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            load_system_fonts: true,
            default_family: default_family(),
            default_size: default_size(),
        }
    }
}

impl LayoutConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LayoutConfig::from_toml_str("").unwrap();
        assert_eq!(config, LayoutConfig::default());
        assert_eq!(config.max_nesting_depth, 16);
        assert!(config.fonts.load_system_fonts);
        assert_eq!(config.fonts.default_family, "sans-serif");
    }

    #[test]
    fn test_parse_sections() {
        let config = LayoutConfig::from_toml_str(
            r#"
            writing_mode = "tb-rl"
            whitespace = "preserve"
            wrap = "no-wrap"

            [fonts]
            directories = ["/usr/share/fonts/noto"]
            load_system_fonts = false
            default_size = 24.0
            "#,
        )
        .unwrap();
        assert_eq!(config.writing_mode, WritingMode::TbRl);
        assert_eq!(config.whitespace, Whitespace::Preserve);
        assert_eq!(config.wrap, Wrap::NoWrap);
        assert_eq!(config.fonts.directories.len(), 1);
        assert!(!config.fonts.load_system_fonts);
        assert_eq!(config.fonts.default_size, 24.0);
        assert_eq!(config.fonts.default_family, "sans-serif");
    }

    #[test]
    fn test_invalid_value_is_parse_error() {
        let err = LayoutConfig::from_toml_str("wrap = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_to_toml_reloads() {
        let mut config = LayoutConfig::default();
        config.max_nesting_depth = 4;
        let text = config.to_toml().unwrap();
        assert_eq!(LayoutConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_default_field_names() {
        let value = serde_json::to_value(LayoutConfig::default()).unwrap();
        assert_eq!(value["writing_mode"], "lr-tb");
        assert_eq!(value["whitespace"], "default");
        assert_eq!(value["fonts"]["default_family"], "sans-serif");
        assert_eq!(value["fonts"]["default_size"], 16.0);
    }

    #[test]
    fn test_missing_file() {
        let err = LayoutConfig::load(Path::new("/nonexistent/galley.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
