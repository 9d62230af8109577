//! Raw configuration schema.
//!
//! These types exist for deserialization only. Nothing here is validated
//! beyond TOML shape; [`crate::policy::PolicyTable::resolve`] turns a
//! [`RawConfig`] into the strongly typed policy.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level `patvet.toml` contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Error budget. `None` falls back to the default of 30.
    #[serde(default)]
    pub choke: Option<usize>,

    /// Checker registry source.
    #[serde(default)]
    pub checkers: Vec<RawChecker>,

    /// Global allow-list of checker names.
    #[serde(default)]
    pub enabled: Option<Vec<String>>,

    /// Global deny-list of checker names.
    #[serde(default)]
    pub disabled: Option<Vec<String>>,

    /// Project-relative paths excluded from scheduling.
    #[serde(default)]
    pub ignored: Vec<String>,

    /// Per-path policy overrides.
    #[serde(default, rename = "override")]
    pub overrides: Vec<RawOverride>,
}

impl RawConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// One `[[checkers]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawChecker {
    /// Unique checker name.
    pub name: String,
    /// Pattern source handed to the pattern compiler.
    pub pattern: String,
    /// Message reported for each match.
    pub message: String,
}

/// One `[[override]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOverride {
    /// Project-relative directory target.
    #[serde(default)]
    pub package: Option<String>,
    /// Project-relative file target.
    #[serde(default)]
    pub file: Option<String>,
    /// Allow-list for the target.
    #[serde(default)]
    pub enabled: Option<Vec<String>>,
    /// Deny-list for the target.
    #[serde(default)]
    pub disabled: Option<Vec<String>>,
}

/// Configuration file errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RawConfig::default();
        assert!(config.choke.is_none());
        assert!(config.checkers.is_empty());
        assert!(config.enabled.is_none());
        assert!(config.disabled.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
choke = 10
enabled = ["no-unwrap"]
ignored = ["src/generated"]

[[checkers]]
name = "no-unwrap"
pattern = "method-call(unwrap)"
message = "avoid unwrap"

[[override]]
file = "src/main.rs"
disabled = ["no-unwrap"]
"#;

        let config = RawConfig::parse(toml).expect("Failed to parse");
        assert_eq!(config.choke, Some(10));
        assert_eq!(config.checkers.len(), 1);
        assert_eq!(config.checkers[0].pattern, "method-call(unwrap)");
        assert_eq!(config.enabled, Some(vec!["no-unwrap".to_string()]));
        assert_eq!(config.ignored, vec!["src/generated".to_string()]);
        assert_eq!(config.overrides.len(), 1);
        assert_eq!(config.overrides[0].file.as_deref(), Some("src/main.rs"));
        assert!(config.overrides[0].package.is_none());
    }

    #[test]
    fn empty_list_counts_as_set() {
        let config = RawConfig::parse("enabled = []").expect("Failed to parse");
        assert_eq!(config.enabled, Some(vec![]));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = RawConfig::parse("chokes = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn checker_without_pattern_is_rejected() {
        let toml = r#"
[[checkers]]
name = "x"
message = "m"
"#;
        assert!(RawConfig::parse(toml).is_err());
    }
}
