//! Locating and loading the checker configuration.
//!
//! Candidates, first hit wins:
//!
//! 1. `--config <path>`
//! 2. `<root>/patvet.toml`, then `<root>/.patvet.toml`
//! 3. `$PATVET_CONFIG_DIR/config.toml`, or `~/.patvet/config.toml`
//! 4. the built-in default (no checkers, choke 30)

use std::fmt;
use std::path::{Path, PathBuf};

use patvet_core::{ConfigError, RawConfig};

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["patvet.toml", ".patvet.toml"];

/// Config file name inside the user config directory.
const USER_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the user config directory.
pub const CONFIG_DIR_ENV: &str = "PATVET_CONFIG_DIR";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`; not checked for existence.
    Explicit(PathBuf),
    /// Found in the project root.
    Project(PathBuf),
    /// Found in the user config directory.
    User(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::User(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads and parses the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is not a valid
    /// configuration.
    pub fn load(&self) -> Result<RawConfig, ConfigError> {
        match self.path() {
            Some(path) => RawConfig::from_file(path),
            None => Ok(RawConfig::new()),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Project(p) => write!(f, "{} (project)", p.display()),
            Self::User(p) => write!(f, "{} (user)", p.display()),
            Self::Default => f.write_str("built-in defaults"),
        }
    }
}

/// Resolves the configuration source for a project rooted at `root`.
#[must_use]
pub fn resolve(root: &Path, explicit: Option<&Path>) -> ConfigSource {
    find(root, explicit, user_config_dir().as_deref())
}

fn find(root: &Path, explicit: Option<&Path>, user_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Some(path) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|candidate| candidate.is_file())
    {
        return ConfigSource::Project(path);
    }

    user_dir
        .map(|dir| dir.join(USER_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::User)
}

/// Returns the user config directory: `$PATVET_CONFIG_DIR`, else `~/.patvet`.
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home::home_dir().map(|h| h.join(".patvet")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn explicit_wins_and_is_trusted_as_is() {
        let project = TempDir::new().unwrap();
        touch(project.path(), "patvet.toml", "");

        let result = find(project.path(), Some(Path::new("/nowhere.toml")), None);
        assert_eq!(result, ConfigSource::Explicit(PathBuf::from("/nowhere.toml")));
    }

    #[test]
    fn plain_name_preferred_over_dotfile() {
        let project = TempDir::new().unwrap();
        let plain = touch(project.path(), "patvet.toml", "");
        touch(project.path(), ".patvet.toml", "");

        assert_eq!(find(project.path(), None, None), ConfigSource::Project(plain));
    }

    #[test]
    fn dotfile_found_alone() {
        let project = TempDir::new().unwrap();
        let dot = touch(project.path(), ".patvet.toml", "");

        assert_eq!(find(project.path(), None, None), ConfigSource::Project(dot));
    }

    #[test]
    fn user_config_is_the_fallback() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let config = touch(user.path(), "config.toml", "");

        assert_eq!(
            find(project.path(), None, Some(user.path())),
            ConfigSource::User(config)
        );
    }

    #[test]
    fn project_shadows_user_config() {
        let project = TempDir::new().unwrap();
        touch(project.path(), "patvet.toml", "");
        let user = TempDir::new().unwrap();
        touch(user.path(), "config.toml", "");

        assert!(matches!(
            find(project.path(), None, Some(user.path())),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn nothing_found_is_default() {
        let project = TempDir::new().unwrap();
        let empty_user = TempDir::new().unwrap();

        assert_eq!(
            find(project.path(), None, Some(empty_user.path())),
            ConfigSource::Default
        );
        assert!(ConfigSource::Default.path().is_none());
    }

    #[test]
    fn default_loads_an_empty_config() {
        let raw = ConfigSource::Default.load().unwrap();
        assert!(raw.checkers.is_empty());
        assert_eq!(raw.choke, None);
    }

    #[test]
    fn load_reads_the_resolved_file() {
        let project = TempDir::new().unwrap();
        touch(
            project.path(),
            "patvet.toml",
            "choke = 5\n[[checkers]]\nname = \"a\"\npattern = \"fn\"\nmessage = \"m\"\n",
        );

        let raw = find(project.path(), None, None).load().unwrap();
        assert_eq!(raw.choke, Some(5));
        assert_eq!(raw.checkers.len(), 1);
    }

    #[test]
    fn load_surfaces_missing_explicit_file() {
        let result = ConfigSource::Explicit(PathBuf::from("/definitely/missing.toml")).load();
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
