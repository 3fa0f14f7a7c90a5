// src/config.rs

//! Configuration loading.
//!
//! Priority (highest to lowest):
//! 1. `--config <PATH>`
//! 2. `.scrolly.toml` in the working directory
//! 3. Built-in defaults

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = ".scrolly.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// `owner/name` used to build commit links
    pub repository: String,
    pub layout: LayoutConfig,
    pub scroll: ScrollConfig,
    pub transitions: TransitionConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: "YOUR_REPO".to_string(),
            layout: LayoutConfig::default(),
            scroll: ScrollConfig::default(),
            transitions: TransitionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Pixel geometry of the scatterplot surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            margin: Margin::default(),
        }
    }
}

impl LayoutConfig {
    /// Width of the plot area inside the margins.
    pub fn plot_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn plot_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 30.0,
            bottom: 70.0,
            left: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    #[serde(deserialize_with = "commit_list")]
    pub commits: ListConfig,
    #[serde(deserialize_with = "file_list")]
    pub files: ListConfig,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            commits: ListConfig::commits(),
            files: ListConfig::files(),
        }
    }
}

/// One virtualized narrative list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ListConfig {
    pub item_height: f64,
    pub visible_count: usize,
    pub debounce_ms: u64,
}

impl ListConfig {
    pub fn commits() -> Self {
        Self {
            item_height: 100.0,
            visible_count: 10,
            debounce_ms: 300,
        }
    }

    pub fn files() -> Self {
        Self {
            item_height: 30.0,
            visible_count: 10,
            debounce_ms: 200,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// A list section as written in the file; absent keys keep the list's own
/// default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListOverrides {
    item_height: Option<f64>,
    visible_count: Option<usize>,
    debounce_ms: Option<u64>,
}

impl ListOverrides {
    fn over(self, base: ListConfig) -> ListConfig {
        ListConfig {
            item_height: self.item_height.unwrap_or(base.item_height),
            visible_count: self.visible_count.unwrap_or(base.visible_count),
            debounce_ms: self.debounce_ms.unwrap_or(base.debounce_ms),
        }
    }
}

fn commit_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ListConfig, D::Error> {
    ListOverrides::deserialize(deserializer).map(|o| o.over(ListConfig::commits()))
}

fn file_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ListConfig, D::Error> {
    ListOverrides::deserialize(deserializer).map(|o| o.over(ListConfig::files()))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransitionConfig {
    pub enter_ms: u64,
    pub update_ms: u64,
    pub exit_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            enter_ms: 200,
            update_ms: 200,
            exit_ms: 200,
        }
    }
}

impl TransitionConfig {
    pub fn enter(&self) -> Duration {
        Duration::from_millis(self.enter_ms)
    }

    pub fn update(&self) -> Duration {
        Duration::from_millis(self.update_ms)
    }

    pub fn exit(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }

    pub fn longest(&self) -> Duration {
        self.enter().max(self.update()).max(self.exit())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads `explicit` if given, else `.scrolly.toml` in `cwd` if present,
    /// else the defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let local = cwd.join(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(&local)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.plot_width() <= 0.0 || self.layout.plot_height() <= 0.0 {
            return Err(ConfigError::Invalid(
                "layout margins leave no room for the plot".to_string(),
            ));
        }
        for (name, list) in [("commits", &self.scroll.commits), ("files", &self.scroll.files)] {
            if list.visible_count == 0 {
                return Err(ConfigError::Invalid(format!(
                    "scroll.{name}.visible_count must be at least 1"
                )));
            }
            if list.item_height <= 0.0 || !list.item_height.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "scroll.{name}.item_height must be positive"
                )));
            }
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "logging.level `{}` is not one of error, warn, info, debug, trace",
                self.logging.level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_page_layout() {
        let config = Config::default();
        assert_eq!(config.layout.plot_width(), 900.0);
        assert_eq!(config.layout.plot_height(), 480.0);
        assert_eq!(config.scroll.commits.debounce_ms, 300);
        assert_eq!(config.scroll.files.debounce_ms, 200);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "repository = \"me/site\"\n[layout]\nwidth = 800.0\n",
        )
        .unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.repository, "me/site");
        assert_eq!(config.layout.width, 800.0);
        assert_eq!(config.layout.height, 600.0);
        assert_eq!(config.scroll, ScrollConfig::default());
    }

    #[test]
    fn missing_local_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load(None, dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn rejects_zero_visible_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.toml");
        std::fs::write(
            &path,
            "[scroll.files]\nitem_height = 30.0\nvisible_count = 0\ndebounce_ms = 200\n",
        )
        .unwrap();
        let err = Config::load(Some(&path), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn partial_list_section_keeps_that_lists_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[scroll.commits]\nvisible_count = 5\n\n[scroll.files]\ndebounce_ms = 50\n",
        )
        .unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.scroll.commits.visible_count, 5);
        assert_eq!(config.scroll.commits.item_height, 100.0);
        assert_eq!(config.scroll.commits.debounce_ms, 300);
        assert_eq!(config.scroll.files.debounce_ms, 50);
        assert_eq!(config.scroll.files.item_height, 30.0);
        assert_eq!(config.scroll.files.visible_count, 10);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.toml");
        std::fs::write(&path, "[logging]\nlevel = \"verbose\"\n").unwrap();
        let err = Config::load(Some(&path), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("verbose")));

        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(Config::load(Some(&path), dir.path()).unwrap().logging.level, "debug");
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "layout = 3").unwrap();
        let err = Config::load(Some(&path), dir.path()).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
