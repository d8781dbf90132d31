use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use debtree_util::errors::{DebError, DebResult};

/// Default pattern for the control member of a `.deb` archive.
pub const DEFAULT_CONTROL_MEMBER: &str = r"^control\.tar(\.[A-Za-z0-9]+)?$";

/// Global user configuration loaded from `~/.debtree/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Dependency walk settings from `[resolve]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default)]
    pub recursive: bool,
    /// Control fields holding dependency declarations, merged in this order.
    #[serde(default = "default_dependency_fields", rename = "dependency-fields")]
    pub dependency_fields: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            dependency_fields: default_dependency_fields(),
        }
    }
}

fn default_dependency_fields() -> Vec<String> {
    vec!["Depends".to_string(), "Pre-Depends".to_string()]
}

/// Package download settings from `[fetch]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Directory searched for, and receiving, `.deb` files.
    #[serde(default = "default_fetch_dir")]
    pub dir: PathBuf,
    /// Download command; the package name is appended as the last argument.
    #[serde(default = "default_fetch_command")]
    pub command: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            dir: default_fetch_dir(),
            command: default_fetch_command(),
        }
    }
}

fn default_fetch_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_fetch_command() -> Vec<String> {
    vec!["apt-get".to_string(), "download".to_string()]
}

/// Archive extraction settings from `[extract]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_control_member", rename = "control-member")]
    pub control_member: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            control_member: default_control_member(),
        }
    }
}

fn default_control_member() -> String {
    DEFAULT_CONTROL_MEMBER.to_string()
}

impl GlobalConfig {
    /// Load the global configuration from `~/.debtree/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> DebResult<Self> {
        let path = Self::default_path();
        if path.is_file() {
            Self::from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn from_path(path: &Path) -> DebResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DebError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| DebError::Config {
            message: format!("Failed to parse {}: {e}", path.display()),
        })?;
        config.validate()?;
        tracing::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> DebResult<()> {
        if self.fetch.command.is_empty() {
            return Err(DebError::Config {
                message: "[fetch] command must not be empty".to_string(),
            });
        }
        if let Err(e) = regex::Regex::new(&self.extract.control_member) {
            return Err(DebError::Config {
                message: format!("[extract] control-member is not a valid pattern: {e}"),
            });
        }
        Ok(())
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        debtree_util::dirs_path().join("config.toml")
    }
}
