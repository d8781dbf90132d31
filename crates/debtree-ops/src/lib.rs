pub mod ops_control;
pub mod ops_deps;
pub mod ops_installed;

use std::path::Path;

use debtree_core::config::GlobalConfig;
use debtree_util::errors::DebResult;

/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Load `path` if given, else `~/.debtree/config.toml` (or defaults when it doesn't exist).
pub fn load_config(path: Option<&Path>) -> DebResult<GlobalConfig> {
    match path {
        Some(path) => GlobalConfig::from_path(path),
        None => GlobalConfig::load(),
    }
}
