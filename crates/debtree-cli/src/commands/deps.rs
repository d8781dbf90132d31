//! Handler for `debtree deps`.

use std::path::{Path, PathBuf};

use miette::Result;

use debtree_ops::ops_deps::{self, DepsOptions};

use crate::cli::{FormatArg, SortArg};

#[allow(clippy::too_many_arguments)]
pub fn exec(
    config_path: Option<&Path>,
    packages: Vec<String>,
    recursive: Option<bool>,
    installed: Option<PathBuf>,
    dir: Option<PathBuf>,
    sort: SortArg,
    format: FormatArg,
    why: Option<String>,
) -> Result<()> {
    let config = debtree_ops::load_config(config_path)?;
    if recursive.is_none() {
        tracing::debug!("recursion from config: {}", config.resolve.recursive);
    }

    let opts = DepsOptions {
        packages,
        recursive,
        installed,
        dir,
        sort: sort.into(),
        format: format.into(),
        why,
    };

    ops_deps::deps(&config, &opts)
}
