//! Handler for `debtree control`.

use std::path::Path;

use miette::Result;

use debtree_ops::ops_control;

use crate::cli::FormatArg;

pub fn exec(config_path: Option<&Path>, file: &Path, format: FormatArg) -> Result<()> {
    let config = debtree_ops::load_config(config_path)?;
    ops_control::control(&config, file, format.into())
}
