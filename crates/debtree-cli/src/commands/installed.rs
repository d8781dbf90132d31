//! Handler for `debtree installed`.

use std::path::Path;

use miette::Result;

pub fn exec(file: &Path) -> Result<()> {
    debtree_ops::ops_installed::installed(file)
}
