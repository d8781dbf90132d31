//! Operation: show the packages parsed from a `dpkg -l` listing.

use std::path::Path;

use debtree_core::reference::ReferenceSet;

/// One `name version` line per installed package, sorted by name.
pub fn render(reference: &ReferenceSet) -> String {
    let width = reference.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    reference
        .iter()
        .map(|(name, version)| format!("{name:<width$}  {version}\n"))
        .collect()
}

pub fn installed(path: &Path) -> miette::Result<()> {
    let reference = ReferenceSet::from_path(path)?;
    if reference.is_empty() {
        debtree_util::progress::status_warn(
            "Warning",
            &format!("no installed (`ii`) packages in {}", path.display()),
        );
        return Ok(());
    }
    print!("{}", render(&reference));
    Ok(())
}
