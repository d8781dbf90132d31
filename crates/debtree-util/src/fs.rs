use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// List the regular files in `dir` whose names end with `.{extension}`.
///
/// Returns bare file names, sorted. Subdirectories are not searched.
pub fn files_with_extension(dir: &Path, extension: &str) -> std::io::Result<BTreeSet<String>> {
    let suffix = format!(".{extension}");
    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(&suffix) {
            names.insert(name);
        }
    }
    Ok(names)
}

/// Find files in `dir` named `{prefix}*.{extension}`.
pub fn find_with_prefix(dir: &Path, prefix: &str, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    Ok(files_with_extension(dir, extension)?
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .map(|name| dir.join(name))
        .collect())
}
