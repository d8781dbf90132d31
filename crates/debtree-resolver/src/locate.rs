//! Finding the `.deb` file for a package name, downloading it if needed.

use std::path::{Path, PathBuf};

use debtree_core::config::FetchConfig;
use debtree_util::errors::{DebError, DebResult};
use debtree_util::fs::{ensure_dir, files_with_extension, find_with_prefix};
use debtree_util::process::CommandBuilder;

/// Maps a package name to a local `.deb` path.
pub trait ArtifactLocator {
    fn locate_or_fetch(&self, name: &str) -> DebResult<PathBuf>;
}

/// Look for exactly one `<name>_*.deb` in `dir`.
///
/// `Ok(None)` when there is no candidate; more than one is ambiguous.
fn find_local(dir: &Path, name: &str) -> DebResult<Option<PathBuf>> {
    let mut candidates = find_with_prefix(dir, &format!("{name}_"), "deb")?;
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop()),
        n => Err(DebError::ArtifactUnavailable {
            name: name.to_string(),
            reason: format!("ambiguous: {n} candidate files in {}", dir.display()),
        }),
    }
}

/// Uses `.deb` files already in a directory and otherwise downloads with an
/// external command (by default `apt-get download <name>`) run in that directory.
#[derive(Debug, Clone)]
pub struct AptLocator {
    dir: PathBuf,
    command: Vec<String>,
}

impl AptLocator {
    pub fn new(dir: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            command,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.dir.clone(), config.command.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn fetch(&self, name: &str) -> DebResult<PathBuf> {
        let unavailable = |reason: String| DebError::ArtifactUnavailable {
            name: name.to_string(),
            reason,
        };

        ensure_dir(&self.dir)?;
        let before = files_with_extension(&self.dir, "deb")?;
        let cmd = CommandBuilder::from_argv(&self.command)
            .ok_or_else(|| DebError::Config {
                message: "[fetch] command must not be empty".to_string(),
            })?
            .arg(name)
            .cwd(&self.dir);

        tracing::info!("fetching {name} with `{}`", cmd.display());
        let output = cmd.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(unavailable(format!(
                "`{}` failed ({}): {}",
                cmd.display(),
                output.status,
                stderr.trim()
            )));
        }

        let after = files_with_extension(&self.dir, "deb")?;
        let mut new_files: Vec<&String> = after.difference(&before).collect();
        match new_files.len() {
            1 => {
                let file = new_files.remove(0);
                tracing::debug!("fetched {name} as {file}");
                Ok(self.dir.join(file))
            }
            0 => Err(unavailable(format!(
                "`{}` produced no new .deb file in {}",
                cmd.display(),
                self.dir.display()
            ))),
            n => Err(unavailable(format!(
                "`{}` produced {n} new .deb files in {}",
                cmd.display(),
                self.dir.display()
            ))),
        }
    }
}

impl ArtifactLocator for AptLocator {
    fn locate_or_fetch(&self, name: &str) -> DebResult<PathBuf> {
        if !self.dir.is_dir() {
            return self.fetch(name);
        }
        if let Some(path) = find_local(&self.dir, name)? {
            tracing::debug!("using existing {}", path.display());
            return Ok(path);
        }
        self.fetch(name)
    }
}

/// Only looks at `.deb` files already in a directory; never downloads.
#[derive(Debug, Clone)]
pub struct LocalLocator {
    dir: PathBuf,
}

impl LocalLocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactLocator for LocalLocator {
    fn locate_or_fetch(&self, name: &str) -> DebResult<PathBuf> {
        find_local(&self.dir, name)?.ok_or_else(|| DebError::ArtifactUnavailable {
            name: name.to_string(),
            reason: format!("no {name}_*.deb in {}", self.dir.display()),
        })
    }
}
