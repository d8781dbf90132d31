//! Shared utilities for debtree.
//!
//! This crate provides cross-cutting concerns used by all other debtree crates:
//! the unified error type, filesystem helpers, external process spawning,
//! and terminal status output.

pub mod errors;
pub mod fs;
pub mod process;
pub mod progress;

use std::path::{Path, PathBuf};

/// Returns the path to the debtree data directory (`~/.debtree/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".debtree")
}
