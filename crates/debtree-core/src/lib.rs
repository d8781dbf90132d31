//! Core data types for debtree.
//!
//! This crate defines the pieces that describe a Debian package independently
//! of where it came from: loose version ordering and constraints, the
//! control-record parser, the dependency grammar, the `dpkg -l` reference-set
//! loader, and global configuration.
//!
//! This crate performs no archive decoding and no network or process I/O.

/// Name of the control field holding the canonical package name.
pub const PACKAGE_FIELD: &str = "Package";

pub mod config;
pub mod control;
pub mod dependency;
pub mod reference;
pub mod version;
