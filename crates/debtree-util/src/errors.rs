use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all debtree operations.
#[derive(Debug, Error, Diagnostic)]
pub enum DebError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A package could not be located or downloaded, or the lookup was ambiguous.
    #[error("Package '{name}' is unavailable: {reason}")]
    #[diagnostic(help("Check the package name, or pass a path to a local .deb file"))]
    ArtifactUnavailable { name: String, reason: String },

    /// No archive member or entry matched the requested name.
    #[error("{}: no member matching '{pattern}'", .path.display())]
    NotFound { path: PathBuf, pattern: String },

    /// The member name carries a compression suffix we cannot decode.
    #[error("{}: unsupported compression for member '{member}'", .path.display())]
    #[diagnostic(help("Supported control archives: control.tar, .gz, .xz, .lzma, .zst"))]
    UnsupportedCodec { path: PathBuf, member: String },

    /// The binary container is structurally invalid.
    #[error("{}: corrupt archive: {reason}", .path.display())]
    CorruptArchive { path: PathBuf, reason: String },

    /// Control text does not follow the field grammar.
    #[error("Malformed control record ({context}): {message}")]
    MalformedRecord { context: String, message: String },

    /// A dependency clause does not have the `name (op version)` shape.
    #[error("Invalid dependency constraint: '{entry}'")]
    InvalidConstraintSyntax { entry: String },

    /// A constraint uses an operator outside the fixed set.
    #[error("Unknown version operator '{operator}'")]
    #[diagnostic(help("Valid operators: <=, >=, <<, <, >>, >, ==, =, !=, <>"))]
    UnknownOperator { operator: String },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.debtree/config.toml for syntax errors"))]
    Config { message: String },

    /// An external process could not be spawned.
    #[error("Process error: {message}")]
    Process { message: String },
}

impl DebError {
    /// Prefix the context of a [`DebError::MalformedRecord`] (e.g. with the
    /// artifact path); other variants pass through.
    pub fn with_context(self, outer: impl std::fmt::Display) -> Self {
        match self {
            DebError::MalformedRecord { context, message } => DebError::MalformedRecord {
                context: format!("{outer}, {context}"),
                message,
            },
            other => other,
        }
    }
}

/// Convenience alias for results carrying a [`DebError`].
pub type DebResult<T> = Result<T, DebError>;
