//! Decoder-level errors, turned into [`DebError`]s once the artifact path is known.

use std::path::Path;

use debtree_util::errors::DebError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Corrupt(String),

    #[error("unsupported compression for member '{0}'")]
    UnsupportedCodec(String),
}

impl FormatError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        FormatError::Corrupt(reason.into())
    }

    /// Attach the artifact path. Truncated reads count as corruption.
    pub fn at(self, path: &Path) -> DebError {
        match self {
            FormatError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                DebError::CorruptArchive {
                    path: path.to_path_buf(),
                    reason: "unexpected end of file".to_string(),
                }
            }
            FormatError::Io(e) => DebError::Io(e),
            FormatError::Corrupt(reason) => DebError::CorruptArchive {
                path: path.to_path_buf(),
                reason,
            },
            FormatError::UnsupportedCodec(member) => DebError::UnsupportedCodec {
                path: path.to_path_buf(),
                member,
            },
        }
    }
}
