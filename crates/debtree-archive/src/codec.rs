use std::borrow::Cow;
use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::FormatError;

/// Compression of an archive member, derived from its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Plain,
    Gzip,
    Xz,
    Lzma,
    Zstd,
}

impl Codec {
    /// `control.tar` → plain, `control.tar.gz` → gzip, and so on.
    pub fn from_member_name(name: &str) -> Result<Self, FormatError> {
        let suffix = name.rsplit_once('.').map_or("", |(_, ext)| ext);
        match suffix {
            "tar" => Ok(Codec::Plain),
            "gz" => Ok(Codec::Gzip),
            "xz" => Ok(Codec::Xz),
            "lzma" => Ok(Codec::Lzma),
            "zst" => Ok(Codec::Zstd),
            _ => Err(FormatError::UnsupportedCodec(name.to_string())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Codec::Plain => "",
            Codec::Gzip => ".gz",
            Codec::Xz => ".xz",
            Codec::Lzma => ".lzma",
            Codec::Zstd => ".zst",
        }
    }

    pub fn decompress(self, data: &[u8]) -> Result<Cow<'_, [u8]>, FormatError> {
        let failed = |e: &dyn std::fmt::Display| FormatError::corrupt(format!("{self:?} stream: {e}"));
        match self {
            Codec::Plain => Ok(Cow::Borrowed(data)),
            Codec::Gzip => {
                let mut out = Vec::new();
                GzDecoder::new(data)
                    .read_to_end(&mut out)
                    .map_err(|e| failed(&e))?;
                Ok(Cow::Owned(out))
            }
            Codec::Xz => {
                let mut out = Vec::new();
                lzma_rs::xz_decompress(&mut &data[..], &mut out).map_err(|e| failed(&e))?;
                Ok(Cow::Owned(out))
            }
            Codec::Lzma => {
                let mut out = Vec::new();
                lzma_rs::lzma_decompress(&mut &data[..], &mut out).map_err(|e| failed(&e))?;
                Ok(Cow::Owned(out))
            }
            Codec::Zstd => zstd::decode_all(data)
                .map(Cow::Owned)
                .map_err(|e| failed(&e)),
        }
    }
}
