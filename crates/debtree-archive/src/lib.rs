//! Debian binary package decoding.
//!
//! A `.deb` is an `ar` archive whose `control.tar[.gz|.xz|.lzma|.zst]` member
//! holds a `control` text file. This crate implements the narrow read path
//! needed to get at that file: a sequential `ar` scanner, decompression codecs
//! chosen by member-name suffix, and a minimal `tar` entry reader.

pub mod ar;
pub mod codec;
pub mod error;
pub mod extract;
pub mod tar;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use extract::{extract_control_record, extract_control_record_with, extract_member};
