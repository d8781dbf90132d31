//! Minimal reader for `tar` streams held in memory.
//!
//! Handles ustar and GNU headers, GNU `L` long names and pax `x` path
//! overrides. Only what is needed to pull a regular file out of a control
//! archive; links and special files are listed but never followed.

use crate::error::FormatError;

pub const BLOCK: usize = 512;

const USTAR_MAGIC: &[u8; 6] = b"ustar\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    HardLink,
    Other(u8),
}

impl EntryKind {
    fn from_typeflag(flag: u8) -> Self {
        match flag {
            b'0' | b'\0' | b'7' => EntryKind::File,
            b'5' => EntryKind::Directory,
            b'2' => EntryKind::Symlink,
            b'1' => EntryKind::HardLink,
            other => EntryKind::Other(other),
        }
    }
}

/// One entry, borrowing its data from the archive buffer.
#[derive(Debug, Clone)]
pub struct TarEntry<'a> {
    /// Normalised path: no leading `./`, no trailing `/`.
    pub path: String,
    pub kind: EntryKind,
    pub data: &'a [u8],
}

pub struct TarArchive<'a> {
    buf: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> TarArchive<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            done: false,
        }
    }

    /// Next entry, or `None` at the end-of-archive marker or end of input.
    pub fn next_entry(&mut self) -> Result<Option<TarEntry<'a>>, FormatError> {
        let mut long_name: Option<String> = None;

        loop {
            if self.done || self.pos + BLOCK > self.buf.len() {
                self.done = true;
                return Ok(None);
            }
            let header = &self.buf[self.pos..self.pos + BLOCK];
            if header.iter().all(|&b| b == 0) {
                self.done = true;
                return Ok(None);
            }
            verify_checksum(header, self.pos)?;

            let size = parse_size(&header[124..136]).ok_or_else(|| {
                FormatError::corrupt(format!("invalid tar entry size at offset {}", self.pos))
            })?;
            let data_start = self.pos + BLOCK;
            let data_end = usize::try_from(size)
                .ok()
                .and_then(|s| data_start.checked_add(s))
                .filter(|&end| end <= self.buf.len())
                .ok_or_else(|| {
                    FormatError::corrupt(format!(
                        "tar entry at offset {} declares {size} bytes past the end of the archive",
                        self.pos
                    ))
                })?;
            let data = &self.buf[data_start..data_end];
            self.pos = data_start + padded(data.len());

            match header[156] {
                b'L' => {
                    long_name = Some(c_string(data));
                }
                b'x' => {
                    if let Some(path) = pax_path(data) {
                        long_name = Some(path);
                    }
                }
                b'g' => {}
                flag => {
                    let path = match long_name.take() {
                        Some(name) => name,
                        None => header_path(header),
                    };
                    return Ok(Some(TarEntry {
                        path: normalise(&path),
                        kind: EntryKind::from_typeflag(flag),
                        data,
                    }));
                }
            }
        }
    }

    /// First regular file whose normalised path equals `name`.
    pub fn find(&mut self, name: &str) -> Result<Option<TarEntry<'a>>, FormatError> {
        let wanted = normalise(name);
        while let Some(entry) = self.next_entry()? {
            if entry.kind == EntryKind::File && entry.path == wanted {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
}

fn padded(len: usize) -> usize {
    len.div_ceil(BLOCK) * BLOCK
}

fn header_path(header: &[u8]) -> String {
    let name = c_string(&header[0..100]);
    if &header[257..263] == USTAR_MAGIC {
        let prefix = c_string(&header[345..500]);
        if !prefix.is_empty() {
            return format!("{prefix}/{name}");
        }
    }
    name
}

fn normalise(path: &str) -> String {
    let mut path = path;
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path.trim_end_matches('/').to_string()
}

fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Octal, or GNU base-256 when the high bit of the first byte is set.
fn parse_size(field: &[u8]) -> Option<u64> {
    if field[0] & 0x80 != 0 {
        let mut value: u64 = u64::from(field[0] & 0x7f);
        for &b in &field[1..] {
            value = value.checked_mul(256)?.checked_add(u64::from(b))?;
        }
        return Some(value);
    }
    parse_octal(field)
}

fn parse_octal(field: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(field).ok()?;
    let text = text.trim_matches(|c: char| c == '\0' || c == ' ');
    if text.is_empty() {
        return Some(0);
    }
    u64::from_str_radix(text, 8).ok()
}

/// Header checksum: the checksum field counts as eight spaces. Some writers
/// sum signed bytes, so accept either.
fn verify_checksum(header: &[u8], offset: usize) -> Result<(), FormatError> {
    let stored = parse_octal(&header[148..156])
        .ok_or_else(|| FormatError::corrupt(format!("invalid tar checksum at offset {offset}")))?;
    let (mut unsigned, mut signed) = (0u64, 0i64);
    for (i, &b) in header.iter().enumerate() {
        let b = if (148..156).contains(&i) { b' ' } else { b };
        unsigned += u64::from(b);
        signed += i64::from(b as i8);
    }
    if stored == unsigned || i64::try_from(stored).is_ok_and(|s| s == signed) {
        Ok(())
    } else {
        Err(FormatError::corrupt(format!(
            "tar header checksum mismatch at offset {offset}"
        )))
    }
}

/// `path` record of a pax extended header (`"<len> path=<value>\n"` records).
fn pax_path(data: &[u8]) -> Option<String> {
    let mut rest = data;
    let mut path = None;
    while !rest.is_empty() {
        let space = rest.iter().position(|&b| b == b' ')?;
        let len: usize = std::str::from_utf8(&rest[..space]).ok()?.parse().ok()?;
        if len <= space || len > rest.len() {
            return None;
        }
        let record = &rest[space + 1..len];
        let record = record.strip_suffix(b"\n").unwrap_or(record);
        if let Some(value) = record.strip_prefix(b"path=") {
            path = Some(String::from_utf8_lossy(value).into_owned());
        }
        rest = &rest[len..];
    }
    path
}
