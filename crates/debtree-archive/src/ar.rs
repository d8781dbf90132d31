//! Sequential reader for the common `ar` format used by `.deb` files.
//!
//! Layout: the global magic `!<arch>\n`, then for each member a 60-byte
//! ASCII header followed by the member data, padded to an even offset.

use std::io::{self, Read, Seek, SeekFrom};

use regex::Regex;

use crate::error::FormatError;

pub const MAGIC: &[u8; 8] = b"!<arch>\n";
pub const HEADER_LEN: usize = 60;
const TERMINATOR: &[u8; 2] = b"`\n";
const BSD_LONG_NAME: &str = "#1/";

/// Header of one archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberHeader {
    pub name: String,
    pub mtime: u64,
    pub mode: u32,
    /// Size of the member data, excluding any BSD long-name prefix.
    pub size: u64,
}

/// A member that matched a lookup, with its data read into memory.
#[derive(Debug, Clone)]
pub struct ArMember {
    pub name: String,
    pub data: Vec<u8>,
}

pub struct ArArchive<R> {
    reader: R,
    len: u64,
    pos: u64,
    /// Bytes of the current member's data not yet consumed.
    pending: u64,
    pending_pad: bool,
    /// GNU `//` string table, referenced by `/<offset>` member names.
    long_names: Option<Vec<u8>>,
}

impl<R: Read + Seek> ArArchive<R> {
    /// Check the global magic and position at the first member.
    pub fn new(mut reader: R) -> Result<Self, FormatError> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let mut magic = [0u8; 8];
        if let Err(e) = reader.read_exact(&mut magic) {
            return Err(match e.kind() {
                io::ErrorKind::UnexpectedEof => FormatError::corrupt("missing ar magic"),
                _ => e.into(),
            });
        }
        if &magic != MAGIC {
            return Err(FormatError::corrupt("missing ar magic"));
        }

        Ok(Self {
            reader,
            len,
            pos: MAGIC.len() as u64,
            pending: 0,
            pending_pad: false,
            long_names: None,
        })
    }

    /// Advance to the next member header. Unread data of the previous member
    /// is skipped. Returns `None` at the end of the archive.
    pub fn next_member(&mut self) -> Result<Option<MemberHeader>, FormatError> {
        loop {
            self.skip_pending()?;
            if self.pos >= self.len {
                return Ok(None);
            }

            let remaining = self.len - self.pos;
            if remaining < HEADER_LEN as u64 {
                return Err(FormatError::corrupt(format!(
                    "truncated member header at offset {}",
                    self.pos
                )));
            }
            let mut raw = [0u8; HEADER_LEN];
            self.reader.read_exact(&mut raw)?;
            self.pos += HEADER_LEN as u64;

            let header = parse_header(&raw, self.pos - HEADER_LEN as u64)?;
            if header.size > self.len - self.pos {
                return Err(FormatError::corrupt(format!(
                    "member '{}' declares {} bytes but only {} remain",
                    header.name.trim_end(),
                    header.size,
                    self.len - self.pos
                )));
            }
            self.pending = header.size;
            self.pending_pad = header.size % 2 == 1;

            let mut header = header;
            if let Some(len) = header.name.strip_prefix(BSD_LONG_NAME) {
                let name_len: u64 = len.trim_end().parse().map_err(|_| {
                    FormatError::corrupt(format!("invalid BSD long name length '{}'", len.trim_end()))
                })?;
                if name_len > header.size {
                    return Err(FormatError::corrupt("BSD long name exceeds member size"));
                }
                let mut name = vec![0u8; name_len as usize];
                self.reader.read_exact(&mut name)?;
                self.pos += name_len;
                self.pending -= name_len;
                header.size -= name_len;
                header.name = String::from_utf8_lossy(&name)
                    .trim_end_matches('\0')
                    .to_string();
            } else {
                header.name = header.name.trim_end().to_string();
            }

            match header.name.as_str() {
                "/" => {
                    tracing::debug!("skipping ar symbol table");
                    continue;
                }
                "//" => {
                    self.long_names = Some(self.read_data()?);
                    continue;
                }
                _ => {}
            }
            if let Some(offset) = gnu_long_name_offset(&header.name) {
                header.name = self.long_name(offset)?;
            } else if let Some(stripped) = header.name.strip_suffix('/') {
                header.name = stripped.to_string();
            }
            return Ok(Some(header));
        }
    }

    /// Read the data of the member returned by the last [`next_member`](Self::next_member).
    pub fn read_data(&mut self) -> Result<Vec<u8>, FormatError> {
        let mut data = vec![0u8; self.pending as usize];
        self.reader.read_exact(&mut data)?;
        self.pos += self.pending;
        self.pending = 0;
        Ok(data)
    }

    /// Scan members in order and return the first whose name matches `pattern`.
    pub fn find(&mut self, pattern: &Regex) -> Result<Option<ArMember>, FormatError> {
        while let Some(header) = self.next_member()? {
            if pattern.is_match(&header.name) {
                let data = self.read_data()?;
                return Ok(Some(ArMember {
                    name: header.name,
                    data,
                }));
            }
        }
        Ok(None)
    }

    /// Entry of the GNU string table at `offset`, terminated by `/\n`.
    fn long_name(&self, offset: usize) -> Result<String, FormatError> {
        let table = self
            .long_names
            .as_deref()
            .ok_or_else(|| FormatError::corrupt(format!("long name /{offset} without a // table")))?;
        let entry = table
            .get(offset..)
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| FormatError::corrupt(format!("long name offset {offset} out of range")))?;
        let end = entry.iter().position(|&b| b == b'\n').unwrap_or(entry.len());
        let name = String::from_utf8_lossy(&entry[..end]);
        Ok(name.trim_end_matches('/').to_string())
    }

    fn skip_pending(&mut self) -> Result<(), FormatError> {
        let mut skip = self.pending;
        if self.pending_pad {
            // A final odd-sized member may legitimately omit its padding byte.
            skip += u64::from(self.pos + self.pending < self.len);
        }
        if skip > 0 {
            self.reader.seek(SeekFrom::Current(skip as i64))?;
            self.pos += skip;
        }
        self.pending = 0;
        self.pending_pad = false;
        Ok(())
    }
}

fn parse_header(raw: &[u8; HEADER_LEN], offset: u64) -> Result<MemberHeader, FormatError> {
    if &raw[58..60] != TERMINATOR {
        return Err(FormatError::corrupt(format!(
            "bad member header terminator at offset {offset}"
        )));
    }
    let name = String::from_utf8_lossy(&raw[0..16]).into_owned();
    let mtime = parse_field(&raw[16..28], 10).unwrap_or(0);
    let mode = parse_field(&raw[40..48], 8).unwrap_or(0) as u32;
    let size = parse_field(&raw[48..58], 10).ok_or_else(|| {
        FormatError::corrupt(format!(
            "invalid member size '{}' at offset {offset}",
            String::from_utf8_lossy(&raw[48..58]).trim()
        ))
    })?;
    Ok(MemberHeader {
        name,
        mtime,
        mode,
        size,
    })
}

/// `/123` → `Some(123)`. The bare `/` and `//` tables are not references.
fn gnu_long_name_offset(name: &str) -> Option<usize> {
    let digits = name.strip_prefix('/')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Space-padded ASCII integer in the given radix.
fn parse_field(bytes: &[u8], radix: u32) -> Option<u64> {
    let text = std::str::from_utf8(bytes).ok()?.trim();
    u64::from_str_radix(text, radix).ok()
}
