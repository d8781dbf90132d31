//! Pulling the control record out of a `.deb` file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;

use debtree_core::config::DEFAULT_CONTROL_MEMBER;
use debtree_core::control::{parse_control_data, ControlRecord};
use debtree_util::errors::{DebError, DebResult};
use regex::Regex;

use crate::ar::{ArArchive, ArMember};
use crate::codec::Codec;
use crate::tar::TarArchive;

/// Entry inside the control archive holding the record.
pub const CONTROL_ENTRY: &str = "control";

/// The compiled default control-member pattern.
pub fn default_member_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(DEFAULT_CONTROL_MEMBER).expect("control member pattern is valid"))
}

/// First `ar` member of `artifact_path` whose name matches `name_pattern`.
///
/// The file is opened and closed within the call.
pub fn extract_member(artifact_path: &Path, name_pattern: &Regex) -> DebResult<ArMember> {
    let file = File::open(artifact_path)?;
    let mut archive =
        ArArchive::new(BufReader::new(file)).map_err(|e| e.at(artifact_path))?;
    archive
        .find(name_pattern)
        .map_err(|e| e.at(artifact_path))?
        .ok_or_else(|| DebError::NotFound {
            path: artifact_path.to_path_buf(),
            pattern: name_pattern.as_str().to_string(),
        })
}

/// Read and parse the `control` file of a `.deb`.
pub fn extract_control_record(artifact_path: &Path) -> DebResult<ControlRecord> {
    extract_control_record_with(artifact_path, default_member_pattern())
}

/// Like [`extract_control_record`] with a custom control-member pattern.
pub fn extract_control_record_with(
    artifact_path: &Path,
    member_pattern: &Regex,
) -> DebResult<ControlRecord> {
    let member = extract_member(artifact_path, member_pattern)?;
    tracing::debug!(
        "{}: control member '{}' ({} bytes)",
        artifact_path.display(),
        member.name,
        member.data.len()
    );

    let codec = Codec::from_member_name(&member.name).map_err(|e| e.at(artifact_path))?;
    let tar = codec.decompress(&member.data).map_err(|e| e.at(artifact_path))?;
    let entry = TarArchive::new(&tar)
        .find(CONTROL_ENTRY)
        .map_err(|e| e.at(artifact_path))?
        .ok_or_else(|| DebError::NotFound {
            path: artifact_path.to_path_buf(),
            pattern: format!("{}/{CONTROL_ENTRY}", member.name),
        })?;

    let text = std::str::from_utf8(entry.data).map_err(|e| DebError::MalformedRecord {
        context: artifact_path.display().to_string(),
        message: format!("control file is not valid UTF-8: {e}"),
    })?;
    parse_control_data(text).map_err(|e| e.with_context(artifact_path.display()))
}
