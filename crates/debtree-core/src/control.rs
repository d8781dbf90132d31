//! Debian control-record parsing (`Field: value` with folded continuation lines).

use std::fmt;

use debtree_util::errors::{DebError, DebResult};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Key under which the trailing free-text block is exposed.
pub const DESCRIPTION_KEY: &str = "description";

/// Ordered mapping of control field names to values.
///
/// Field names are case-sensitive and keep the position of their first
/// appearance; a repeated field replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlRecord {
    fields: Vec<(String, String)>,
    description: Option<String>,
}

impl ControlRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value for the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Look up a field. The synthetic trailing text answers to `description`
    /// when no real field of that exact name exists.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .or_else(|| {
                if key == DESCRIPTION_KEY {
                    self.description.as_deref()
                } else {
                    None
                }
            })
    }

    /// Like [`get`](Self::get) but a missing field is a [`DebError::MalformedRecord`].
    pub fn require(&self, key: &str) -> DebResult<&str> {
        self.get(key).ok_or_else(|| DebError::MalformedRecord {
            context: format!("field '{key}'"),
            message: format!("required field '{key}' is missing"),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Declared fields in order, excluding the synthetic description.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The trailing free-text block, if the record was parsed in trailing mode
    /// and one was present.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Number of declared fields, excluding the synthetic description.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.description.is_none()
    }

    /// Serialize the declared fields with the default folding rule.
    pub fn to_control_string(&self) -> String {
        self.to_control_string_with(&ControlParser::default())
    }

    /// Serialize the declared fields using `parser`'s separator and continuation marker.
    ///
    /// Parsing the output with the same parser yields the same field values.
    pub fn to_control_string_with(&self, parser: &ControlParser) -> String {
        let mut out = String::new();
        for (key, value) in &self.fields {
            let mut lines = value.split('\n');
            out.push_str(key);
            out.push_str(&parser.separator);
            out.push_str(lines.next().unwrap_or_default());
            out.push('\n');
            for line in lines {
                out.push_str(&parser.continuation);
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

impl fmt::Display for ControlRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_control_string())
    }
}

impl Serialize for ControlRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.description.is_some());
        let mut map = serializer.serialize_map(Some(self.fields.len() + extra))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        if let Some(ref description) = self.description {
            map.serialize_entry(DESCRIPTION_KEY, description)?;
        }
        map.end()
    }
}

/// Configurable control-text parser.
#[derive(Debug, Clone)]
pub struct ControlParser {
    continuation: String,
    separator: String,
    trailing_description: bool,
}

impl Default for ControlParser {
    fn default() -> Self {
        Self {
            continuation: " ".to_string(),
            separator: ": ".to_string(),
            trailing_description: false,
        }
    }
}

impl ControlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix marking a line as the continuation of the previous field.
    pub fn continuation(mut self, marker: impl Into<String>) -> Self {
        self.continuation = marker.into();
        self
    }

    /// Text between a field name and its value.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// After the first blank line, collect everything into the synthetic
    /// `description` field instead of parsing more fields.
    pub fn trailing_description(mut self, enabled: bool) -> Self {
        self.trailing_description = enabled;
        self
    }

    pub fn parse(&self, text: &str) -> DebResult<ControlRecord> {
        let mut record = ControlRecord::new();
        let mut current: Option<(String, String)> = None;
        let mut description: Option<String> = None;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;

            if let Some(ref mut desc) = description {
                desc.push('\n');
                desc.push_str(line);
                continue;
            }
            if self.trailing_description && line.trim().is_empty() {
                description = Some(format!("\n{line}"));
                continue;
            }

            let continued = if line.is_empty() {
                Some("")
            } else {
                line.strip_prefix(self.continuation.as_str())
            };

            if let Some(rest) = continued {
                match current {
                    Some((_, ref mut value)) => {
                        value.push('\n');
                        value.push_str(rest);
                    }
                    None if line.is_empty() => {}
                    None => {
                        return Err(DebError::MalformedRecord {
                            context: format!("line {line_no}"),
                            message: "continuation line before any field".to_string(),
                        });
                    }
                }
                continue;
            }

            let Some((key, value)) = line.split_once(self.separator.as_str()) else {
                return Err(DebError::MalformedRecord {
                    context: format!("line {line_no}"),
                    message: format!("missing '{}' separator in {line:?}", self.separator),
                });
            };
            if let Some((k, v)) = current.take() {
                record.insert(k, v);
            }
            current = Some((key.to_string(), value.trim_start().to_string()));
        }

        if let Some((k, v)) = current {
            record.insert(k, v);
        }
        record.description = description;
        Ok(record)
    }
}

/// Parse control text with the default options.
pub fn parse_control_data(text: &str) -> DebResult<ControlRecord> {
    ControlParser::default().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_fields_in_order() {
        let record = parse_control_data("Package: foo\nVersion: 1.0\nArchitecture: all\n").unwrap();
        let keys: Vec<&str> = record.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Package", "Version", "Architecture"]);
        assert_eq!(record.get("Version"), Some("1.0"));
    }

    #[test]
    fn value_is_left_trimmed_only() {
        let record = parse_control_data("Maintainer:   Jane Doe  \n").unwrap();
        assert_eq!(record.get("Maintainer"), Some("Jane Doe  "));
    }

    #[test]
    fn continuation_lines_fold_into_value() {
        let text = "Description: short\n long line one\n .\n long line two\nSection: misc\n";
        let record = parse_control_data(text).unwrap();
        assert_eq!(
            record.get("Description"),
            Some("short\nlong line one\n.\nlong line two")
        );
        assert_eq!(record.get("Section"), Some("misc"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let record = parse_control_data("Package: foo\n").unwrap();
        assert!(record.get("package").is_none());
    }

    #[test]
    fn repeated_key_replaces_in_place() {
        let record = parse_control_data("A: 1\nB: 2\nA: 3\n").unwrap();
        let pairs: Vec<(&str, &str)> = record.fields().collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn separator_splits_on_first_occurrence() {
        let record = parse_control_data("Homepage: https://example.org: x\n").unwrap();
        assert_eq!(record.get("Homepage"), Some("https://example.org: x"));
    }

    #[test]
    fn continuation_before_key_is_an_error() {
        let err = parse_control_data(" orphan\nPackage: foo\n").unwrap_err();
        assert!(matches!(err, DebError::MalformedRecord { ref context, .. } if context == "line 1"));
    }

    #[test]
    fn missing_separator_is_an_error() {
        let err = parse_control_data("Package: foo\ngarbage\n").unwrap_err();
        assert!(matches!(err, DebError::MalformedRecord { ref context, .. } if context == "line 2"));
    }

    #[test]
    fn leading_blank_lines_ignored() {
        let record = parse_control_data("\n\nPackage: foo\n").unwrap();
        assert_eq!(record.get("Package"), Some("foo"));
    }

    #[test]
    fn blank_line_without_trailing_mode_continues_value() {
        let record = parse_control_data("Package: foo\n\nVersion: 1\n").unwrap();
        assert_eq!(record.get("Package"), Some("foo\n"));
        assert_eq!(record.get("Version"), Some("1"));
    }

    #[test]
    fn trailing_mode_collects_description() {
        let parser = ControlParser::new().trailing_description(true);
        let record = parser
            .parse("Package: foo\nVersion: 1\n\nFree text\n\nmore\n")
            .unwrap();
        assert_eq!(record.get("Version"), Some("1"));
        assert_eq!(record.description(), Some("\n\nFree text\n\nmore"));
        assert_eq!(record.get(DESCRIPTION_KEY), Some("\n\nFree text\n\nmore"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn trailing_mode_treats_whitespace_only_line_as_blank() {
        let parser = ControlParser::new().trailing_description(true);
        let record = parser.parse("Package: foo\n   \nrest: here\n").unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record.description(), Some("\n   \nrest: here"));
    }

    #[test]
    fn custom_separator_and_marker() {
        let parser = ControlParser::new().separator("=").continuation("\t");
        let record = parser.parse("name=foo\nnotes=a\n\tb\n").unwrap();
        assert_eq!(record.get("name"), Some("foo"));
        assert_eq!(record.get("notes"), Some("a\nb"));
    }

    #[test]
    fn require_reports_missing_field() {
        let record = parse_control_data("Version: 1\n").unwrap();
        let err = record.require("Package").unwrap_err();
        assert!(err.to_string().contains("'Package'"));
    }

    #[test]
    fn serialization_round_trips_folded_values() {
        let text = "Package: foo\nDescription: short\n long\n .\n more\n";
        let record = parse_control_data(text).unwrap();
        assert_eq!(record.to_control_string(), text);
        assert_eq!(parse_control_data(&record.to_control_string()).unwrap(), record);
    }
}
