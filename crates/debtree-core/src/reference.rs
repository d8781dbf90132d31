//! Reference sets: installed (or deliberately ignored) packages and their versions.
//!
//! The usual source is the output of `dpkg -l`, where installed packages
//! appear on lines like:
//!
//! ```text
//! ii  xfonts-utils     1:7.7~1   amd64  X Window System font utility programs
//! ```

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use debtree_util::errors::DebResult;
use regex::Regex;

use crate::version::{Constraint, Version};

/// Package name → installed or ignored version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    packages: BTreeMap<String, Version>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, version: Version) {
        self.packages.insert(name.into(), version);
    }

    pub fn get(&self, name: &str) -> Option<&Version> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Entries sorted by package name.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Version> {
        self.packages.iter()
    }

    /// Whether `name` is present with a version meeting every constraint.
    ///
    /// An empty constraint list is satisfied by any present version.
    pub fn satisfies(&self, name: &str, constraints: &[Constraint]) -> bool {
        self.get(name)
            .is_some_and(|installed| constraints.iter().all(|c| c.is_satisfied_by(installed)))
    }

    /// Load a `dpkg -l` listing from a file.
    pub fn from_path(path: &Path) -> DebResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(parse_dpkg(&content))
    }
}

impl FromIterator<(String, Version)> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = (String, Version)>>(iter: I) -> Self {
        Self {
            packages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = (&'a String, &'a Version);
    type IntoIter = btree_map::Iter<'a, String, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn dpkg_line() -> &'static Regex {
    static LINE: OnceLock<Regex> = OnceLock::new();
    LINE.get_or_init(|| {
        Regex::new(r"^ii\s+(\S+)\s+(\S+)\s+(\S+)\s+.*$").expect("dpkg line pattern is valid")
    })
}

/// Parse `dpkg -l` output, keeping only lines in the installed (`ii`) state.
///
/// The `:arch` suffix of multi-arch names is stripped; a later line for the
/// same name replaces an earlier one.
pub fn parse_dpkg(dpkg_string: &str) -> ReferenceSet {
    let mut installed = ReferenceSet::new();
    for line in dpkg_string.lines() {
        let Some(caps) = dpkg_line().captures(line) else {
            continue;
        };
        let name = caps[1].split_once(':').map_or(&caps[1], |(bare, _)| bare);
        installed.insert(name, Version::parse(&caps[2]));
    }
    tracing::debug!("parsed {} installed packages", installed.len());
    installed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Operator;

    #[test]
    fn satisfies_checks_every_constraint() {
        let mut set = ReferenceSet::new();
        set.insert("python", Version::parse("2.7.18"));
        let ok = [
            Constraint::new(Operator::GreaterOrEqual, Version::parse("2.7")),
            Constraint::new(Operator::StrictlyLess, Version::parse("2.8")),
        ];
        assert!(set.satisfies("python", &ok));
        let too_new = [Constraint::new(Operator::GreaterOrEqual, Version::parse("3.0"))];
        assert!(!set.satisfies("python", &too_new));
        assert!(set.satisfies("python", &[]));
        assert!(!set.satisfies("perl", &[]));
    }
}
