//! Debian dependency grammar: `name [(op version)]` entries separated by `,`,
//! with `|` alternative groups.

use std::collections::BTreeMap;

use debtree_util::errors::{DebError, DebResult};

use crate::reference::ReferenceSet;
use crate::version::{Constraint, Operator, Version};

/// Dependency name → constraints declared by one depending package.
///
/// An empty constraint list means any version satisfies.
pub type DependencyMap = BTreeMap<String, Vec<Constraint>>;

/// Parse a dependency field value into a [`DependencyMap`].
///
/// Alternative groups (`a | b`) are dropped when no `reference` set is given.
/// With one, the first alternative whose name is in the set is kept as a bare
/// dependency, without the constraint written on that alternative; if none is
/// present the group is dropped.
///
/// Constraints on the same name accumulate in declaration order.
pub fn parse_deps(dep_string: &str, reference: Option<&ReferenceSet>) -> DebResult<DependencyMap> {
    let mut deps = DependencyMap::new();
    merge_deps(&mut deps, dep_string, reference)?;
    Ok(deps)
}

/// Parse `dep_string` and append its constraints into an existing map.
pub fn merge_deps(
    deps: &mut DependencyMap,
    dep_string: &str,
    reference: Option<&ReferenceSet>,
) -> DebResult<()> {
    for entry in dep_string.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        if entry.contains('|') {
            let Some(reference) = reference else {
                tracing::debug!("dropping alternative group '{entry}' (no reference set)");
                continue;
            };
            match choose_alternative(entry, reference) {
                Some(name) => {
                    deps.entry(name).or_default();
                }
                None => {
                    tracing::debug!("dropping alternative group '{entry}' (no branch installed)");
                }
            }
            continue;
        }

        let (name, constraint) = parse_entry(entry)?;
        let constraints = deps.entry(name).or_default();
        if let Some(c) = constraint {
            constraints.push(c);
        }
    }
    Ok(())
}

/// First `|` branch whose bare name is in the reference set.
fn choose_alternative(entry: &str, reference: &ReferenceSet) -> Option<String> {
    entry
        .split('|')
        .map(|branch| {
            let bare = branch.split_once('(').map_or(branch, |(name, _)| name);
            strip_arch_qualifier(bare.trim()).to_string()
        })
        .find(|name| reference.contains(name))
}

/// Parse one non-alternative entry: `name` or `name (op version)`.
pub fn parse_entry(entry: &str) -> DebResult<(String, Option<Constraint>)> {
    let invalid = || DebError::InvalidConstraintSyntax {
        entry: entry.to_string(),
    };

    let Some((name, clause)) = entry.split_once('(') else {
        let name = strip_arch_qualifier(entry.trim());
        if name.is_empty() || name.contains(char::is_whitespace) || name.contains(')') {
            return Err(invalid());
        }
        return Ok((name.to_string(), None));
    };

    let name = strip_arch_qualifier(name.trim());
    let inner = clause.trim_end().strip_suffix(')').ok_or_else(invalid)?;
    if name.is_empty() || name.contains(char::is_whitespace) || inner.contains(['(', ')']) {
        return Err(invalid());
    }

    let inner = inner.trim();
    // Everything up to the version is the operator; spellings outside the
    // fixed set are rejected by `Operator::from_str`.
    let op_len = inner
        .find(|c: char| c.is_alphanumeric() || c.is_whitespace())
        .unwrap_or(inner.len());
    let (op, version) = inner.split_at(op_len);
    let version = version.trim();
    if op.is_empty() || version.is_empty() || version.contains(char::is_whitespace) {
        return Err(invalid());
    }

    let op: Operator = op.parse()?;
    Ok((
        name.to_string(),
        Some(Constraint::new(op, Version::parse(version))),
    ))
}

/// `python3:any` → `python3`.
fn strip_arch_qualifier(name: &str) -> &str {
    name.split_once(':').map_or(name, |(bare, _)| bare)
}
