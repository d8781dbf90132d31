//! Rendering a [`DependencyGraph`] for people (text) and tools (JSON).

use std::collections::BTreeMap;
use std::fmt::Write;

use debtree_core::version::Constraint;
use debtree_util::errors::{DebError, DebResult};

use crate::graph::DependencyGraph;

/// Order of package stanzas in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Alphabetical by package name.
    #[default]
    Name,
    /// The order packages were resolved in.
    Discovery,
    /// Dependencies before the packages that need them.
    Install,
}

/// Package names of `graph` in the requested order.
pub fn ordered_names(graph: &DependencyGraph, order: SortOrder) -> Vec<&str> {
    match order {
        SortOrder::Name => {
            let mut names: Vec<&str> = graph.names().collect();
            names.sort_unstable();
            names
        }
        SortOrder::Discovery => graph.names().collect(),
        SortOrder::Install => graph.install_order().into_iter().flatten().collect(),
    }
}

/// `(>= 2.7, << 2.8)`, or an empty string when unconstrained.
fn constraint_suffix(constraints: &[Constraint]) -> String {
    if constraints.is_empty() {
        return String::new();
    }
    let joined: Vec<String> = constraints.iter().map(ToString::to_string).collect();
    format!(" ({})", joined.join(", "))
}

/// Human-readable report:
///
/// ```text
/// python-debtools
/// ===============
///
///   * python (>= 2.7, << 2.8)
///   * python-stdeb
/// ```
///
/// Stanzas are separated by one blank line.
pub fn render_text(graph: &DependencyGraph, order: SortOrder) -> String {
    let mut out = String::new();
    for (i, name) in ordered_names(graph, order).into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{name}");
        let _ = writeln!(out, "{}", "=".repeat(name.chars().count()));
        out.push('\n');
        if let Some(deps) = graph.get(name) {
            for (dep, constraints) in deps {
                let _ = writeln!(out, "  * {dep}{}", constraint_suffix(constraints));
            }
        }
    }
    out
}

/// JSON report: `{ package: { dependency: [ {"op", "version"}, ... ] } }`,
/// keys sorted.
pub fn render_json(graph: &DependencyGraph) -> DebResult<String> {
    let sorted: BTreeMap<&str, _> = graph.iter().collect();
    serde_json::to_string_pretty(&sorted).map_err(|e| DebError::Io(e.into()))
}

/// Lines for `--why`: one per package that depends on `name`, with the
/// constraints it declares.
pub fn render_dependents(graph: &DependencyGraph, name: &str) -> String {
    let mut out = String::new();
    for dependent in graph.dependents_of(name) {
        let constraints = graph
            .get(dependent)
            .and_then(|deps| deps.get(name))
            .map(|c| constraint_suffix(c))
            .unwrap_or_default();
        let _ = writeln!(out, "{dependent} -> {name}{constraints}");
    }
    out
}

/// JSON form of [`render_dependents`]: `{ dependent: [ {"op", "version"}, ... ] }`.
pub fn render_dependents_json(graph: &DependencyGraph, name: &str) -> DebResult<String> {
    let dependents: BTreeMap<&str, &[Constraint]> = graph
        .dependents_of(name)
        .into_iter()
        .filter_map(|dependent| {
            let constraints = graph.get(dependent)?.get(name)?;
            Some((dependent, constraints.as_slice()))
        })
        .collect();
    serde_json::to_string_pretty(&dependents).map_err(|e| DebError::Io(e.into()))
}

#[cfg(test)]
mod tests {
    use debtree_core::dependency::parse_deps;

    use super::*;

    fn sample() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.insert(
            "python-debtools",
            parse_deps("python (>= 2.7), python (<< 2.8), python-stdeb", None).unwrap(),
        );
        graph.insert("python-stdeb", parse_deps("python", None).unwrap());
        graph
    }

    #[test]
    fn text_stanzas() {
        let text = render_text(&sample(), SortOrder::Discovery);
        assert_eq!(
            text,
            "python-debtools\n===============\n\n  * python (>= 2.7, << 2.8)\n  * python-stdeb\n\
             \npython-stdeb\n============\n\n  * python\n"
        );
    }

    #[test]
    fn install_order_lists_dependency_first() {
        let graph = sample();
        let names = ordered_names(&graph, SortOrder::Install);
        assert_eq!(names, vec!["python-stdeb", "python-debtools"]);
    }

    #[test]
    fn underline_counts_chars() {
        let mut graph = DependencyGraph::new();
        graph.insert("café", Default::default());
        assert!(render_text(&graph, SortOrder::Name).starts_with("café\n====\n"));
    }

    #[test]
    fn why_json_keeps_constraints() {
        let graph = sample();
        let json: serde_json::Value =
            serde_json::from_str(&render_dependents_json(&graph, "python").unwrap()).unwrap();
        assert_eq!(json["python-debtools"][1]["op"], "<<");
        assert_eq!(json["python-stdeb"], serde_json::json!([]));
        assert_eq!(render_dependents_json(&graph, "nothing").unwrap(), "{}");
    }

    #[test]
    fn why_lists_dependents() {
        let graph = sample();
        assert_eq!(
            render_dependents(&graph, "python"),
            "python-debtools -> python (>= 2.7, << 2.8)\npython-stdeb -> python\n"
        );
    }
}
