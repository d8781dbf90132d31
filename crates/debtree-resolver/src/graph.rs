//! The resolved dependency graph: package name → declared dependencies.

use std::collections::HashMap;

use debtree_core::dependency::DependencyMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

/// Packages resolved during one run, keyed by canonical name.
///
/// Edges point from a package to the names in its [`DependencyMap`]; a
/// dependency that was skipped (satisfied by the reference set) appears only
/// as an edge target, never as a key.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    packages: HashMap<String, DependencyMap>,
    /// Names in insertion (discovery) order.
    order: Vec<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a package. Returns `false` and leaves the graph unchanged if
    /// the name is already present.
    pub fn insert(&mut self, name: impl Into<String>, deps: DependencyMap) -> bool {
        let name = name.into();
        if self.packages.contains_key(&name) {
            return false;
        }
        self.order.push(name.clone());
        self.packages.insert(name, deps);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&DependencyMap> {
        self.packages.get(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Package names in the order they were resolved.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(name, dependencies)` pairs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DependencyMap)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), &self.packages[name]))
    }

    /// Resolved packages that declare a dependency on `name`, sorted.
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        let mut dependents: Vec<&str> = self
            .iter()
            .filter(|(_, deps)| deps.contains_key(name))
            .map(|(pkg, _)| pkg)
            .collect();
        dependents.sort_unstable();
        dependents
    }

    /// Groups of packages such that every group comes after the groups it
    /// depends on. A group holds more than one name only when those packages
    /// depend on each other in a cycle; names within a group are sorted.
    pub fn install_order(&self) -> Vec<Vec<&str>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();
        for name in self.names() {
            index.insert(name, graph.add_node(name));
        }
        for (name, deps) in self.iter() {
            let from = index[name];
            for dep in deps.keys() {
                if let Some(&to) = index.get(dep.as_str()) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        // Tarjan yields components in reverse topological order, which for
        // dependent → dependency edges puts dependencies first.
        tarjan_scc(&graph)
            .into_iter()
            .map(|component| {
                let mut names: Vec<&str> = component.into_iter().map(|idx| graph[idx]).collect();
                names.sort_unstable();
                names
            })
            .collect()
    }
}
