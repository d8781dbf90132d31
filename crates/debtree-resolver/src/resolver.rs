//! Depth-first construction of the dependency graph.
//!
//! Each identifier is turned into a `.deb` path (directly, or through an
//! [`ArtifactLocator`]), its control record is read, and the dependency
//! fields are parsed. The package is entered into the graph before any of its
//! dependencies are visited, which is what makes cyclic dependencies
//! terminate.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use debtree_archive::extract::{default_member_pattern, extract_control_record_with};
use debtree_core::config::{ExtractConfig, ResolveConfig};
use debtree_core::control::ControlRecord;
use debtree_core::dependency::{merge_deps, DependencyMap};
use debtree_core::reference::ReferenceSet;
use debtree_core::PACKAGE_FIELD;
use debtree_util::errors::{DebError, DebResult};
use regex::Regex;

use crate::graph::DependencyGraph;
use crate::locate::ArtifactLocator;

/// Reads the control record of a package artifact.
pub trait ControlReader {
    fn read_control(&self, path: &Path) -> DebResult<ControlRecord>;
}

/// Reads control records out of `.deb` files.
#[derive(Debug, Clone)]
pub struct DebControlReader {
    member_pattern: Regex,
}

impl DebControlReader {
    pub fn new(member_pattern: Regex) -> Self {
        Self { member_pattern }
    }

    pub fn from_config(config: &ExtractConfig) -> DebResult<Self> {
        let member_pattern = Regex::new(&config.control_member).map_err(|e| DebError::Config {
            message: format!("[extract] control-member is not a valid pattern: {e}"),
        })?;
        Ok(Self::new(member_pattern))
    }
}

impl Default for DebControlReader {
    fn default() -> Self {
        Self::new(default_member_pattern().clone())
    }
}

impl ControlReader for DebControlReader {
    fn read_control(&self, path: &Path) -> DebResult<ControlRecord> {
        extract_control_record_with(path, &self.member_pattern)
    }
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Follow dependencies that the reference set does not satisfy.
    pub recursive: bool,
    /// Control fields parsed for dependencies, merged in this order.
    pub dependency_fields: Vec<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::from_config(&ResolveConfig::default())
    }
}

impl ResolveOptions {
    pub fn from_config(config: &ResolveConfig) -> Self {
        Self {
            recursive: config.recursive,
            dependency_fields: config.dependency_fields.clone(),
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// Builds one [`DependencyGraph`].
pub struct DepTreeBuilder<'a> {
    options: ResolveOptions,
    reference: Option<&'a ReferenceSet>,
    locator: &'a dyn ArtifactLocator,
    reader: &'a dyn ControlReader,
    graph: DependencyGraph,
    /// Identifiers whose `add` has not returned yet.
    in_flight: HashSet<String>,
}

impl<'a> DepTreeBuilder<'a> {
    pub fn new(
        options: ResolveOptions,
        reference: Option<&'a ReferenceSet>,
        locator: &'a dyn ArtifactLocator,
        reader: &'a dyn ControlReader,
    ) -> Self {
        Self {
            options,
            reference,
            locator,
            reader,
            graph: DependencyGraph::new(),
            in_flight: HashSet::new(),
        }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn into_graph(self) -> DependencyGraph {
        self.graph
    }

    /// Resolve every identifier and return the finished graph.
    ///
    /// The first error aborts the run.
    pub fn resolve_all<I, S>(mut self, identifiers: I) -> DebResult<DependencyGraph>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for identifier in identifiers {
            self.add(identifier.as_ref())?;
        }
        Ok(self.graph)
    }

    /// Add one package (a name or a path ending in `.deb`) and, in recursive
    /// mode, everything it needs that the reference set does not satisfy.
    pub fn add(&mut self, identifier: &str) -> DebResult<()> {
        if self.graph.contains(identifier) || self.in_flight.contains(identifier) {
            return Ok(());
        }

        self.in_flight.insert(identifier.to_string());
        let added = self.add_in_flight(identifier);
        self.in_flight.remove(identifier);
        added
    }

    /// Body of [`add`](Self::add); `identifier` is in flight throughout, so a
    /// dependency that names it again (under a name other than its `Package`)
    /// is not read a second time.
    fn add_in_flight(&mut self, identifier: &str) -> DebResult<()> {
        let (path, record) = self.read(identifier)?;

        let canonical = record
            .require(PACKAGE_FIELD)
            .map_err(|e| e.with_context(path.display()))?
            .trim()
            .to_string();
        if self.graph.contains(&canonical) {
            if canonical != identifier {
                tracing::warn!(
                    "{} declares package '{canonical}', which is already resolved",
                    path.display()
                );
            }
            return Ok(());
        }

        let deps = self.parse_dependencies(&record)?;
        tracing::debug!("{canonical}: {} dependencies", deps.len());
        let pending: Vec<String> = if self.options.recursive {
            deps.iter()
                .filter(|(name, constraints)| {
                    let satisfied = self
                        .reference
                        .is_some_and(|reference| reference.satisfies(name, constraints));
                    if satisfied {
                        tracing::debug!("{canonical}: '{name}' satisfied by the reference set");
                    }
                    !satisfied
                })
                .map(|(name, _)| name.clone())
                .collect()
        } else {
            Vec::new()
        };
        self.graph.insert(canonical, deps);

        for name in pending {
            self.add(&name)?;
        }
        Ok(())
    }

    fn read(&self, identifier: &str) -> DebResult<(PathBuf, ControlRecord)> {
        let path = if identifier.ends_with(".deb") {
            let path = PathBuf::from(identifier);
            if !path.is_file() {
                return Err(DebError::ArtifactUnavailable {
                    name: identifier.to_string(),
                    reason: "no such file".to_string(),
                });
            }
            path
        } else {
            self.locator.locate_or_fetch(identifier)?
        };
        let record = self.reader.read_control(&path)?;
        Ok((path, record))
    }

    fn parse_dependencies(&self, record: &ControlRecord) -> DebResult<DependencyMap> {
        let mut deps = DependencyMap::new();
        for field in &self.options.dependency_fields {
            if let Some(value) = record.get(field) {
                merge_deps(&mut deps, value, self.reference)?;
            }
        }
        Ok(deps)
    }
}

/// Resolve `identifiers` with the default dependency fields.
pub fn resolve_all<S: AsRef<str>>(
    identifiers: &[S],
    recursive: bool,
    reference: Option<&ReferenceSet>,
    locator: &dyn ArtifactLocator,
    reader: &dyn ControlReader,
) -> DebResult<DependencyGraph> {
    let options = ResolveOptions::default().recursive(recursive);
    DepTreeBuilder::new(options, reference, locator, reader).resolve_all(identifiers)
}
