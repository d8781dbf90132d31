//! Operation: resolve the dependency graph of one or more packages.

use std::path::PathBuf;

use debtree_core::config::GlobalConfig;
use debtree_core::reference::ReferenceSet;
use debtree_resolver::report::{render_dependents, render_dependents_json, render_json, render_text, SortOrder};
use debtree_resolver::{AptLocator, DebControlReader, DepTreeBuilder, DependencyGraph, ResolveOptions};
use debtree_util::errors::DebResult;
use debtree_util::progress::{spinner, status, status_info, status_warn};

use crate::OutputFormat;

/// Options for `debtree deps`.
#[derive(Debug, Default)]
pub struct DepsOptions {
    /// Package names or paths to `.deb` files.
    pub packages: Vec<String>,
    /// Follow dependencies; `None` defers to `[resolve] recursive`.
    pub recursive: Option<bool>,
    /// `dpkg -l` listing of installed packages.
    pub installed: Option<PathBuf>,
    /// Download directory, overriding `[fetch] dir`.
    pub dir: Option<PathBuf>,
    pub sort: SortOrder,
    pub format: OutputFormat,
    /// Print the dependents of this package instead of the full report.
    pub why: Option<String>,
}

/// Resolve the graph described by `opts`.
pub fn resolve(config: &GlobalConfig, opts: &DepsOptions) -> DebResult<DependencyGraph> {
    let reference = match opts.installed {
        Some(ref path) => {
            let reference = ReferenceSet::from_path(path)?;
            status_info(
                "Loaded",
                &format!("{} installed packages from {}", reference.len(), path.display()),
            );
            Some(reference)
        }
        None => None,
    };

    let mut fetch = config.fetch.clone();
    if let Some(ref dir) = opts.dir {
        fetch.dir = dir.clone();
    }
    let locator = AptLocator::from_config(&fetch);
    let reader = DebControlReader::from_config(&config.extract)?;
    let options = ResolveOptions::from_config(&config.resolve)
        .recursive(opts.recursive.unwrap_or(config.resolve.recursive));
    tracing::debug!(
        "resolving {:?} (recursive: {}, dir: {})",
        opts.packages,
        options.recursive,
        locator.dir().display()
    );

    DepTreeBuilder::new(options, reference.as_ref(), &locator, &reader).resolve_all(&opts.packages)
}

/// Render `graph` the way `opts` asks for.
pub fn render(graph: &DependencyGraph, opts: &DepsOptions) -> DebResult<String> {
    if let Some(ref name) = opts.why {
        return match opts.format {
            OutputFormat::Text => Ok(render_dependents(graph, name)),
            OutputFormat::Json => render_dependents_json(graph, name).map(|json| json + "\n"),
        };
    }
    match opts.format {
        OutputFormat::Text => Ok(render_text(graph, opts.sort)),
        OutputFormat::Json => render_json(graph).map(|json| json + "\n"),
    }
}

/// Resolve and print the dependency report.
pub fn deps(config: &GlobalConfig, opts: &DepsOptions) -> miette::Result<()> {
    let sp = spinner("Resolving dependencies...");
    let graph = resolve(config, opts);
    sp.finish_and_clear();
    let graph = graph?;

    status("Resolved", &format!("{} packages", graph.len()));
    if let Some(ref name) = opts.why {
        if graph.dependents_of(name).is_empty() {
            status_warn("Warning", &format!("nothing in the graph depends on '{name}'"));
            return Ok(());
        }
    }

    print!("{}", render(&graph, opts)?);
    Ok(())
}
