pub mod graph;
pub mod locate;
pub mod report;
pub mod resolver;

pub use graph::DependencyGraph;
pub use locate::{AptLocator, ArtifactLocator, LocalLocator};
pub use resolver::{resolve_all, ControlReader, DebControlReader, DepTreeBuilder, ResolveOptions};
