//! Producers turn an applicable node into a [`Contribution`].
//!
//! Each producer keys on exactly one [`Capability`]. Producers are pure with
//! respect to the graph: they may read workspace files but never mutate a
//! node or any shared state, so the package step runs them concurrently.

pub mod python;
pub mod relocated;
pub mod sources;

use std::fmt;
use std::path::PathBuf;

use dockpack_common::config::{DockpackConfig, PythonSettings};
use dockpack_common::error::Result;
use dockpack_graph::{Capability, DependencyNode};

use crate::contribution::Contribution;
use crate::snapshot::{SourceReader, SourceRoots};

pub use python::{RequirementsProducer, VirtualEnvProducer};
pub use relocated::RelocatedFilesProducer;
pub use sources::FileSourcesProducer;

/// Ordering key of the virtual-environment bootstrap; it runs first.
pub const VIRTUAL_ENV_ORDER: i32 = -10;

/// Ordering key of requirement installation, right after the bootstrap.
pub const REQUIREMENTS_ORDER: i32 = VIRTUAL_ENV_ORDER + 1;

/// Turns nodes of one capability family into contributions.
pub trait Producer: Send + Sync + fmt::Debug {
    /// Short name used in logs and plans.
    fn name(&self) -> &'static str;

    /// The capability family this producer serves.
    fn capability(&self) -> Capability;

    /// Returns whether the producer applies to `node`.
    fn is_applicable(&self, node: &DependencyNode) -> bool {
        node.has(self.capability())
    }

    /// Produces the contribution for an applicable node.
    ///
    /// # Errors
    ///
    /// Returns an error if a declared file cannot be read or the node's
    /// fields are invalid for this producer.
    fn produce(&self, node: &DependencyNode) -> Result<Contribution>;
}

/// Everything the standard producers read besides the node itself.
#[derive(Debug, Clone)]
pub struct ProducerSettings {
    /// Workspace root that source paths are relative to.
    pub workspace: PathBuf,
    /// Source roots stripped from resources and Python sources.
    pub source_roots: SourceRoots,
    /// Python packaging settings.
    pub python: PythonSettings,
}

impl ProducerSettings {
    /// Derives producer settings from the workspace configuration.
    #[must_use]
    pub fn from_config(config: &DockpackConfig, workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            source_roots: SourceRoots::new(&config.source_roots),
            python: config.python.clone(),
        }
    }

    /// Returns a source reader over the workspace.
    #[must_use]
    pub fn reader(&self) -> SourceReader {
        SourceReader::new(self.workspace.clone(), self.source_roots.clone())
    }
}
