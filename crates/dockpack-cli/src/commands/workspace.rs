//! Loading the build file and planning packages for the subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use dockpack_common::config::DockpackConfig;
use dockpack_engine::{PackagePlan, ProducerRegistry, plan_package};
use dockpack_graph::{BuildFile, BuildGraph};

use super::ConfigOverrides;

/// A loaded workspace: its root, effective settings, and target graph.
#[derive(Debug)]
pub struct Workspace {
    /// Absolute workspace root.
    pub root: PathBuf,
    /// Build-file settings with command-line overrides applied.
    pub config: DockpackConfig,
    /// The validated target graph.
    pub graph: BuildGraph,
    registry: Arc<ProducerRegistry>,
}

impl Workspace {
    /// Loads `build_file` (relative to `root` unless absolute).
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist or the build file is
    /// missing or invalid.
    pub fn load(root: &Path, build_file: &Path, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("workspace {} not found", root.display()))?;
        let file = BuildFile::load(&root.join(build_file))?;

        let mut config = file.config();
        overrides.apply(&mut config);

        let graph = BuildGraph::from_build_file(&file, &root)?;
        let registry = ProducerRegistry::with_defaults(&config, &root)?;
        tracing::debug!(root = %root.display(), producers = registry.len(), "workspace loaded");

        Ok(Self {
            root,
            config,
            graph,
            registry: Arc::new(registry),
        })
    }

    /// Plans the package of `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails.
    pub async fn plan(&self, target: &str) -> anyhow::Result<PackagePlan> {
        let plan = plan_package(&self.graph, Arc::clone(&self.registry), target).await?;
        Ok(plan)
    }

    /// Returns the output directory for contexts and archives.
    #[must_use]
    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.config.docker.dist_dir)
    }
}
