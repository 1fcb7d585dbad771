//! Building and exporting the image for a packaged target.

use std::path::{Path, PathBuf};

use dockpack_common::config::DockerSettings;
use dockpack_common::error::{DockpackError, Result};
use dockpack_common::tree::FileTree;
use dockpack_common::types::Sha256Hash;
use serde::Serialize;

use crate::docker::Docker;
use crate::materialize::materialize;
use crate::tag::ImageTag;

/// Result of a successful package operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltPackage {
    /// Digest of the build context handed to docker.
    pub context_digest: Sha256Hash,
    /// Every reference the image was tagged with.
    pub references: Vec<String>,
    /// Exported image archive, when export was requested.
    pub archive: Option<PathBuf>,
}

/// Drives `docker` for one workspace.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    docker: Docker,
    dist_dir: PathBuf,
    export: bool,
}

impl ImageBuilder {
    /// Creates a builder writing its outputs under `dist_dir`.
    #[must_use]
    pub fn new(docker: Docker, dist_dir: impl Into<PathBuf>) -> Self {
        Self {
            docker,
            dist_dir: dist_dir.into(),
            export: false,
        }
    }

    /// Locates docker and resolves the output directory against `workspace`.
    ///
    /// # Errors
    ///
    /// Returns an error if docker cannot be found.
    pub fn from_settings(settings: &DockerSettings, workspace: &Path) -> Result<Self> {
        let docker = Docker::locate(&settings.search_paths)?
            .with_report_progress(settings.report_progress);
        Ok(Self::new(docker, workspace.join(&settings.dist_dir)).with_export(settings.export))
    }

    /// Saves the image to a tar archive after building.
    #[must_use]
    pub const fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    /// Returns the directory the context of `target` is written to.
    #[must_use]
    pub fn context_dir(&self, target: &str) -> PathBuf {
        self.dist_dir.join(format!("{target}.context"))
    }

    /// Returns the path the image of `target` is exported to.
    #[must_use]
    pub fn archive_path(&self, target: &str) -> PathBuf {
        self.dist_dir.join(format!("{target}.tar"))
    }

    /// Builds `context` as the image of `target`, then exports it if asked.
    ///
    /// Blocks until docker exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the context cannot be written or a docker
    /// invocation fails.
    pub fn build(&self, target: &str, context: &FileTree, tag: &ImageTag) -> Result<BuiltPackage> {
        let context_digest = context.digest();
        let context_dir = self.context_dir(target);
        materialize(context, &context_dir)?;

        self.docker.build(&context_dir, tag.references())?;

        let archive = if self.export {
            let archive = self.archive_path(target);
            let archive =
                std::path::absolute(&archive).map_err(|e| DockpackError::io(&archive, e))?;
            self.docker
                .save(tag.export_reference(), &archive, &context_dir)?;
            Some(archive)
        } else {
            None
        };

        tracing::info!(
            target_name = target,
            digest = %context_digest,
            references = ?tag.references(),
            "image built"
        );
        Ok(BuiltPackage {
            context_digest,
            references: tag.references().to_vec(),
            archive,
        })
    }
}
