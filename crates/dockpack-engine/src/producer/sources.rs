//! Producers that copy declared sources into the context.

use dockpack_common::error::{DockpackError, Result};
use dockpack_common::tree::FileTree;
use dockpack_graph::{Capability, DependencyNode};

use super::Producer;
use crate::contribution::Contribution;
use crate::snapshot::SourceReader;

const PYTHON_EXTENSIONS: &[&str] = &["py", "pyi"];

/// Copies a node's sources, optionally stripping source roots.
///
/// One instance serves one capability: `files` keep their workspace paths,
/// `resources` and `python_sources` are rooted at their source root.
#[derive(Debug, Clone)]
pub struct FileSourcesProducer {
    name: &'static str,
    capability: Capability,
    strip_roots: bool,
    extensions: Option<&'static [&'static str]>,
    reader: SourceReader,
}

impl FileSourcesProducer {
    /// Plain files, copied verbatim.
    #[must_use]
    pub const fn files(reader: SourceReader) -> Self {
        Self {
            name: "files",
            capability: Capability::FileSources,
            strip_roots: false,
            extensions: None,
            reader,
        }
    }

    /// Resources, copied with source roots stripped.
    #[must_use]
    pub const fn resources(reader: SourceReader) -> Self {
        Self {
            name: "resources",
            capability: Capability::ResourceSources,
            strip_roots: true,
            extensions: None,
            reader,
        }
    }

    /// Importable Python sources, copied with source roots stripped.
    #[must_use]
    pub const fn python_sources(reader: SourceReader) -> Self {
        Self {
            name: "python-sources",
            capability: Capability::PythonSources,
            strip_roots: true,
            extensions: Some(PYTHON_EXTENSIONS),
            reader,
        }
    }

    fn check_extension(&self, node: &DependencyNode, path: &str) -> Result<()> {
        let Some(allowed) = self.extensions else {
            return Ok(());
        };
        let ext = path.rsplit_once('.').map(|(_, ext)| ext);
        if ext.is_some_and(|ext| allowed.contains(&ext)) {
            return Ok(());
        }
        Err(DockpackError::config(format!(
            "{} declares {path}, expected one of the extensions {allowed:?}",
            node.address()
        )))
    }
}

impl Producer for FileSourcesProducer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capability(&self) -> Capability {
        self.capability
    }

    fn produce(&self, node: &DependencyNode) -> Result<Contribution> {
        let mut tree = FileTree::new();
        for path in self.reader.expand(node.sources())? {
            self.check_extension(node, &path)?;
            let dest = if self.strip_roots {
                self.reader.roots().strip(&path)
            } else {
                path.as_str()
            };
            let content = self.reader.read(&path)?;
            if tree.insert(dest, content)?.is_some() {
                return Err(DockpackError::Conflict {
                    path: dest.to_string(),
                    first: node.address().to_string(),
                    second: node.address().to_string(),
                });
            }
        }
        tracing::debug!(
            producer = self.name,
            node = %node.address(),
            files = tree.len(),
            "produced source files"
        );
        Ok(Contribution::files(tree))
    }
}
