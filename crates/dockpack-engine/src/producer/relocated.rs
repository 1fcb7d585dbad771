//! Relocation of other targets' files under a new prefix.

use dockpack_common::error::{DockpackError, Result};
use dockpack_common::tree::{FileTree, join_path};
use dockpack_graph::{Capability, DependencyNode, Relocation};

use super::Producer;
use crate::contribution::Contribution;
use crate::snapshot::SourceReader;

/// Copies files with their `src` prefix replaced by `dest`.
#[derive(Debug, Clone)]
pub struct RelocatedFilesProducer {
    reader: SourceReader,
}

impl RelocatedFilesProducer {
    /// Creates the producer over a workspace reader.
    #[must_use]
    pub const fn new(reader: SourceReader) -> Self {
        Self { reader }
    }
}

impl Producer for RelocatedFilesProducer {
    fn name(&self) -> &'static str {
        "relocated-files"
    }

    fn capability(&self) -> Capability {
        Capability::RelocatedFiles
    }

    fn produce(&self, node: &DependencyNode) -> Result<Contribution> {
        let relocation = node.relocation().ok_or_else(|| {
            DockpackError::config(format!("{} has no relocation mapping", node.address()))
        })?;

        let mut tree = FileTree::new();
        for path in self.reader.expand(node.sources())? {
            let dest = relocate(relocation, &path).ok_or_else(|| {
                DockpackError::config(format!(
                    "{}: {path} is not under the relocation source {:?}",
                    node.address(),
                    relocation.src
                ))
            })?;
            let content = self.reader.read(&path)?;
            if tree.insert(&dest, content)?.is_some() {
                return Err(DockpackError::Conflict {
                    path: dest,
                    first: node.address().to_string(),
                    second: node.address().to_string(),
                });
            }
        }
        tracing::debug!(
            node = %node.address(),
            src = %relocation.src,
            dest = %relocation.dest,
            files = tree.len(),
            "relocated files"
        );
        Ok(Contribution::files(tree))
    }
}

/// Swaps the `src` prefix of `path` for `dest`; `None` if `path` is outside `src`.
fn relocate(relocation: &Relocation, path: &str) -> Option<String> {
    let src = relocation.src.trim_matches('/');
    let rest = if src.is_empty() {
        path
    } else {
        path.strip_prefix(src)?.strip_prefix('/')?
    };
    Some(join_path(&relocation.dest, rest))
}
