//! Build-context assembly.
//!
//! Merges the file trees of every contribution and lays the result out the
//! way `docker build` sees it: application files under `application/`, the
//! Dockerfile at the root.

use std::collections::BTreeMap;

use dockpack_common::constants::{APPLICATION_DIR, DOCKERFILE_NAME};
use dockpack_common::error::{DockpackError, Result};
use dockpack_common::tree::FileTree;
use dockpack_common::types::Sha256Hash;

use crate::contribution::ContributionEntry;
use crate::recipe::Recipe;

/// Merges contributed files into one application tree.
///
/// Entries without files are skipped. The outcome does not depend on the
/// order of `entries`: when several entries write one path, the error names
/// the lexicographically first path and its two smallest owners.
///
/// # Errors
///
/// Returns [`DockpackError::Conflict`] if two entries write the same path.
pub fn assemble(entries: &[ContributionEntry]) -> Result<FileTree> {
    let mut owners: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for entry in entries {
        let Some(files) = &entry.contribution.files else {
            continue;
        };
        for path in files.paths() {
            owners
                .entry(path)
                .or_default()
                .push(format!("{} ({})", entry.origin, entry.producer));
        }
    }
    if let Some((path, claimed)) = owners.iter_mut().find(|(_, o)| o.len() > 1) {
        claimed.sort();
        return Err(DockpackError::Conflict {
            path: (*path).to_string(),
            first: claimed[0].clone(),
            second: claimed[1].clone(),
        });
    }

    let mut tree = FileTree::new();
    for entry in entries {
        if let Some(files) = &entry.contribution.files {
            for (path, content) in files.iter() {
                let _ = tree.insert(path, content)?;
            }
        }
    }
    tracing::info!(files = tree.len(), bytes = tree.total_bytes(), "assembled build context");
    Ok(tree)
}

/// The complete input of `docker build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    tree: FileTree,
}

impl BuildContext {
    /// Lays out `application` under the application directory next to the
    /// rendered Dockerfile.
    ///
    /// # Errors
    ///
    /// Returns an error if the Dockerfile cannot be placed in the tree.
    pub fn new(application: &FileTree, recipe: &Recipe) -> Result<Self> {
        let mut tree = application.with_prefix(APPLICATION_DIR);
        let _ = tree.insert(DOCKERFILE_NAME, recipe.to_string())?;
        Ok(Self { tree })
    }

    /// Returns the full context tree.
    #[must_use]
    pub const fn tree(&self) -> &FileTree {
        &self.tree
    }

    /// Returns the content digest of the context.
    #[must_use]
    pub fn digest(&self) -> Sha256Hash {
        self.tree.digest()
    }

    /// Returns the rendered Dockerfile.
    #[must_use]
    pub fn dockerfile(&self) -> Option<&[u8]> {
        self.tree.get(DOCKERFILE_NAME)
    }
}
