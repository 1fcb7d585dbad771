//! The unit of output of one producer for one node.

use dockpack_common::tree::FileTree;
use dockpack_common::types::Address;

/// Ordering key of contributions that do not ask for a position.
pub const DEFAULT_ORDER: i32 = 0;

/// Files and Dockerfile lines contributed by one producer for one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contribution {
    /// Lower keys are emitted earlier in the Dockerfile.
    pub ordering_key: i32,
    /// Dockerfile lines, in order, without trailing newlines.
    pub recipe_lines: Vec<String>,
    /// Files placed under the application directory, if any.
    pub files: Option<FileTree>,
}

impl Contribution {
    /// A file-only contribution at the default ordering key.
    #[must_use]
    pub const fn files(tree: FileTree) -> Self {
        Self {
            ordering_key: DEFAULT_ORDER,
            recipe_lines: Vec::new(),
            files: Some(tree),
        }
    }

    /// A recipe-only contribution.
    #[must_use]
    pub const fn recipe(ordering_key: i32, recipe_lines: Vec<String>) -> Self {
        Self {
            ordering_key,
            recipe_lines,
            files: None,
        }
    }

    /// Returns whether this contribution adds neither files nor lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipe_lines.is_empty() && self.files.as_ref().is_none_or(FileTree::is_empty)
    }
}

/// A contribution tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionEntry {
    /// Address of the node the contribution was produced for.
    pub origin: Address,
    /// Name of the producer that made it.
    pub producer: &'static str,
    /// Position in resolution order; breaks ordering-key ties.
    pub discovery: usize,
    /// The contribution itself.
    pub contribution: Contribution,
}
