//! Content-addressed in-memory file trees.
//!
//! Producers return a [`FileTree`] for the files they contribute; the
//! assembler merges them into the tree that becomes the build context.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::error::{DockpackError, Result};
use crate::types::Sha256Hash;

/// Normalizes a relative path to `/`-separated components.
///
/// Empty and `.` components are dropped.
///
/// # Errors
///
/// Returns an error if the path is absolute, contains `..`, or is empty.
pub fn normalize_path(path: &str) -> Result<String> {
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(DockpackError::config(format!(
            "path must be relative to the workspace: {path}"
        )));
    }
    let mut parts = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                return Err(DockpackError::config(format!(
                    "path escapes its root: {path}"
                )));
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return Err(DockpackError::config(format!("empty path: \"{path}\"")));
    }
    Ok(parts.join("/"))
}

/// Joins two relative paths, either of which may be empty.
#[must_use]
pub fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let path = path.trim_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{path}"),
    }
}

/// A mapping from normalized relative path to file content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    files: BTreeMap<String, Vec<u8>>,
}

impl FileTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a file, returning the content it replaced, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be normalized.
    pub fn insert(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<Option<Vec<u8>>> {
        let path = normalize_path(path)?;
        Ok(self.files.insert(path, content.into()))
    }

    /// Returns whether a file exists at the normalized `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Returns the content at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Iterates over `(path, content)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_slice()))
    }

    /// Iterates over the paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Returns the number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns whether the tree holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the total size of all file contents in bytes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.files.values().map(|c| c.len() as u64).sum()
    }

    /// Returns a copy of the tree with every path placed under `prefix`.
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            files: self
                .files
                .iter()
                .map(|(p, c)| (join_path(prefix, p), c.clone()))
                .collect(),
        }
    }

    /// Computes the content digest of the tree.
    ///
    /// The digest covers every path, length, and content in path order, so
    /// equal trees always hash equally.
    #[must_use]
    pub fn digest(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        for (path, content) in &self.files {
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update((content.len() as u64).to_le_bytes());
            hasher.update(content);
        }
        Sha256Hash::from_hasher(hasher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_dot_and_empty_components() {
        assert_eq!(normalize_path("./a//b/./c.txt").expect("ok"), "a/b/c.txt");
    }

    #[test]
    fn normalize_rejects_parent_and_absolute() {
        assert!(normalize_path("../secret").is_err());
        assert!(normalize_path("/etc/passwd").is_err());
        assert!(normalize_path("./").is_err());
    }

    #[test]
    fn join_handles_empty_sides() {
        assert_eq!(join_path("", "a.txt"), "a.txt");
        assert_eq!(join_path("etc/", "a.txt"), "etc/a.txt");
        assert_eq!(join_path("etc", ""), "etc");
    }

    #[test]
    fn insert_normalizes_and_reports_replaced_content() {
        let mut tree = FileTree::new();
        assert!(tree.insert("./a.txt", "one").expect("insert").is_none());
        let replaced = tree.insert("a.txt", "two").expect("insert");
        assert_eq!(replaced.as_deref(), Some(&b"one"[..]));
        assert_eq!(tree.get("a.txt"), Some(&b"two"[..]));
    }

    #[test]
    fn with_prefix_moves_every_path() {
        let mut tree = FileTree::new();
        let _ = tree.insert("app/main.py", "print()").expect("insert");
        let prefixed = tree.with_prefix("application");
        assert_eq!(prefixed.paths().collect::<Vec<_>>(), vec!["application/app/main.py"]);
    }

    #[test]
    fn digest_is_insertion_order_independent() {
        let mut a = FileTree::new();
        let _ = a.insert("x", "1").expect("insert");
        let _ = a.insert("y", "2").expect("insert");
        let mut b = FileTree::new();
        let _ = b.insert("y", "2").expect("insert");
        let _ = b.insert("x", "1").expect("insert");
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn digest_distinguishes_path_from_content_boundary() {
        let mut a = FileTree::new();
        let _ = a.insert("ab", "c").expect("insert");
        let mut b = FileTree::new();
        let _ = b.insert("a", "bc").expect("insert");
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn total_bytes_sums_contents() {
        let mut tree = FileTree::new();
        let _ = tree.insert("a", "123").expect("insert");
        let _ = tree.insert("b", "45").expect("insert");
        assert_eq!(tree.total_bytes(), 5);
        assert_eq!(tree.len(), 2);
    }
}
