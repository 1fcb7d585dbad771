//! Reading declared sources from the workspace.
//!
//! Expands source patterns into workspace-relative file paths, reads their
//! content, and strips source roots.

use std::path::{Path, PathBuf};

use dockpack_common::error::{DockpackError, Result};
use dockpack_common::tree::normalize_path;

/// Source-root prefixes, matched longest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRoots {
    roots: Vec<String>,
}

impl SourceRoots {
    /// Creates the root set; `""` and `"/"` denote the workspace root.
    #[must_use]
    pub fn new(roots: &[String]) -> Self {
        let mut roots: Vec<String> = roots
            .iter()
            .map(|r| r.trim_matches('/').to_string())
            .filter(|r| !r.is_empty())
            .collect();
        roots.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        roots.dedup();
        Self { roots }
    }

    /// Removes the longest matching root from `path`.
    ///
    /// Paths under no root are returned unchanged.
    #[must_use]
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        self.roots
            .iter()
            .find_map(|root| {
                path.strip_prefix(root.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
            })
            .unwrap_or(path)
    }
}

/// Reads source files relative to a workspace root.
#[derive(Debug, Clone)]
pub struct SourceReader {
    workspace: PathBuf,
    roots: SourceRoots,
}

impl SourceReader {
    /// Creates a reader rooted at `workspace`.
    #[must_use]
    pub fn new(workspace: impl Into<PathBuf>, roots: SourceRoots) -> Self {
        Self {
            workspace: workspace.into(),
            roots,
        }
    }

    /// Returns the workspace root.
    #[must_use]
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Returns the configured source roots.
    #[must_use]
    pub const fn roots(&self) -> &SourceRoots {
        &self.roots
    }

    /// Expands source entries into workspace-relative file paths.
    ///
    /// Entries with glob metacharacters are expanded and sorted; literal
    /// entries must name an existing file. Duplicates are kept once, at the
    /// position they first appear.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry escapes the workspace, a literal entry
    /// does not exist, or a pattern is malformed.
    pub fn expand(&self, entries: &[String]) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in entries {
            let entry = normalize_path(entry)?;
            let matched = if is_glob(&entry) {
                self.expand_glob(&entry)?
            } else {
                self.check_literal(&entry)?;
                vec![entry]
            };
            for path in matched {
                if !files.contains(&path) {
                    files.push(path);
                }
            }
        }
        Ok(files)
    }

    /// Reads the content of a workspace-relative file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.workspace.join(path);
        tracing::debug!(path = %full.display(), "reading source file");
        std::fs::read(&full).map_err(|e| DockpackError::io(full, e))
    }

    fn check_literal(&self, entry: &str) -> Result<()> {
        let full = self.workspace.join(entry);
        if full.is_file() {
            return Ok(());
        }
        if full.is_dir() {
            return Err(DockpackError::config(format!(
                "source {entry} is a directory; use a glob such as {entry}/**/*"
            )));
        }
        Err(DockpackError::NotFound {
            kind: "source file",
            id: entry.to_string(),
        })
    }

    fn expand_glob(&self, pattern: &str) -> Result<Vec<String>> {
        // The workspace part is matched literally; only `pattern` is a glob.
        let base = glob::Pattern::escape(&self.workspace.to_string_lossy());
        let full = Path::new(&base).join(pattern);
        let full = full.to_string_lossy();
        let paths = glob::glob(&full).map_err(|e| {
            DockpackError::config(format!("invalid source pattern {pattern}: {e}"))
        })?;

        let mut matched = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                DockpackError::io(path, std::io::Error::from(e))
            })?;
            if !path.is_file() {
                continue;
            }
            matched.push(self.relative(&path)?);
        }
        matched.sort();

        if matched.is_empty() {
            tracing::warn!(pattern, "source pattern matched no files");
        }
        Ok(matched)
    }

    fn relative(&self, path: &Path) -> Result<String> {
        let rel = path.strip_prefix(&self.workspace).map_err(|_| {
            DockpackError::config(format!(
                "matched path {} is outside the workspace",
                path.display()
            ))
        })?;
        normalize_path(&rel.to_string_lossy())
    }
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}
