//! YAML build-file model.
//!
//! A build file carries optional workspace settings and a list of targets:
//!
//! ```yaml
//! python:
//!   requirement_constraints: constraints.txt
//! targets:
//!   - name: app
//!     kind: python_sources
//!     sources: ["src/python/app/*.py"]
//!     dependencies: [reqs]
//!   - name: reqs
//!     kind: python_requirements
//!     source: requirements.txt
//!   - name: svc
//!     kind: docker_image
//!     base_image: python:3.11-slim
//!     command: ["python", "-m", "app"]
//!     dependencies: [app]
//! ```

use std::path::Path;

use dockpack_common::config::{DockerSettings, DockpackConfig, PythonSettings};
use dockpack_common::constants::DEFAULT_WORKDIR;
use dockpack_common::error::{DockpackError, Result};
use serde::{Deserialize, Serialize};

/// Root node of a parsed build file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildFile {
    /// Source-root prefixes; the built-in defaults apply when absent.
    #[serde(default)]
    pub source_roots: Option<Vec<String>>,
    /// Python packaging settings.
    #[serde(default)]
    pub python: Option<PythonSettings>,
    /// Container-build settings.
    #[serde(default)]
    pub docker: Option<DockerSettings>,
    /// Target declarations.
    #[serde(default)]
    pub targets: Vec<TargetDecl>,
}

impl BuildFile {
    /// Parses a build file from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid build file.
    pub fn parse(content: &str) -> Result<Self> {
        let file: Self = serde_yaml::from_str(content)?;
        tracing::debug!(targets = file.targets.len(), "parsed build file");
        Ok(file)
    }

    /// Reads and parses the build file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "loading build file");
        let content = std::fs::read_to_string(path).map_err(|e| DockpackError::io(path, e))?;
        Self::parse(&content)
    }

    /// Returns the workspace configuration, filling absent sections with defaults.
    #[must_use]
    pub fn config(&self) -> DockpackConfig {
        let defaults = DockpackConfig::default();
        DockpackConfig {
            source_roots: self.source_roots.clone().unwrap_or(defaults.source_roots),
            python: self.python.clone().unwrap_or(defaults.python),
            docker: self.docker.clone().unwrap_or(defaults.docker),
        }
    }

    /// Looks up a target declaration by name.
    #[must_use]
    pub fn target(&self, name: &str) -> Option<&TargetDecl> {
        self.targets.iter().find(|t| t.name == name)
    }
}

/// A single target declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDecl {
    /// Target name, unique within the build file.
    pub name: String,
    /// Names of targets this one depends on, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Kind-specific fields.
    #[serde(flatten)]
    pub kind: TargetKind,
}

/// The kind of a target and its kind-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetKind {
    /// Plain files, copied with their workspace-relative paths.
    Files {
        /// Paths or glob patterns relative to the workspace root.
        sources: Vec<String>,
    },
    /// Resource files, copied with source roots stripped.
    Resources {
        /// Paths or glob patterns relative to the workspace root.
        sources: Vec<String>,
    },
    /// Importable Python sources, copied with source roots stripped.
    PythonSources {
        /// Paths or glob patterns relative to the workspace root.
        sources: Vec<String>,
    },
    /// Files of other `files` targets moved from `src` to `dest`.
    RelocatedFiles {
        /// Names of the `files` targets whose sources are relocated.
        files_targets: Vec<String>,
        /// Prefix removed from every relocated path.
        #[serde(default)]
        src: String,
        /// Prefix added to every relocated path.
        #[serde(default)]
        dest: String,
    },
    /// Inline pip requirement strings.
    PythonRequirement {
        /// Requirement specifiers, one `pip install` each.
        requirements: Vec<String>,
    },
    /// A pip requirements file; also bootstraps the virtual environment.
    PythonRequirements {
        /// Workspace-relative path of the requirements file.
        source: String,
    },
    /// A container image to package.
    DockerImage(ImageDecl),
    /// A grouping target with dependencies only.
    Target,
}

impl TargetKind {
    /// Returns the `kind` tag as written in the build file.
    #[must_use]
    pub const fn alias(&self) -> &'static str {
        match self {
            Self::Files { .. } => "files",
            Self::Resources { .. } => "resources",
            Self::PythonSources { .. } => "python_sources",
            Self::RelocatedFiles { .. } => "relocated_files",
            Self::PythonRequirement { .. } => "python_requirement",
            Self::PythonRequirements { .. } => "python_requirements",
            Self::DockerImage(_) => "docker_image",
            Self::Target => "target",
        }
    }
}

/// Fields of a `docker_image` target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageDecl {
    /// Base image reference for the `FROM` line.
    pub base_image: String,
    /// Working directory inside the image.
    #[serde(default = "default_workdir")]
    pub workdir: Option<String>,
    /// Commands run right after `FROM`/`WORKDIR`, one layer each.
    #[serde(default)]
    pub image_setup_commands: Vec<String>,
    /// Tag suffixes applied to the image name.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Registry prefix applied to every tag.
    #[serde(default)]
    pub registry: Option<String>,
    /// Startup command tokens for `CMD`.
    #[serde(default)]
    pub command: Vec<String>,
}

impl ImageDecl {
    /// Creates a declaration with only the base image set.
    #[must_use]
    pub fn new(base_image: impl Into<String>) -> Self {
        Self {
            base_image: base_image.into(),
            workdir: default_workdir(),
            image_setup_commands: Vec::new(),
            tags: Vec::new(),
            registry: None,
            command: Vec::new(),
        }
    }
}

#[allow(clippy::unnecessary_wraps)]
fn default_workdir() -> Option<String> {
    Some(DEFAULT_WORKDIR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_every_kind() {
        let yaml = r#"
targets:
  - name: f
    kind: files
    sources: [a.txt]
  - name: r
    kind: resources
    sources: ["res/*.json"]
  - name: p
    kind: python_sources
    sources: [src/python/app/main.py]
  - name: moved
    kind: relocated_files
    files_targets: [f]
    src: ""
    dest: etc
  - name: one
    kind: python_requirement
    requirements: ["flask==2.0"]
  - name: reqs
    kind: python_requirements
    source: requirements.txt
  - name: group
    kind: target
    dependencies: [f, r]
  - name: svc
    kind: docker_image
    base_image: python:3.11-slim
    dependencies: [group]
"#;
        let file = BuildFile::parse(yaml).expect("parse");
        let aliases: Vec<&str> = file.targets.iter().map(|t| t.kind.alias()).collect();
        assert_eq!(
            aliases,
            vec![
                "files",
                "resources",
                "python_sources",
                "relocated_files",
                "python_requirement",
                "python_requirements",
                "target",
                "docker_image",
            ]
        );
        assert_eq!(file.target("group").expect("group").dependencies, vec!["f", "r"]);
    }

    #[test]
    fn docker_image_defaults() {
        let yaml = "targets:\n  - name: svc\n    kind: docker_image\n    base_image: alpine\n";
        let file = BuildFile::parse(yaml).expect("parse");
        let TargetKind::DockerImage(image) = &file.targets[0].kind else {
            panic!("expected docker_image");
        };
        assert_eq!(image, &ImageDecl::new("alpine"));
        assert_eq!(image.workdir.as_deref(), Some("container"));
    }

    #[test]
    fn docker_image_without_base_image_fails() {
        let yaml = "targets:\n  - name: svc\n    kind: docker_image\n";
        assert!(BuildFile::parse(yaml).is_err());
    }

    #[test]
    fn unknown_kind_fails() {
        let yaml = "targets:\n  - name: x\n    kind: go_binary\n";
        assert!(BuildFile::parse(yaml).is_err());
    }

    #[test]
    fn config_sections_override_defaults() {
        let yaml = r"
source_roots: [lib]
python:
  indexes: []
  find_links: [wheels]
";
        let config = BuildFile::parse(yaml).expect("parse").config();
        assert_eq!(config.source_roots, vec!["lib"]);
        assert!(config.python.indexes.is_empty());
        assert_eq!(config.python.find_links, vec!["wheels"]);
        assert!(!config.docker.report_progress);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dockpack.yaml");
        let err = BuildFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("dockpack.yaml"), "got: {err}");
    }
}
