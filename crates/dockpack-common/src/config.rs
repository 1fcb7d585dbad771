//! Global configuration model for dockpack.
//!
//! The configuration is read once from the build file's top-level sections,
//! adjusted by CLI flags, and then shared read-only with every producer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Root configuration for a dockpack invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DockpackConfig {
    /// Source-root prefixes stripped from Python sources and resources.
    pub source_roots: Vec<String>,
    /// Python packaging settings.
    pub python: PythonSettings,
    /// Container-build settings.
    pub docker: DockerSettings,
}

impl Default for DockpackConfig {
    fn default() -> Self {
        Self {
            source_roots: constants::DEFAULT_SOURCE_ROOTS
                .iter()
                .map(|r| (*r).to_string())
                .collect(),
            python: PythonSettings::default(),
            docker: DockerSettings::default(),
        }
    }
}

/// Settings consumed by the virtual-environment and requirement producers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PythonSettings {
    /// Workspace-relative path of a pip constraints file.
    pub requirement_constraints: Option<String>,
    /// Package indexes; the first is the primary index, the rest are extras.
    pub indexes: Vec<String>,
    /// Extra `--find-links` locations.
    pub find_links: Vec<String>,
    /// Lockfile-based resolves. Not supported; enabling it fails the package.
    pub enable_resolves: bool,
}

impl Default for PythonSettings {
    fn default() -> Self {
        Self {
            requirement_constraints: None,
            indexes: vec![constants::DEFAULT_PYTHON_INDEX.to_string()],
            find_links: Vec::new(),
            enable_resolves: false,
        }
    }
}

/// Settings for locating and driving the container-build executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DockerSettings {
    /// Log the output of `docker build` at info level.
    pub report_progress: bool,
    /// Ordered directories searched for the `docker` executable.
    pub search_paths: Vec<PathBuf>,
    /// Output directory for materialized contexts and exported archives.
    pub dist_dir: PathBuf,
    /// Save the built image into a tar archive after building.
    pub export: bool,
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            report_progress: false,
            search_paths: constants::default_search_paths(),
            dist_dir: PathBuf::from(constants::DEFAULT_DIST_DIR),
            export: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_public_index_and_no_constraints() {
        let config = DockpackConfig::default();
        assert_eq!(config.python.indexes, vec![constants::DEFAULT_PYTHON_INDEX]);
        assert!(config.python.requirement_constraints.is_none());
        assert!(!config.python.enable_resolves);
        assert_eq!(config.source_roots, vec!["src/python", "src"]);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = "python:\n  requirement_constraints: constraints.txt\n";
        let config: DockpackConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(
            config.python.requirement_constraints.as_deref(),
            Some("constraints.txt")
        );
        assert_eq!(config.python.indexes, vec![constants::DEFAULT_PYTHON_INDEX]);
        assert_eq!(config.docker.dist_dir, PathBuf::from("dist"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let yaml = "python:\n  constraints: c.txt\n";
        assert!(serde_yaml::from_str::<DockpackConfig>(yaml).is_err());
    }
}
