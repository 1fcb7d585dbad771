//! Read-only, capability-queryable view of a build-graph target.
//!
//! Producers never see target declarations directly. They ask a
//! [`DependencyNode`] which capabilities it has and read the few fields
//! each capability implies.

use std::collections::BTreeSet;
use std::fmt;

use dockpack_common::types::Address;
use serde::{Deserialize, Serialize};

/// A capability a node may expose; each producer family keys on exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Has plain file sources.
    FileSources,
    /// Has resource sources.
    ResourceSources,
    /// Has importable Python sources.
    PythonSources,
    /// Has a relocation mapping over other targets' files.
    RelocatedFiles,
    /// Declares a requirements file, so it needs a virtual environment.
    RequirementsFile,
    /// Declares package requirements.
    Requirements,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FileSources => "file-sources",
            Self::ResourceSources => "resource-sources",
            Self::PythonSources => "python-sources",
            Self::RelocatedFiles => "relocated-files",
            Self::RequirementsFile => "requirements-file",
            Self::Requirements => "requirements",
        };
        f.write_str(name)
    }
}

/// Prefix replacement applied by `relocated_files` targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    /// Prefix removed from every path.
    pub src: String,
    /// Prefix added to every path.
    pub dest: String,
}

/// A node of the dependency closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    address: Address,
    capabilities: BTreeSet<Capability>,
    sources: Vec<String>,
    requirements: Vec<String>,
    relocation: Option<Relocation>,
}

impl DependencyNode {
    /// Creates a node with no capabilities.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            capabilities: BTreeSet::new(),
            sources: Vec::new(),
            requirements: Vec::new(),
            relocation: None,
        }
    }

    /// Adds a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        let _ = self.capabilities.insert(capability);
        self
    }

    /// Sets the source paths or glob patterns.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Sets the requirement specifiers.
    #[must_use]
    pub fn with_requirements(mut self, requirements: Vec<String>) -> Self {
        self.requirements = requirements;
        self
    }

    /// Sets the relocation mapping.
    #[must_use]
    pub fn with_relocation(mut self, relocation: Relocation) -> Self {
        self.relocation = Some(relocation);
        self
    }

    /// Returns the node's address.
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// Returns every capability of the node.
    #[must_use]
    pub const fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    /// Returns whether the node exposes `capability`.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Returns the declared source paths or glob patterns, workspace-relative.
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Returns the declared requirement specifiers.
    #[must_use]
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    /// Returns the relocation mapping, if any.
    #[must_use]
    pub const fn relocation(&self) -> Option<&Relocation> {
        self.relocation.as_ref()
    }
}
