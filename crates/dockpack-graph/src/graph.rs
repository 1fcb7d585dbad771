//! Dependency graph management using `petgraph`.
//!
//! Builds a directed acyclic graph from target dependencies and walks the
//! transitive closure of a package root.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;

use dockpack_common::error::{DockpackError, Result};
use dockpack_common::types::Address;
use petgraph::graph::NodeIndex;

use crate::build_file::{BuildFile, ImageDecl, TargetDecl, TargetKind};
use crate::node::{Capability, DependencyNode, Relocation};
use crate::requirements::read_requirements;

/// A dependency graph of targets.
#[derive(Debug, Default)]
pub struct BuildGraph {
    /// Internal petgraph representation; edges point from dependent to dependency.
    graph: petgraph::Graph<Arc<DependencyNode>, ()>,
    index: HashMap<String, NodeIndex>,
    images: HashMap<String, ImageDecl>,
}

impl BuildGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph for a validated build file.
    ///
    /// `workspace` is the directory relative to which requirements files
    /// are read.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, a requirements file cannot be
    /// read, or the dependencies contain a cycle.
    pub fn from_build_file(file: &BuildFile, workspace: &Path) -> Result<Self> {
        crate::validator::validate(file)?;

        let mut graph = Self::new();
        for target in &file.targets {
            let node = build_node(file, target, workspace)?;
            let _ = graph.add_node(node);
            if let TargetKind::DockerImage(image) = &target.kind {
                let _ = graph.images.insert(target.name.clone(), image.clone());
            }
        }
        for target in &file.targets {
            let dependent = graph.index[&target.name];
            for dep in &target.dependencies {
                graph.add_dependency(dependent, graph.index[dep]);
            }
        }
        graph.check_acyclic()?;

        tracing::info!(
            nodes = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            "build graph constructed"
        );
        Ok(graph)
    }

    /// Adds a node to the graph, keyed by its target name.
    pub fn add_node(&mut self, node: DependencyNode) -> NodeIndex {
        let name = node.address().target_name().to_string();
        let idx = self.graph.add_node(Arc::new(node));
        let _ = self.index.insert(name, idx);
        idx
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.add_edge(dependent, dependency, ());
    }

    /// Returns the node for a target name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Arc<DependencyNode>> {
        self.index.get(name).map(|&idx| &self.graph[idx])
    }

    /// Returns the image declaration of a `docker_image` target.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not exist or is not a `docker_image`.
    pub fn image(&self, name: &str) -> Result<&ImageDecl> {
        if let Some(image) = self.images.get(name) {
            return Ok(image);
        }
        if self.index.contains_key(name) {
            return Err(DockpackError::config(format!(
                "target \"{name}\" is not a docker_image"
            )));
        }
        Err(DockpackError::NotFound {
            kind: "target",
            id: name.to_string(),
        })
    }

    /// Returns the transitive dependencies of `root` in discovery order.
    ///
    /// The walk is breadth-first over dependencies in declaration order and
    /// visits every node exactly once. The root itself is not included.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a known target.
    pub fn closure(&self, root: &str) -> Result<Vec<Arc<DependencyNode>>> {
        let start = *self.index.get(root).ok_or_else(|| DockpackError::NotFound {
            kind: "target",
            id: root.to_string(),
        })?;

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut order = Vec::new();
        while let Some(idx) = queue.pop_front() {
            for dep in self.dependencies_of(idx) {
                if visited.insert(dep) {
                    order.push(Arc::clone(&self.graph[dep]));
                    queue.push_back(dep);
                }
            }
        }

        tracing::debug!(root, nodes = order.len(), "resolved dependency closure");
        Ok(order)
    }

    /// Direct dependencies of a node in the order they were added.
    fn dependencies_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        // petgraph lists the most recently added edge first.
        let mut deps: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        deps.reverse();
        deps
    }

    /// Fails if the graph contains a dependency cycle.
    fn check_acyclic(&self) -> Result<()> {
        petgraph::algo::toposort(&self.graph, None)
            .map(|_| ())
            .map_err(|cycle| {
                let name = self.graph[cycle.node_id()].address().target_name();
                DockpackError::config(format!(
                    "cyclic dependency detected in target graph at \"{name}\""
                ))
            })
    }
}

fn build_node(file: &BuildFile, target: &TargetDecl, workspace: &Path) -> Result<DependencyNode> {
    let node = DependencyNode::new(Address::new(&target.name));
    let node = match &target.kind {
        TargetKind::Files { sources } => node
            .with_capability(Capability::FileSources)
            .with_sources(sources.clone()),
        TargetKind::Resources { sources } => node
            .with_capability(Capability::ResourceSources)
            .with_sources(sources.clone()),
        TargetKind::PythonSources { sources } => node
            .with_capability(Capability::PythonSources)
            .with_sources(sources.clone()),
        TargetKind::RelocatedFiles {
            files_targets,
            src,
            dest,
        } => node
            .with_capability(Capability::RelocatedFiles)
            .with_sources(relocated_sources(file, files_targets))
            .with_relocation(Relocation {
                src: src.clone(),
                dest: dest.clone(),
            }),
        TargetKind::PythonRequirement { requirements } => node
            .with_capability(Capability::Requirements)
            .with_requirements(requirements.clone()),
        TargetKind::PythonRequirements { source } => node
            .with_capability(Capability::RequirementsFile)
            .with_capability(Capability::Requirements)
            .with_requirements(read_requirements(&workspace.join(source))?),
        TargetKind::DockerImage(_) | TargetKind::Target => node,
    };
    Ok(node)
}

fn relocated_sources(file: &BuildFile, files_targets: &[String]) -> Vec<String> {
    files_targets
        .iter()
        .filter_map(|name| file.target(name))
        .flat_map(|t| match &t.kind {
            TargetKind::Files { sources } => sources.clone(),
            _ => Vec::new(),
        })
        .collect()
}
