//! # dockpack-graph
//!
//! The build graph dockpack packages from.
//!
//! Handles:
//! - **Build file**: YAML declaration of targets and workspace settings.
//! - **Validator**: Duplicate names, undefined references, invalid fields.
//! - **Node**: The read-only, capability-queryable view producers consume.
//! - **Graph**: Dependency graph construction, cycle detection, and closure.
//! - **Requirements**: Parsing of pip requirements files.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod build_file;
pub mod graph;
pub mod node;
pub mod requirements;
pub mod validator;

pub use build_file::{BuildFile, ImageDecl, TargetDecl, TargetKind};
pub use graph::BuildGraph;
pub use node::{Capability, DependencyNode, Relocation};
