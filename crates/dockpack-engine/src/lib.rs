//! # dockpack-engine
//!
//! Turns the dependency closure of a `docker_image` target into a build
//! context and a Dockerfile.
//!
//! Handles:
//! - **Registry**: The immutable table of producers, one per capability.
//! - **Resolver**: Pairs every closure node with its applicable producers.
//! - **Producers**: Files, resources, Python sources, relocated files,
//!   virtual-environment bootstrap, and pip requirements.
//! - **Context**: Conflict-checked merge of contributed files.
//! - **Recipe**: Ordered Dockerfile composition.
//! - **Package**: Concurrent production and the final package plan.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod context;
pub mod contribution;
pub mod instruction;
pub mod package;
pub mod producer;
pub mod recipe;
pub mod registry;
pub mod resolver;
pub mod snapshot;

pub use context::{BuildContext, assemble};
pub use contribution::{Contribution, ContributionEntry};
pub use package::{PackagePlan, plan_package};
pub use recipe::{Recipe, RecipeComposer};
pub use registry::ProducerRegistry;
