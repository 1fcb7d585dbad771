//! # dockpack-image
//!
//! Turns a composed build context into a Docker image.
//!
//! Handles:
//! - **Tags**: Registry-qualified image references for a target.
//! - **Materialization**: Context directories and reproducible archives.
//! - **Docker**: Executable discovery, `docker build`, and `docker save`.
//! - **Builder**: One build, and optional export, per package operation.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod builder;
pub mod docker;
pub mod materialize;
pub mod tag;

#[cfg(all(test, unix))]
mod test_support;

pub use builder::{BuiltPackage, ImageBuilder};
pub use docker::Docker;
pub use tag::ImageTag;
