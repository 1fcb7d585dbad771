//! Static validation of a parsed build file.
//!
//! Checks for undefined references, duplicate names, and missing
//! required fields before any producer runs.

use std::collections::{HashMap, HashSet};

use dockpack_common::error::{DockpackError, Result};

use crate::build_file::{BuildFile, TargetKind};

/// Validates a parsed build file for semantic correctness.
///
/// # Checks performed
///
/// 1. No duplicate target names.
/// 2. Every dependency references a defined target.
/// 3. Every `relocated_files` entry references a defined `files` target.
/// 4. Every `docker_image` declares a non-empty base image.
///
/// Dependency cycles are detected when the graph is built.
///
/// # Errors
///
/// Returns an error if any semantic check fails.
pub fn validate(file: &BuildFile) -> Result<()> {
    tracing::info!(targets = file.targets.len(), "validating build file");
    check_duplicate_targets(file)?;
    check_dependency_references(file)?;
    check_relocated_references(file)?;
    check_base_image_required(file)?;
    Ok(())
}

fn check_duplicate_targets(file: &BuildFile) -> Result<()> {
    let mut seen = HashSet::new();
    for target in &file.targets {
        if !seen.insert(&target.name) {
            return Err(DockpackError::config(format!(
                "duplicate target name: \"{}\"",
                target.name
            )));
        }
    }
    Ok(())
}

fn check_dependency_references(file: &BuildFile) -> Result<()> {
    let names: HashSet<&str> = file.targets.iter().map(|t| t.name.as_str()).collect();

    for target in &file.targets {
        for dep in &target.dependencies {
            if !names.contains(dep.as_str()) {
                return Err(DockpackError::NotFound {
                    kind: "target",
                    id: format!("\"{dep}\" (dependency of \"{}\")", target.name),
                });
            }
        }
    }
    Ok(())
}

fn check_relocated_references(file: &BuildFile) -> Result<()> {
    let kinds: HashMap<&str, &TargetKind> = file
        .targets
        .iter()
        .map(|t| (t.name.as_str(), &t.kind))
        .collect();

    for target in &file.targets {
        let TargetKind::RelocatedFiles { files_targets, .. } = &target.kind else {
            continue;
        };
        for name in files_targets {
            match kinds.get(name.as_str()) {
                None => {
                    return Err(DockpackError::NotFound {
                        kind: "target",
                        id: format!("\"{name}\" (files_targets of \"{}\")", target.name),
                    });
                }
                Some(TargetKind::Files { .. }) => {}
                Some(other) => {
                    return Err(DockpackError::config(format!(
                        "relocated_files \"{}\" references \"{name}\" of kind {}, expected files",
                        target.name,
                        other.alias()
                    )));
                }
            }
        }
    }
    Ok(())
}

fn check_base_image_required(file: &BuildFile) -> Result<()> {
    for target in &file.targets {
        if let TargetKind::DockerImage(image) = &target.kind {
            if image.base_image.trim().is_empty() {
                return Err(DockpackError::config(format!(
                    "docker_image \"{}\" has an empty base_image",
                    target.name
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_file::{ImageDecl, TargetDecl};

    fn make_target(name: &str, kind: TargetKind, deps: &[&str]) -> TargetDecl {
        TargetDecl {
            name: name.into(),
            dependencies: deps.iter().map(|d| (*d).to_string()).collect(),
            kind,
        }
    }

    fn files(name: &str) -> TargetDecl {
        make_target(
            name,
            TargetKind::Files {
                sources: vec![format!("{name}.txt")],
            },
            &[],
        )
    }

    fn file_of(targets: Vec<TargetDecl>) -> BuildFile {
        BuildFile {
            targets,
            ..BuildFile::default()
        }
    }

    #[test]
    fn validate_empty_file_succeeds() {
        assert!(validate(&BuildFile::default()).is_ok());
    }

    #[test]
    fn validate_valid_file_succeeds() {
        let file = file_of(vec![
            files("conf"),
            make_target(
                "svc",
                TargetKind::DockerImage(ImageDecl::new("alpine")),
                &["conf"],
            ),
        ]);
        assert!(validate(&file).is_ok());
    }

    #[test]
    fn validate_duplicate_target_name_fails() {
        let file = file_of(vec![files("conf"), files("conf")]);
        let msg = validate(&file).unwrap_err().to_string();
        assert!(msg.contains("duplicate target name"), "got: {msg}");
    }

    #[test]
    fn validate_undefined_dependency_fails() {
        let file = file_of(vec![make_target("group", TargetKind::Target, &["ghost"])]);
        let msg = validate(&file).unwrap_err().to_string();
        assert!(msg.contains("ghost"), "got: {msg}");
    }

    #[test]
    fn validate_relocated_undefined_target_fails() {
        let file = file_of(vec![make_target(
            "moved",
            TargetKind::RelocatedFiles {
                files_targets: vec!["ghost".into()],
                src: String::new(),
                dest: "etc".into(),
            },
            &[],
        )]);
        let msg = validate(&file).unwrap_err().to_string();
        assert!(msg.contains("ghost"), "got: {msg}");
    }

    #[test]
    fn validate_relocated_non_files_target_fails() {
        let file = file_of(vec![
            make_target("group", TargetKind::Target, &[]),
            make_target(
                "moved",
                TargetKind::RelocatedFiles {
                    files_targets: vec!["group".into()],
                    src: String::new(),
                    dest: "etc".into(),
                },
                &[],
            ),
        ]);
        let msg = validate(&file).unwrap_err().to_string();
        assert!(msg.contains("expected files"), "got: {msg}");
    }

    #[test]
    fn validate_empty_base_image_fails() {
        let file = file_of(vec![make_target(
            "svc",
            TargetKind::DockerImage(ImageDecl::new("  ")),
            &[],
        )]);
        let msg = validate(&file).unwrap_err().to_string();
        assert!(msg.contains("empty base_image"), "got: {msg}");
    }
}
