//! Python virtual-environment bootstrap and pip requirement installation.

use dockpack_common::config::PythonSettings;
use dockpack_common::constants::{APPLICATION_DIR, VIRTUAL_ENV_DIR};
use dockpack_common::error::{DockpackError, Result};
use dockpack_common::tree::{FileTree, join_path, normalize_path};
use dockpack_graph::{Capability, DependencyNode};

use super::{Producer, REQUIREMENTS_ORDER, VIRTUAL_ENV_ORDER};
use crate::contribution::Contribution;
use crate::instruction::{Instruction, shell_quote};
use crate::snapshot::SourceReader;

/// Creates and activates the virtual environment requirements install into.
#[derive(Debug, Clone)]
pub struct VirtualEnvProducer {
    reader: SourceReader,
    settings: PythonSettings,
}

impl VirtualEnvProducer {
    /// Creates the producer.
    #[must_use]
    pub const fn new(reader: SourceReader, settings: PythonSettings) -> Self {
        Self { reader, settings }
    }
}

impl Producer for VirtualEnvProducer {
    fn name(&self) -> &'static str {
        "virtual-env"
    }

    fn capability(&self) -> Capability {
        Capability::RequirementsFile
    }

    fn produce(&self, node: &DependencyNode) -> Result<Contribution> {
        if self.settings.enable_resolves {
            return Err(DockpackError::config(format!(
                "{}: lockfile resolves are not supported when packaging images; \
                 disable python.enable_resolves",
                node.address()
            )));
        }

        let mut lines = Vec::new();
        let mut files = None;
        if let Some(constraints) = &self.settings.requirement_constraints {
            let path = normalize_path(constraints)?;
            let content = self.reader.read(&path)?;
            let mut tree = FileTree::new();
            let _ = tree.insert(&path, content)?;
            files = Some(tree);
            lines.push(Instruction::copy(join_path(APPLICATION_DIR, &path), "."));
        }
        lines.extend([
            Instruction::run(format!("python -m venv --upgrade {VIRTUAL_ENV_DIR}")),
            Instruction::env("PATH", format!("{VIRTUAL_ENV_DIR}/bin:$PATH")),
            Instruction::env("VIRTUAL_ENV", VIRTUAL_ENV_DIR),
            Instruction::run("python -m pip install --upgrade pip"),
        ]);

        tracing::debug!(
            node = %node.address(),
            constraints = files.is_some(),
            "virtual environment bootstrap"
        );
        Ok(Contribution {
            ordering_key: VIRTUAL_ENV_ORDER,
            recipe_lines: lines.iter().map(ToString::to_string).collect(),
            files,
        })
    }
}

/// Installs each declared requirement with pip.
#[derive(Debug, Clone)]
pub struct RequirementsProducer {
    settings: PythonSettings,
}

impl RequirementsProducer {
    /// Creates the producer.
    #[must_use]
    pub const fn new(settings: PythonSettings) -> Self {
        Self { settings }
    }

    /// Arguments shared by every `pip install` line.
    fn pip_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self.settings.indexes.split_first() {
            Some((primary, extra)) => {
                args.push(format!("--index-url {primary}"));
                args.extend(extra.iter().map(|url| format!("--extra-index-url {url}")));
            }
            None => args.push("--no-index".to_string()),
        }
        args.extend(
            self.settings
                .find_links
                .iter()
                .map(|link| format!("--find-links {link}")),
        );
        if let Some(constraints) = &self.settings.requirement_constraints {
            let name = constraints.rsplit('/').next().unwrap_or(constraints);
            args.push(format!("--constraint {name}"));
        }
        args
    }
}

impl Producer for RequirementsProducer {
    fn name(&self) -> &'static str {
        "python-requirements"
    }

    fn capability(&self) -> Capability {
        Capability::Requirements
    }

    fn produce(&self, node: &DependencyNode) -> Result<Contribution> {
        let args = self.pip_args().join(" ");
        let lines = node
            .requirements()
            .iter()
            .map(|req| {
                Instruction::run(format!("python -m pip install {args} {}", shell_quote(req)))
                    .to_string()
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            node = %node.address(),
            requirements = lines.len(),
            "pip requirements"
        );
        Ok(Contribution::recipe(REQUIREMENTS_ORDER, lines))
    }
}
