//! Dockerfile composition.

use std::fmt;

use dockpack_common::constants::APPLICATION_DIR;
use dockpack_common::error::{DockpackError, Result};
use dockpack_graph::ImageDecl;

use crate::contribution::ContributionEntry;
use crate::instruction::Instruction;

/// A rendered Dockerfile, one instruction per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipe {
    lines: Vec<String>,
}

impl Recipe {
    /// Wraps already rendered lines.
    #[must_use]
    pub const fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Returns the lines, without trailing newlines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Wraps ordered contribution lines in the image prologue and epilogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeComposer {
    /// Image to build `FROM`.
    pub base_image: String,
    /// Working directory; no `WORKDIR` line when absent.
    pub workdir: Option<String>,
    /// Commands run before any contribution, verbatim.
    pub setup_commands: Vec<String>,
    /// Startup command tokens; no `CMD` line when empty.
    pub command: Vec<String>,
}

impl RecipeComposer {
    /// Takes the prologue and epilogue from a `docker_image` declaration.
    #[must_use]
    pub fn from_image(image: &ImageDecl) -> Self {
        Self {
            base_image: image.base_image.clone(),
            workdir: image.workdir.clone(),
            setup_commands: image.image_setup_commands.clone(),
            command: image.command.clone(),
        }
    }

    /// Composes the Dockerfile.
    ///
    /// Contribution lines are ordered by ordering key, then discovery
    /// order, so the result does not depend on the order of `entries`.
    /// Lines are never deduplicated.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no base image is set.
    pub fn compose(&self, entries: &[ContributionEntry]) -> Result<Recipe> {
        if self.base_image.trim().is_empty() {
            return Err(DockpackError::config("docker image has no base image"));
        }

        let mut ordered: Vec<&ContributionEntry> = entries.iter().collect();
        ordered.sort_by_key(|e| (e.contribution.ordering_key, e.discovery));

        let mut lines = vec![Instruction::From(self.base_image.clone()).to_string()];
        if let Some(workdir) = &self.workdir {
            lines.push(Instruction::Workdir(workdir.clone()).to_string());
        }
        lines.extend(
            self.setup_commands
                .iter()
                .map(|cmd| Instruction::run(cmd.as_str()).to_string()),
        );
        for entry in ordered {
            lines.extend(entry.contribution.recipe_lines.iter().cloned());
        }
        lines.push(Instruction::copy(APPLICATION_DIR, ".").to_string());
        if !self.command.is_empty() {
            lines.push(Instruction::Cmd(self.command.clone()).to_string());
        }

        tracing::debug!(lines = lines.len(), "composed Dockerfile");
        Ok(Recipe { lines })
    }
}
