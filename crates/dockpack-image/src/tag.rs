//! Image names and tag references.

use std::fmt;

use serde::Serialize;

/// The repository-qualified image name and every reference it is tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageTag {
    name: String,
    references: Vec<String>,
}

impl ImageTag {
    /// Derives the references for `target`.
    ///
    /// Each declared tag yields `name:tag`, in declaration order, followed by
    /// the bare name. With a registry every reference is prefixed by
    /// `registry/`. Repeated tags are kept once.
    #[must_use]
    pub fn new(target: &str, tags: &[String], registry: Option<&str>) -> Self {
        let name = match registry.map(|r| r.trim_end_matches('/')) {
            Some(registry) if !registry.is_empty() => format!("{registry}/{target}"),
            _ => target.to_string(),
        };

        let mut references: Vec<String> = Vec::with_capacity(tags.len() + 1);
        for tag in tags {
            let reference = format!("{name}:{tag}");
            if !references.contains(&reference) {
                references.push(reference);
            }
        }
        references.push(name.clone());
        Self { name, references }
    }

    /// Returns the repository-qualified name, without a tag.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns every reference, ending with the bare name.
    #[must_use]
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Returns the reference `docker save` exports.
    #[must_use]
    pub fn export_reference(&self) -> &str {
        self.references.last().map_or(&self.name, String::as_str)
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.references.join(", "))
    }
}
