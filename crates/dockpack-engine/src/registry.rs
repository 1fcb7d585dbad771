//! Producer registry

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use dockpack_common::config::DockpackConfig;
use dockpack_common::error::{DockpackError, Result};
use dockpack_graph::Capability;

use crate::producer::{
    FileSourcesProducer, Producer, ProducerSettings, RelocatedFilesProducer,
    RequirementsProducer, VirtualEnvProducer,
};

/// Table of producers, at most one per capability.
///
/// Populated once before packaging starts and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProducerRegistry {
    producers: Vec<Arc<dyn Producer>>,
    by_capability: BTreeMap<Capability, usize>,
}

impl ProducerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the six standard producers.
    ///
    /// # Errors
    ///
    /// Cannot fail in practice; registration errors are still propagated.
    pub fn with_defaults(config: &DockpackConfig, workspace: impl Into<PathBuf>) -> Result<Self> {
        let settings = ProducerSettings::from_config(config, workspace);
        let reader = settings.reader();

        let mut registry = Self::new();
        registry.register(Arc::new(FileSourcesProducer::files(reader.clone())))?;
        registry.register(Arc::new(FileSourcesProducer::resources(reader.clone())))?;
        registry.register(Arc::new(FileSourcesProducer::python_sources(reader.clone())))?;
        registry.register(Arc::new(RelocatedFilesProducer::new(reader.clone())))?;
        registry.register(Arc::new(VirtualEnvProducer::new(
            reader,
            settings.python.clone(),
        )))?;
        registry.register(Arc::new(RequirementsProducer::new(settings.python)))?;
        Ok(registry)
    }

    /// Adds a producer.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if another producer already serves the
    /// same capability.
    pub fn register(&mut self, producer: Arc<dyn Producer>) -> Result<()> {
        let capability = producer.capability();
        if let Some(&existing) = self.by_capability.get(&capability) {
            return Err(DockpackError::config(format!(
                "producers {} and {} both claim capability {capability}",
                self.producers[existing].name(),
                producer.name()
            )));
        }
        tracing::debug!(producer = producer.name(), %capability, "registered producer");
        let _ = self.by_capability.insert(capability, self.producers.len());
        self.producers.push(producer);
        Ok(())
    }

    /// Returns the producers in registration order.
    #[must_use]
    pub fn producers(&self) -> &[Arc<dyn Producer>] {
        &self.producers
    }

    /// Returns the producer serving `capability`, if any.
    #[must_use]
    pub fn get(&self, capability: Capability) -> Option<&Arc<dyn Producer>> {
        self.by_capability
            .get(&capability)
            .map(|&idx| &self.producers[idx])
    }

    /// Returns the number of registered producers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    /// Returns whether no producer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use dockpack_graph::DependencyNode;

    use super::*;
    use crate::contribution::Contribution;

    #[derive(Debug)]
    struct Fake(&'static str, Capability);

    impl Producer for Fake {
        fn name(&self) -> &'static str {
            self.0
        }

        fn capability(&self) -> Capability {
            self.1
        }

        fn produce(&self, _node: &DependencyNode) -> Result<Contribution> {
            Ok(Contribution::default())
        }
    }

    #[test]
    fn defaults_cover_every_capability() {
        let registry =
            ProducerRegistry::with_defaults(&DockpackConfig::default(), ".").expect("registry");
        assert_eq!(registry.len(), 6);
        for capability in [
            Capability::FileSources,
            Capability::ResourceSources,
            Capability::PythonSources,
            Capability::RelocatedFiles,
            Capability::RequirementsFile,
            Capability::Requirements,
        ] {
            assert!(registry.get(capability).is_some(), "missing {capability}");
        }
    }

    #[test]
    fn second_producer_for_a_capability_is_rejected() {
        let mut registry = ProducerRegistry::new();
        registry
            .register(Arc::new(Fake("first", Capability::FileSources)))
            .expect("first");
        let err = registry
            .register(Arc::new(Fake("second", Capability::FileSources)))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("first") && msg.contains("second"), "got: {msg}");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn producers_keep_registration_order() {
        let mut registry = ProducerRegistry::new();
        registry
            .register(Arc::new(Fake("b", Capability::Requirements)))
            .expect("b");
        registry
            .register(Arc::new(Fake("a", Capability::FileSources)))
            .expect("a");
        let names: Vec<_> = registry.producers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
