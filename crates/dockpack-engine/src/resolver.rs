//! Pairs closure nodes with the producers that apply to them.

use std::sync::Arc;

use dockpack_graph::DependencyNode;

use crate::producer::Producer;
use crate::registry::ProducerRegistry;

/// One node matched with one applicable producer.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Position of the node in the dependency closure.
    pub discovery: usize,
    /// The node to produce for.
    pub node: Arc<DependencyNode>,
    /// The producer to run.
    pub producer: Arc<dyn Producer>,
}

/// Resolves every closure node against the registry.
///
/// Pairs come out in closure order, then registration order. A node no
/// producer applies to yields no pair.
#[must_use]
pub fn resolve(closure: &[Arc<DependencyNode>], registry: &ProducerRegistry) -> Vec<Resolution> {
    let mut resolutions = Vec::new();
    for (discovery, node) in closure.iter().enumerate() {
        let before = resolutions.len();
        for producer in registry.producers() {
            if producer.is_applicable(node) {
                resolutions.push(Resolution {
                    discovery,
                    node: Arc::clone(node),
                    producer: Arc::clone(producer),
                });
            }
        }
        if resolutions.len() == before {
            tracing::debug!(node = %node.address(), "no applicable producer");
        }
    }
    tracing::debug!(
        nodes = closure.len(),
        resolutions = resolutions.len(),
        "resolved producers"
    );
    resolutions
}
