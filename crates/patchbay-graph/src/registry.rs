//! Node type registry and factory.
//!
//! Instantiation dispatches on a node definition's `type` tag through a
//! factory table instead of a hardcoded switch: the built-in kinds are
//! registered at construction, and callers add new kinds with
//! [`register`](NodeRegistry::register) without touching the dispatch
//! site.

use patchbay_core::PatchContext;

use crate::def::NodeDef;
use crate::error::GraphError;
use crate::node::EffectNode;

/// Describes one node kind in the registry.
#[derive(Debug, Clone)]
pub struct NodeKindDescriptor {
    /// Unique type tag (lowercase, no spaces), as used in
    /// [`NodeDef::node_type`].
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description of the kind.
    pub description: &'static str,
    /// Names of the control params the kind exposes.
    pub param_names: &'static [&'static str],
}

/// Factory function type for creating live nodes.
pub type NodeFactory = fn(&NodeDef, &mut PatchContext) -> Result<EffectNode, GraphError>;

/// Internal entry in the registry.
struct RegistryEntry {
    descriptor: NodeKindDescriptor,
    factory: NodeFactory,
}

/// Registry of all instantiable node kinds.
///
/// # Example
///
/// ```rust
/// use patchbay_graph::NodeRegistry;
///
/// let registry = NodeRegistry::new();
/// for kind in registry.all_kinds() {
///     println!("{}: {}", kind.id, kind.description);
/// }
/// assert!(registry.get("gain").is_some());
/// ```
pub struct NodeRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    /// Creates a registry with all built-in kinds registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(5),
        };
        registry.register_builtin_kinds();
        registry
    }

    /// Registers all built-in node kinds.
    fn register_builtin_kinds(&mut self) {
        self.register(
            NodeKindDescriptor {
                id: "gain",
                name: "Gain",
                description: "Scales its input by a gain factor",
                param_names: &["gain"],
            },
            EffectNode::primitive,
        );

        self.register(
            NodeKindDescriptor {
                id: "delay",
                name: "Delay",
                description: "Delays its input by a configurable time",
                param_names: &["delayTime"],
            },
            EffectNode::primitive,
        );

        self.register(
            NodeKindDescriptor {
                id: "filter",
                name: "Filter",
                description: "Second-order filter with frequency, Q, and gain",
                param_names: &["frequency", "Q", "gain"],
            },
            EffectNode::primitive,
        );

        self.register(
            NodeKindDescriptor {
                id: "splitter",
                name: "Channel Splitter",
                description: "Fans one input out to per-channel outputs",
                param_names: &[],
            },
            EffectNode::primitive,
        );

        self.register(
            NodeKindDescriptor {
                id: "merger",
                name: "Channel Merger",
                description: "Merges per-channel inputs into one output",
                param_names: &[],
            },
            EffectNode::primitive,
        );
    }

    /// Registers a node kind. Type tags are expected to be unique; lookup
    /// returns the earliest registration for a tag.
    pub fn register(&mut self, descriptor: NodeKindDescriptor, factory: NodeFactory) {
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Gets a descriptor by type tag.
    pub fn get(&self, id: &str) -> Option<&NodeKindDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| &e.descriptor)
    }

    /// Creates a live node for a definition by dispatching on its type tag.
    ///
    /// Fails with [`GraphError::UnknownNodeType`] for unregistered tags.
    pub fn create(&self, def: &NodeDef, ctx: &mut PatchContext) -> Result<EffectNode, GraphError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.descriptor.id == def.node_type)
            .ok_or_else(|| GraphError::UnknownNodeType(def.node_type.clone()))?;
        (entry.factory)(def, ctx)
    }

    /// Returns descriptors for all registered kinds.
    pub fn all_kinds(&self) -> Vec<&NodeKindDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Returns the number of registered kinds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
