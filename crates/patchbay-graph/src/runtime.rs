//! Runtime graph — instantiation, queries, and teardown.
//!
//! [`RuntimeGraph`] turns a validated [`GraphDef`] into live wrapped nodes
//! on a [`PatchContext`]. Construction is two-pass: every node is created
//! first, then connections are applied in declaration order, so a
//! connection may reference a node declared after its owner. Any failure
//! tears down everything created so far — a failed instantiation never
//! leaves live nodes patched into the context.

use std::collections::HashMap;

use patchbay_core::{NodeParam, PatchContext};
use tracing::{debug, warn};

use crate::def::{GraphDef, NodeAttrs, NodeDef};
use crate::error::GraphError;
use crate::node::EffectNode;
use crate::registry::NodeRegistry;

/// Filter for [`RuntimeGraph::find_audio_effects`].
///
/// All provided fields must match (logical AND); omitted fields are
/// wildcards.
#[derive(Debug, Clone, Default)]
pub struct EffectFilter {
    /// Match on node id.
    pub id: Option<String>,
    /// Match on node type tag.
    pub node_type: Option<String>,
    /// Subset match against node attributes.
    pub attrs: Option<NodeAttrs>,
}

impl EffectFilter {
    /// Matches every node.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the filter to a node id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Restricts the filter to a node type tag.
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Restricts the filter to nodes whose attrs contain the given subset.
    pub fn with_attrs(mut self, attrs: NodeAttrs) -> Self {
        self.attrs = Some(attrs);
        self
    }

    fn matches(&self, node: &EffectNode) -> bool {
        if let Some(id) = &self.id
            && node.id() != id
        {
            return false;
        }
        if let Some(node_type) = &self.node_type
            && node.node_type() != node_type
        {
            return false;
        }
        if let Some(attrs) = &self.attrs
            && !node.attrs().matches_subset(attrs)
        {
            return false;
        }
        true
    }
}

/// Live graph: wrapped nodes plus their connections, bound to a context.
///
/// Owns every wrapper exclusively. `sourceEffects`/`destinationEffects`
/// are borrowed views into the owned node list.
#[derive(Debug)]
pub struct RuntimeGraph {
    nodes: Vec<EffectNode>,
    index: HashMap<String, usize>,
    source_ids: Vec<String>,
    destination_ids: Vec<String>,
    destroyed: bool,
}

impl RuntimeGraph {
    /// Instantiates a graph definition against a live context.
    ///
    /// Nodes are created in declaration order via the registry, then
    /// connections are applied in a second pass. All structural failures
    /// (duplicate id, unknown type, dangling connection target, empty or
    /// unresolvable source/destination sets) are fatal and synchronous,
    /// and destroy every node created before the failure.
    pub fn instantiate(
        def: &GraphDef,
        ctx: &mut PatchContext,
        registry: &NodeRegistry,
    ) -> Result<Self, GraphError> {
        if def.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }
        if def.source_node_ids.is_empty() {
            return Err(GraphError::NoSourceNodes);
        }
        if def.destination_node_ids.is_empty() {
            return Err(GraphError::NoDestinationNodes);
        }

        let mut nodes: Vec<EffectNode> = Vec::with_capacity(def.nodes.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(def.nodes.len());

        // Pass 1: create every node.
        for node_def in &def.nodes {
            if index.contains_key(&node_def.id) {
                let id = node_def.id.clone();
                Self::teardown(&mut nodes, ctx);
                return Err(GraphError::DuplicateNodeId(id));
            }
            match registry.create(node_def, ctx) {
                Ok(node) => {
                    index.insert(node_def.id.clone(), nodes.len());
                    nodes.push(node);
                }
                Err(err) => {
                    Self::teardown(&mut nodes, ctx);
                    return Err(err);
                }
            }
        }

        // Pass 2: apply connections, now that forward references resolve.
        if let Err(err) = Self::apply_connections(&def.nodes, &nodes, &index, ctx) {
            Self::teardown(&mut nodes, ctx);
            return Err(err);
        }

        // Source/destination ids must resolve to live wrappers.
        for id in def.source_node_ids.iter().chain(&def.destination_node_ids) {
            if !index.contains_key(id) {
                let id = id.clone();
                Self::teardown(&mut nodes, ctx);
                return Err(GraphError::UnknownNodeId(id));
            }
        }

        debug!(
            nodes = nodes.len(),
            sources = def.source_node_ids.len(),
            destinations = def.destination_node_ids.len(),
            "instantiated effects graph"
        );

        Ok(Self {
            nodes,
            index,
            source_ids: def.source_node_ids.clone(),
            destination_ids: def.destination_node_ids.clone(),
            destroyed: false,
        })
    }

    fn apply_connections(
        defs: &[NodeDef],
        nodes: &[EffectNode],
        index: &HashMap<String, usize>,
        ctx: &mut PatchContext,
    ) -> Result<(), GraphError> {
        for (node, node_def) in nodes.iter().zip(defs) {
            for conn in &node_def.connections {
                let target = index
                    .get(&conn.target_node_id)
                    .map(|&i| &nodes[i])
                    .ok_or_else(|| GraphError::UnknownNodeId(conn.target_node_id.clone()))?;
                let output = conn.output_index.unwrap_or(0);
                match &conn.target_param_name {
                    Some(param) => {
                        ctx.connect_param(node.handle(), output, target.handle(), param)?;
                    }
                    None => {
                        ctx.connect(
                            node.handle(),
                            output,
                            target.handle(),
                            conn.input_index.unwrap_or(0),
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Destroys every node created so far. Best-effort: teardown errors are
    /// logged, not surfaced, because a construction error is already in
    /// flight.
    fn teardown(nodes: &mut [EffectNode], ctx: &mut PatchContext) {
        for node in nodes {
            if let Err(err) = node.destroy(ctx) {
                warn!(node = node.id(), %err, "teardown of partially-built graph failed");
            }
        }
    }

    /// The graph's entry nodes, in the def's source id order.
    pub fn source_effects(&self) -> Vec<&EffectNode> {
        self.view(&self.source_ids)
    }

    /// The graph's exit nodes, in the def's destination id order.
    pub fn destination_effects(&self) -> Vec<&EffectNode> {
        self.view(&self.destination_ids)
    }

    fn view(&self, ids: &[String]) -> Vec<&EffectNode> {
        ids.iter()
            .filter_map(|id| self.index.get(id).map(|&i| &self.nodes[i]))
            .collect()
    }

    /// Linear scan for all live nodes matching the filter.
    pub fn find_audio_effects(&self, filter: &EffectFilter) -> Vec<&EffectNode> {
        self.nodes.iter().filter(|n| filter.matches(n)).collect()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&EffectNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Looks up a node mutably by id.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut EffectNode> {
        let i = *self.index.get(id)?;
        self.nodes.get_mut(i)
    }

    /// Sets a parameter on the node with the given id.
    pub fn set_param(
        &mut self,
        ctx: &mut PatchContext,
        id: &str,
        param: NodeParam,
    ) -> Result<(), GraphError> {
        if self.destroyed {
            return Err(GraphError::GraphDestroyed);
        }
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::UnknownNodeId(id.to_owned()))?;
        node.set_param(ctx, param)
    }

    /// Number of owned nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph owns no nodes (never the case after a
    /// successful instantiation).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Re-derives a [`GraphDef`] from current live state.
    ///
    /// Structure (node ids, types, connection topology, source and
    /// destination id sets) reproduces the def the graph was built from;
    /// param values reflect any live mutation since.
    pub fn to_def(&self) -> GraphDef {
        GraphDef {
            nodes: self.nodes.iter().map(EffectNode::to_def).collect(),
            source_node_ids: self.source_ids.clone(),
            destination_node_ids: self.destination_ids.clone(),
        }
    }

    /// Destroys every owned node. Idempotent; afterwards the graph is not
    /// reusable and mutating operations fail with
    /// [`GraphError::GraphDestroyed`].
    pub fn destroy(&mut self, ctx: &mut PatchContext) -> Result<(), GraphError> {
        if self.destroyed {
            return Ok(());
        }
        for node in &mut self.nodes {
            node.destroy(ctx)?;
        }
        self.destroyed = true;
        Ok(())
    }
}
