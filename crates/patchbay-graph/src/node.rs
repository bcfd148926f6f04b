//! Live node wrapper.
//!
//! An [`EffectNode`] wraps one live primitive: it owns the primitive's
//! handle, its parameter set, its metadata, and the declared outgoing
//! connections, and exposes connect/disconnect and parameter operations
//! against a [`PatchContext`]. Wrappers are exclusively owned by one
//! [`RuntimeGraph`](crate::RuntimeGraph); they are never shared across
//! graphs.

use patchbay_core::{NodeHandle, NodeOptions, NodeParam, PatchContext};

use crate::def::{ConnectionDef, NodeAttrs, NodeDef};
use crate::error::GraphError;

/// One live wrapped node.
#[derive(Debug)]
pub struct EffectNode {
    id: String,
    node_type: String,
    handle: NodeHandle,
    options: NodeOptions,
    attrs: NodeAttrs,
    params: Vec<NodeParam>,
    /// Declared outgoing connections, kept verbatim so
    /// [`to_def()`](Self::to_def) reproduces the original shape.
    connections: Vec<ConnectionDef>,
    destroyed: bool,
}

impl EffectNode {
    /// Wraps an already-created primitive handle with a definition's data.
    ///
    /// The definition's `audio_params` are stored but not yet applied to
    /// the live primitive; factories apply them via
    /// [`set_param`](Self::set_param). This is the constructor custom
    /// registry factories use.
    pub fn wrap(def: &NodeDef, handle: NodeHandle) -> Self {
        Self {
            id: def.id.clone(),
            node_type: def.node_type.clone(),
            handle,
            options: def.options.clone(),
            attrs: def.attrs.clone(),
            params: Vec::new(),
            connections: def.connections.clone(),
            destroyed: false,
        }
    }

    /// Creates a built-in primitive for the definition and applies its
    /// params. Used by the default registry factories.
    pub fn primitive(def: &NodeDef, ctx: &mut PatchContext) -> Result<Self, GraphError> {
        let handle = ctx.create_node(&def.node_type, &def.options)?;
        let mut node = Self::wrap(def, handle);
        for param in &def.audio_params {
            if let Err(err) = node.set_param(ctx, param.clone()) {
                // Unwind the half-built node before surfacing the error.
                let _ = node.destroy(ctx);
                return Err(err);
            }
        }
        Ok(node)
    }

    /// The node's id, unique within its graph.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The node's type tag.
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// The live primitive handle.
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// The node's metadata attributes.
    pub fn attrs(&self) -> &NodeAttrs {
        &self.attrs
    }

    /// The node's current parameter set.
    pub fn params(&self) -> &[NodeParam] {
        &self.params
    }

    /// Looks up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&NodeParam> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Connects this node's output to another node's input (default audio
    /// path). Missing indices default to port 0.
    pub fn connect_node(
        &mut self,
        ctx: &mut PatchContext,
        target: &EffectNode,
        output_index: Option<u32>,
        input_index: Option<u32>,
    ) -> Result<(), GraphError> {
        self.ensure_live()?;
        target.ensure_live()?;
        ctx.connect(
            self.handle,
            output_index.unwrap_or(0),
            target.handle,
            input_index.unwrap_or(0),
        )?;
        self.record(ConnectionDef {
            target_node_id: target.id.clone(),
            target_param_name: None,
            output_index,
            input_index,
        });
        Ok(())
    }

    /// Connects this node's output to a named parameter on the target node
    /// (modulation path).
    pub fn connect_param(
        &mut self,
        ctx: &mut PatchContext,
        target: &EffectNode,
        param_name: &str,
        output_index: Option<u32>,
    ) -> Result<(), GraphError> {
        self.ensure_live()?;
        target.ensure_live()?;
        ctx.connect_param(
            self.handle,
            output_index.unwrap_or(0),
            target.handle,
            param_name,
        )?;
        self.record(ConnectionDef {
            target_node_id: target.id.clone(),
            target_param_name: Some(param_name.to_owned()),
            output_index,
            input_index: None,
        });
        Ok(())
    }

    /// Sets a parameter: stores it (replacing any stored param of the same
    /// name, which keeps names unique within the node) and applies its
    /// effective constant to the live primitive.
    pub fn set_param(&mut self, ctx: &mut PatchContext, param: NodeParam) -> Result<(), GraphError> {
        self.ensure_live()?;
        if let Some(value) = param.constant() {
            ctx.set_param(self.handle, &param.name, value)?;
        }
        match self.params.iter_mut().find(|p| p.name == param.name) {
            Some(slot) => *slot = param,
            None => self.params.push(param),
        }
        Ok(())
    }

    /// Re-derives the declarative definition of this node, carrying its
    /// current parameter values and the declared connection list.
    pub fn to_def(&self) -> NodeDef {
        NodeDef {
            id: self.id.clone(),
            node_type: self.node_type.clone(),
            options: self.options.clone(),
            attrs: self.attrs.clone(),
            connections: self.connections.clone(),
            audio_params: self.params.clone(),
        }
    }

    /// Disconnects and releases the live primitive. Idempotent: a second
    /// call is a no-op, so a node is never double-destroyed.
    pub fn destroy(&mut self, ctx: &mut PatchContext) -> Result<(), GraphError> {
        if self.destroyed {
            return Ok(());
        }
        ctx.release(self.handle)?;
        self.destroyed = true;
        Ok(())
    }

    /// Records a connection definition unless an identical one is already
    /// declared. Instantiation re-applies declared connections, which must
    /// not duplicate them in `to_def()`.
    fn record(&mut self, conn: ConnectionDef) {
        if !self.connections.contains(&conn) {
            self.connections.push(conn);
        }
    }

    fn ensure_live(&self) -> Result<(), GraphError> {
        if self.destroyed {
            return Err(GraphError::NodeDestroyed(self.id.clone()));
        }
        Ok(())
    }
}
