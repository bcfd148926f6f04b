//! Validating builder for [`GraphDef`].
//!
//! The builder lets callers register node definitions and internal wiring
//! only, and infers which nodes are the graph's entry and exit points from
//! topology — the way effect chains are usually authored. Explicit
//! source/destination pins are honored as authoritative; candidates the
//! explicit lists leave out are reported as a non-fatal warning.
//!
//! Builder state is accumulated into owned collections and produces an
//! immutable [`GraphDef`] only at [`build()`](GraphDefBuilder::build);
//! nothing mutable leaks out afterwards.

use std::collections::BTreeSet;

use tracing::warn;

use crate::def::{ConnectionDef, GraphDef, NodeDef};
use crate::error::GraphError;

/// Accumulates node definitions and connections into a validated
/// [`GraphDef`].
///
/// # Example
///
/// ```rust
/// use patchbay_graph::{GraphDefBuilder, NodeDef};
///
/// let mut builder = GraphDefBuilder::new();
/// builder.add_effect(NodeDef::gain("a"))?;
/// builder.add_effect(NodeDef::delay("b"))?;
/// builder.add_effect(NodeDef::gain("c"))?;
/// builder.connect("a", "b")?;
/// builder.connect("b", "c")?;
///
/// let def = builder.build()?;
/// assert_eq!(def.source_node_ids, vec!["a"]);
/// assert_eq!(def.destination_node_ids, vec!["c"]);
/// # Ok::<(), patchbay_graph::GraphError>(())
/// ```
#[derive(Debug, Default)]
pub struct GraphDefBuilder {
    nodes: Vec<NodeDef>,
    explicit_sources: Option<Vec<String>>,
    explicit_destinations: Option<Vec<String>>,
}

impl GraphDefBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one node definition.
    ///
    /// Fails with [`GraphError::DuplicateNodeId`] if a node with the same
    /// id was already added.
    pub fn add_effect(&mut self, def: NodeDef) -> Result<(), GraphError> {
        if self.nodes.iter().any(|n| n.id == def.id) {
            return Err(GraphError::DuplicateNodeId(def.id));
        }
        self.nodes.push(def);
        Ok(())
    }

    /// Appends a default-path connection from `source_id` to
    /// `destination_id`.
    ///
    /// Fails with [`GraphError::UnknownNodeId`] if either id is unknown.
    pub fn connect(&mut self, source_id: &str, destination_id: &str) -> Result<(), GraphError> {
        if !self.nodes.iter().any(|n| n.id == destination_id) {
            return Err(GraphError::UnknownNodeId(destination_id.to_owned()));
        }
        let source = self
            .nodes
            .iter_mut()
            .find(|n| n.id == source_id)
            .ok_or_else(|| GraphError::UnknownNodeId(source_id.to_owned()))?;
        source.connections.push(ConnectionDef::node(destination_id));
        Ok(())
    }

    /// Explicitly pins which nodes are graph sources.
    ///
    /// The explicit list is authoritative at [`build()`](Self::build);
    /// inference-eligible nodes it leaves out are warned about, not
    /// rejected.
    pub fn source_effects_ids<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.explicit_sources = Some(ids.into_iter().map(Into::into).collect());
    }

    /// Explicitly pins which nodes are graph destinations.
    pub fn destination_effects_ids<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.explicit_destinations = Some(ids.into_iter().map(Into::into).collect());
    }

    /// Produces the final [`GraphDef`].
    ///
    /// Source candidates are nodes with no incoming connections,
    /// destination candidates nodes with no outgoing connections, both in
    /// registration order. Explicit ids override inference. Fails when the
    /// graph is empty, when a connection or explicit id dangles, or when a
    /// resolved source/destination set ends up empty.
    pub fn build(self) -> Result<GraphDef, GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        // Every connection target must reference a registered node. Catches
        // connections pre-baked into added defs, which connect() never saw.
        for node in &self.nodes {
            for conn in &node.connections {
                if !self.nodes.iter().any(|n| n.id == conn.target_node_id) {
                    return Err(GraphError::UnknownNodeId(conn.target_node_id.clone()));
                }
            }
        }

        let targeted: BTreeSet<&str> = self
            .nodes
            .iter()
            .flat_map(|n| n.connections.iter())
            .map(|c| c.target_node_id.as_str())
            .collect();

        // Inference preserves registration order, not graph order.
        let inferred_sources: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| !targeted.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect();
        let inferred_destinations: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| n.connections.is_empty())
            .map(|n| n.id.clone())
            .collect();

        let source_node_ids = self.resolve(
            self.explicit_sources.as_deref(),
            &inferred_sources,
            "source",
        )?;
        let destination_node_ids = self.resolve(
            self.explicit_destinations.as_deref(),
            &inferred_destinations,
            "destination",
        )?;

        if source_node_ids.is_empty() {
            return Err(GraphError::NoSourceNodes);
        }
        if destination_node_ids.is_empty() {
            return Err(GraphError::NoDestinationNodes);
        }

        Ok(GraphDef {
            nodes: self.nodes,
            source_node_ids,
            destination_node_ids,
        })
    }

    /// Applies an explicit id list over inferred candidates.
    ///
    /// Explicit ids are validated and authoritative; hanging candidates
    /// (inferred but not listed) only produce a warning.
    fn resolve(
        &self,
        explicit: Option<&[String]>,
        inferred: &[String],
        role: &'static str,
    ) -> Result<Vec<String>, GraphError> {
        let Some(explicit) = explicit else {
            return Ok(inferred.to_vec());
        };
        for id in explicit {
            if !self.nodes.iter().any(|n| n.id == *id) {
                return Err(GraphError::UnknownNodeId(id.clone()));
            }
        }
        let hanging: Vec<&str> = inferred
            .iter()
            .filter(|id| !explicit.contains(*id))
            .map(String::as_str)
            .collect();
        if !hanging.is_empty() {
            warn!(
                role,
                hanging = ?hanging,
                "explicit {role} ids leave inferred candidates unconnected"
            );
        }
        Ok(explicit.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def::NodeDef;

    #[test]
    fn test_linear_chain_inference() {
        let mut builder = GraphDefBuilder::new();
        builder.add_effect(NodeDef::gain("A")).unwrap();
        builder.add_effect(NodeDef::gain("B")).unwrap();
        builder.add_effect(NodeDef::gain("C")).unwrap();
        builder.connect("A", "B").unwrap();
        builder.connect("B", "C").unwrap();

        let def = builder.build().unwrap();
        assert_eq!(def.source_node_ids, vec!["A"]);
        assert_eq!(def.destination_node_ids, vec!["C"]);
    }

    #[test]
    fn test_single_node_is_source_and_destination() {
        let mut builder = GraphDefBuilder::new();
        builder.add_effect(NodeDef::gain("only")).unwrap();

        let def = builder.build().unwrap();
        assert_eq!(def.source_node_ids, vec!["only"]);
        assert_eq!(def.destination_node_ids, vec!["only"]);
    }

    #[test]
    fn test_branching_preserves_registration_order() {
        // D and A both have no incoming edges; A registered after D, so the
        // inferred list is [D, A] regardless of graph shape.
        let mut builder = GraphDefBuilder::new();
        builder.add_effect(NodeDef::gain("D")).unwrap();
        builder.add_effect(NodeDef::gain("A")).unwrap();
        builder.add_effect(NodeDef::gain("M")).unwrap();
        builder.connect("D", "M").unwrap();
        builder.connect("A", "M").unwrap();

        let def = builder.build().unwrap();
        assert_eq!(def.source_node_ids, vec!["D", "A"]);
        assert_eq!(def.destination_node_ids, vec!["M"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut builder = GraphDefBuilder::new();
        builder.add_effect(NodeDef::gain("x")).unwrap();
        let err = builder.add_effect(NodeDef::delay("x")).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNodeId(id) if id == "x"));
    }

    #[test]
    fn test_dangling_connect_rejected_immediately() {
        let mut builder = GraphDefBuilder::new();
        builder.add_effect(NodeDef::gain("A")).unwrap();

        let err = builder.connect("A", "Z").unwrap_err();
        assert!(matches!(err, GraphError::UnknownNodeId(id) if id == "Z"));

        let err = builder.connect("Q", "A").unwrap_err();
        assert!(matches!(err, GraphError::UnknownNodeId(id) if id == "Q"));
    }

    #[test]
    fn test_prebaked_dangling_connection_rejected_at_build() {
        let mut builder = GraphDefBuilder::new();
        builder
            .add_effect(NodeDef::gain("A").connect_to(crate::ConnectionDef::node("ghost")))
            .unwrap();

        let err = builder.build().unwrap_err();
        assert!(matches!(err, GraphError::UnknownNodeId(id) if id == "ghost"));
    }

    #[test]
    fn test_empty_graph_rejected() {
        let err = GraphDefBuilder::new().build().unwrap_err();
        assert!(matches!(err, GraphError::EmptyGraph));
    }

    #[test]
    fn test_explicit_ids_are_authoritative() {
        let mut builder = GraphDefBuilder::new();
        builder.add_effect(NodeDef::gain("A")).unwrap();
        builder.add_effect(NodeDef::gain("B")).unwrap();
        builder.add_effect(NodeDef::gain("C")).unwrap();
        builder.connect("A", "C").unwrap();
        builder.connect("B", "C").unwrap();

        // B is also a valid inferred source; pinning only A must still
        // succeed (B becomes a warned-about hanging candidate).
        builder.source_effects_ids(["A"]);
        let def = builder.build().unwrap();
        assert_eq!(def.source_node_ids, vec!["A"]);
    }

    #[test]
    fn test_explicit_unknown_id_rejected() {
        let mut builder = GraphDefBuilder::new();
        builder.add_effect(NodeDef::gain("A")).unwrap();
        builder.source_effects_ids(["nope"]);

        let err = builder.build().unwrap_err();
        assert!(matches!(err, GraphError::UnknownNodeId(id) if id == "nope"));
    }

    #[test]
    fn test_cycle_yields_no_sources() {
        let mut builder = GraphDefBuilder::new();
        builder.add_effect(NodeDef::gain("A")).unwrap();
        builder.add_effect(NodeDef::gain("B")).unwrap();
        builder.connect("A", "B").unwrap();
        builder.connect("B", "A").unwrap();

        let err = builder.build().unwrap_err();
        assert!(matches!(err, GraphError::NoSourceNodes));
    }

    #[test]
    fn test_explicit_destinations() {
        let mut builder = GraphDefBuilder::new();
        builder.add_effect(NodeDef::gain("A")).unwrap();
        builder.add_effect(NodeDef::gain("B")).unwrap();
        builder.add_effect(NodeDef::gain("tap")).unwrap();
        builder.connect("A", "B").unwrap();
        builder.connect("A", "tap").unwrap();

        builder.destination_effects_ids(["B"]);
        let def = builder.build().unwrap();
        assert_eq!(def.destination_node_ids, vec!["B"]);
    }
}
