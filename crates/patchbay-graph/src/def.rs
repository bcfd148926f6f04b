//! Declarative graph model.
//!
//! [`GraphDef`] is the serializable description of an effects graph: node
//! definitions, directed connections, and which node ids are graph-level
//! sources and destinations. It is the engine's only persisted artifact;
//! the JSON field names (`nodes`, `sourceNodeIds`, `destinationNodeIds`,
//! `targetNodeId`, `audioParams`, ...) are fixed for round-trip
//! compatibility with the surrounding player's configuration objects.
//!
//! A `GraphDef` is an immutable value once built: the builder produces one,
//! a [`RuntimeGraph`](crate::RuntimeGraph) may re-derive a fresh one via
//! `to_def()`, but nothing mutates an existing def in place.

use std::collections::BTreeMap;

use patchbay_core::{NodeOptions, NodeParam, ScalarValue};
use serde::{Deserialize, Serialize};

/// One directed connection leaving a node.
///
/// Without `target_param_name` this is the default audio path
/// (output port → input port); with it, the connection modulates the named
/// parameter on the target node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDef {
    /// Id of the node this connection targets.
    pub target_node_id: String,
    /// Target parameter name for the modulation path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_param_name: Option<String>,
    /// Source output port. Defaults to 0 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_index: Option<u32>,
    /// Destination input port. Defaults to 0 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_index: Option<u32>,
}

impl ConnectionDef {
    /// Default audio path to a node.
    pub fn node(target_node_id: impl Into<String>) -> Self {
        Self {
            target_node_id: target_node_id.into(),
            target_param_name: None,
            output_index: None,
            input_index: None,
        }
    }

    /// Modulation path onto a named param of the target node.
    pub fn param(target_node_id: impl Into<String>, param_name: impl Into<String>) -> Self {
        Self {
            target_node_id: target_node_id.into(),
            target_param_name: Some(param_name.into()),
            output_index: None,
            input_index: None,
        }
    }

    /// Sets the source output port.
    pub fn with_output_index(mut self, index: u32) -> Self {
        self.output_index = Some(index);
        self
    }

    /// Sets the destination input port.
    pub fn with_input_index(mut self, index: u32) -> Self {
        self.input_index = Some(index);
        self
    }
}

/// Ordered node metadata used for filtering and search.
///
/// Values come from the closed [`ScalarValue`] set, which keeps
/// [`find_audio_effects`](crate::RuntimeGraph::find_audio_effects) subset
/// matching well-typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAttrs(pub BTreeMap<String, ScalarValue>);

impl NodeAttrs {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one attribute, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.0.get(key)
    }

    /// Returns true if every entry of `filter` is present here with an
    /// equal value.
    pub fn matches_subset(&self, filter: &NodeAttrs) -> bool {
        filter
            .0
            .iter()
            .all(|(k, v)| self.0.get(k).is_some_and(|own| own == v))
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Declarative description of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
    /// Unique id within the enclosing graph.
    pub id: String,
    /// Node type tag dispatched through the
    /// [`NodeRegistry`](crate::NodeRegistry) (e.g. `"gain"`, `"delay"`).
    #[serde(rename = "type")]
    pub node_type: String,
    /// Construction options passed to the underlying primitive.
    #[serde(default, skip_serializing_if = "NodeOptions::is_empty")]
    pub options: NodeOptions,
    /// Metadata used for filtering and search.
    #[serde(default, skip_serializing_if = "NodeAttrs::is_empty")]
    pub attrs: NodeAttrs,
    /// Ordered outgoing connections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<ConnectionDef>,
    /// Parameter serializations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio_params: Vec<NodeParam>,
}

impl NodeDef {
    /// Creates a bare definition of the given type, with no params.
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            options: NodeOptions::default(),
            attrs: NodeAttrs::default(),
            connections: Vec::new(),
            audio_params: Vec::new(),
        }
    }

    /// Gain node definition. Carries its `gain` param, default `1.0`.
    pub fn gain(id: impl Into<String>) -> Self {
        Self::new(id, "gain").with_param(NodeParam::new_constant("gain", 1.0))
    }

    /// Delay node definition. Carries its `delayTime` param, default `1.0`
    /// seconds.
    pub fn delay(id: impl Into<String>) -> Self {
        Self::new(id, "delay").with_param(NodeParam::new_constant("delayTime", 1.0))
    }

    /// Channel splitter definition for the given channel count.
    pub fn splitter(id: impl Into<String>, channels: u32) -> Self {
        Self::new(id, "splitter").with_option("channels", channels)
    }

    /// Channel merger definition for the given channel count.
    pub fn merger(id: impl Into<String>, channels: u32) -> Self {
        Self::new(id, "merger").with_option("channels", channels)
    }

    /// Adds a construction option, builder style.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.options.0.insert(key.into(), value.into());
        self
    }

    /// Adds a metadata attribute, builder style.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.attrs.0.insert(key.into(), value.into());
        self
    }

    /// Adds a parameter serialization, builder style.
    pub fn with_param(mut self, param: NodeParam) -> Self {
        self.audio_params.push(param);
        self
    }

    /// Appends an outgoing connection, builder style.
    pub fn connect_to(mut self, connection: ConnectionDef) -> Self {
        self.connections.push(connection);
        self
    }
}

/// A full serializable graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDef {
    /// Node definitions, in declaration order.
    pub nodes: Vec<NodeDef>,
    /// Graph-level entry point ids. Non-empty after building.
    pub source_node_ids: Vec<String>,
    /// Graph-level exit point ids. Non-empty after building.
    pub destination_node_ids: Vec<String>,
}

impl GraphDef {
    /// Looks up a node definition by id.
    pub fn node(&self, id: &str) -> Option<&NodeDef> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrs_subset_matching() {
        let attrs = NodeAttrs::new()
            .with("track", "main")
            .with("channel", 2.0)
            .with("hidden", false);

        assert!(attrs.matches_subset(&NodeAttrs::new()));
        assert!(attrs.matches_subset(&NodeAttrs::new().with("track", "main")));
        assert!(attrs.matches_subset(&NodeAttrs::new().with("track", "main").with("channel", 2.0)));
        assert!(!attrs.matches_subset(&NodeAttrs::new().with("track", "sidecar")));
        assert!(!attrs.matches_subset(&NodeAttrs::new().with("missing", true)));
        // Type mismatch on the same key is not a match.
        assert!(!attrs.matches_subset(&NodeAttrs::new().with("channel", "2")));
    }

    #[test]
    fn test_gain_def_carries_its_param() {
        let def = NodeDef::gain("g");
        assert_eq!(def.node_type, "gain");
        assert_eq!(def.audio_params.len(), 1);
        assert_eq!(def.audio_params[0].name, "gain");
        assert_eq!(def.audio_params[0].constant(), Some(1.0));
    }

    #[test]
    fn test_delay_def_default_time() {
        let def = NodeDef::delay("d");
        assert_eq!(def.audio_params[0].name, "delayTime");
        assert_eq!(def.audio_params[0].constant(), Some(1.0));
    }

    #[test]
    fn test_connection_json_field_names() {
        let conn = ConnectionDef::param("wet", "gain").with_output_index(1);
        let json = serde_json::to_string(&conn).unwrap();
        assert_eq!(
            json,
            r#"{"targetNodeId":"wet","targetParamName":"gain","outputIndex":1}"#
        );
    }

    #[test]
    fn test_graph_def_json_field_names() {
        let def = GraphDef {
            nodes: vec![NodeDef::new("a", "gain").connect_to(ConnectionDef::node("b"))],
            source_node_ids: vec!["a".into()],
            destination_node_ids: vec!["b".into()],
        };
        let json = serde_json::to_value(&def).unwrap();
        assert!(json.get("sourceNodeIds").is_some());
        assert!(json.get("destinationNodeIds").is_some());
        assert_eq!(json["nodes"][0]["type"], "gain");
        assert_eq!(json["nodes"][0]["connections"][0]["targetNodeId"], "b");
    }

    #[test]
    fn test_graph_def_roundtrips_through_json() {
        let def = GraphDef {
            nodes: vec![
                NodeDef::gain("a")
                    .with_attr("track", "main")
                    .connect_to(ConnectionDef::node("b").with_input_index(0)),
                NodeDef::delay("b"),
            ],
            source_node_ids: vec!["a".into()],
            destination_node_ids: vec!["b".into()],
        };
        let json = serde_json::to_string(&def).unwrap();
        let back: GraphDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let def = NodeDef::new("x", "splitter");
        let json = serde_json::to_string(&def).unwrap();
        assert_eq!(json, r#"{"id":"x","type":"splitter"}"#);
    }
}
