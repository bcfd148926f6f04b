//! Live patch context — node allocation and connection bookkeeping.
//!
//! [`PatchContext`] is the process-wide handle the rest of the engine patches
//! against: it owns every live primitive node and every live connection
//! between them. The effects graph and the channel router never talk to each
//! other's nodes directly; everything goes through the context, passed
//! `&mut` into each mutating call.
//!
//! A context supports two edge flavors, mirroring the host audio model the
//! engine targets:
//!
//! - **audio edges** — node output → node input (the default signal path)
//! - **param edges** — node output → a named control parameter on the
//!   destination node (modulation path)
//!
//! All operations are synchronous and complete before returning. Node
//! creation, connection, and parameter writes never block; tearing a node
//! down ([`disconnect_all`](PatchContext::disconnect_all) +
//! [`release`](PatchContext::release)) is the only cancellation primitive.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scalar::ScalarValue;

/// Unique identifier for a live node in a [`PatchContext`].
///
/// Handles are assigned sequentially and never reused within a context, so
/// a stale handle is detected rather than silently aliasing a newer node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle(u32);

impl NodeHandle {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeHandle({})", self.0)
    }
}

/// Typed construction options passed to a primitive.
///
/// An ordered string → scalar map. Primitives read the keys they understand
/// (`channels` on splitters and mergers, initial control values elsewhere)
/// and ignore the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeOptions(pub BTreeMap<String, ScalarValue>);

impl NodeOptions {
    /// Creates an empty options map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one option, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the numeric value of a key, if present and numeric.
    pub fn num(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(ScalarValue::as_num)
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Errors from live patch operations.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The requested primitive kind is not one the context can allocate.
    #[error("unknown node kind '{0}'")]
    UnknownKind(String),

    /// The handle refers to a node that was released (or never existed).
    #[error("node {0} is not live")]
    DeadNode(NodeHandle),

    /// The named control parameter does not exist on the primitive.
    #[error("primitive '{kind}' has no param '{name}'")]
    UnknownParam {
        /// Kind tag of the primitive.
        kind: &'static str,
        /// The requested param name.
        name: String,
    },

    /// An output or input index is outside the primitive's port range.
    #[error("{direction} index {index} out of range for {handle} ({count} ports)")]
    PortOutOfRange {
        /// The node whose port range was exceeded.
        handle: NodeHandle,
        /// `"output"` or `"input"`.
        direction: &'static str,
        /// The offending index.
        index: u32,
        /// Number of ports the node actually has.
        count: u32,
    },
}

/// The primitive kinds a context can allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrimitiveKind {
    Gain,
    Delay,
    Splitter,
    Merger,
    Filter,
}

impl PrimitiveKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "gain" => Some(Self::Gain),
            "delay" => Some(Self::Delay),
            "splitter" => Some(Self::Splitter),
            "merger" => Some(Self::Merger),
            "filter" => Some(Self::Filter),
            _ => None,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Gain => "gain",
            Self::Delay => "delay",
            Self::Splitter => "splitter",
            Self::Merger => "merger",
            Self::Filter => "filter",
        }
    }
}

/// One live primitive node.
#[derive(Debug)]
struct Primitive {
    kind: PrimitiveKind,
    inputs: u32,
    outputs: u32,
    /// Live control values keyed by param name.
    params: BTreeMap<String, f64>,
}

impl Primitive {
    fn new(kind: PrimitiveKind, options: &NodeOptions) -> Self {
        let channels = options.num("channels").map_or(2, |n| (n.max(1.0)) as u32);
        let mut params = BTreeMap::new();
        let (inputs, outputs) = match kind {
            PrimitiveKind::Gain => {
                params.insert("gain".to_owned(), options.num("gain").unwrap_or(1.0));
                (1, 1)
            }
            PrimitiveKind::Delay => {
                params.insert(
                    "delayTime".to_owned(),
                    options.num("delayTime").unwrap_or(1.0),
                );
                (1, 1)
            }
            PrimitiveKind::Filter => {
                params.insert(
                    "frequency".to_owned(),
                    options.num("frequency").unwrap_or(350.0),
                );
                params.insert("Q".to_owned(), options.num("Q").unwrap_or(1.0));
                params.insert("gain".to_owned(), options.num("gain").unwrap_or(0.0));
                (1, 1)
            }
            PrimitiveKind::Splitter => (1, channels),
            PrimitiveKind::Merger => (channels, 1),
        };
        Self {
            kind,
            inputs,
            outputs,
            params,
        }
    }
}

/// One live edge in the patch.
#[derive(Debug, Clone, PartialEq)]
enum LiveEdge {
    /// Audio path: output port → input port.
    Audio {
        src: NodeHandle,
        src_output: u32,
        dst: NodeHandle,
        dst_input: u32,
    },
    /// Modulation path: output port → named param.
    Param {
        src: NodeHandle,
        src_output: u32,
        dst: NodeHandle,
        param: String,
    },
}

impl LiveEdge {
    fn touches(&self, handle: NodeHandle) -> bool {
        match self {
            LiveEdge::Audio { src, dst, .. } | LiveEdge::Param { src, dst, .. } => {
                *src == handle || *dst == handle
            }
        }
    }
}

/// Owns live primitive nodes and the connections between them.
///
/// # Usage
///
/// ```rust
/// use patchbay_core::{NodeOptions, PatchContext};
///
/// let mut ctx = PatchContext::new(48000.0);
/// let gain = ctx.create_node("gain", &NodeOptions::new()).unwrap();
/// let delay = ctx.create_node("delay", &NodeOptions::new()).unwrap();
///
/// ctx.connect(gain, 0, delay, 0).unwrap();
/// assert!(ctx.is_connected(gain, 0, delay, 0));
///
/// ctx.disconnect_all(gain).unwrap();
/// ctx.release(gain).unwrap();
/// assert_eq!(ctx.node_count(), 1);
/// ```
#[derive(Debug)]
pub struct PatchContext {
    nodes: Vec<Option<Primitive>>,
    edges: Vec<LiveEdge>,
    sample_rate: f32,
}

impl PatchContext {
    /// Creates an empty context.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            sample_rate,
        }
    }

    /// Returns the context sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Allocates a primitive of the given kind.
    ///
    /// Built-in kinds: `gain`, `delay`, `splitter`, `merger`, `filter`.
    /// Unspecified control values take their primitive defaults (gain `1.0`,
    /// delay time `1.0` s).
    pub fn create_node(&mut self, kind: &str, options: &NodeOptions) -> Result<NodeHandle, PatchError> {
        let kind = PrimitiveKind::from_tag(kind)
            .ok_or_else(|| PatchError::UnknownKind(kind.to_owned()))?;
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(Some(Primitive::new(kind, options)));
        Ok(handle)
    }

    /// Connects an output port of `src` to an input port of `dst`.
    ///
    /// Re-connecting an already-live edge is a no-op.
    pub fn connect(
        &mut self,
        src: NodeHandle,
        src_output: u32,
        dst: NodeHandle,
        dst_input: u32,
    ) -> Result<(), PatchError> {
        self.check_port(src, src_output, "output")?;
        self.check_port(dst, dst_input, "input")?;
        let edge = LiveEdge::Audio {
            src,
            src_output,
            dst,
            dst_input,
        };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
        Ok(())
    }

    /// Connects an output port of `src` to a named param of `dst`.
    pub fn connect_param(
        &mut self,
        src: NodeHandle,
        src_output: u32,
        dst: NodeHandle,
        param: &str,
    ) -> Result<(), PatchError> {
        self.check_port(src, src_output, "output")?;
        let node = self.live(dst)?;
        if !node.params.contains_key(param) {
            return Err(PatchError::UnknownParam {
                kind: node.kind.tag(),
                name: param.to_owned(),
            });
        }
        let edge = LiveEdge::Param {
            src,
            src_output,
            dst,
            param: param.to_owned(),
        };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
        Ok(())
    }

    /// Removes the audio edge between the given ports, if it is live.
    ///
    /// Removing an edge that is not live is a no-op; routing callers apply
    /// desired state without tracking what is already patched.
    pub fn disconnect(
        &mut self,
        src: NodeHandle,
        src_output: u32,
        dst: NodeHandle,
        dst_input: u32,
    ) -> Result<(), PatchError> {
        self.live(src)?;
        self.live(dst)?;
        let edge = LiveEdge::Audio {
            src,
            src_output,
            dst,
            dst_input,
        };
        self.edges.retain(|e| *e != edge);
        Ok(())
    }

    /// Removes every live edge touching the node, in either direction.
    ///
    /// Idempotent.
    pub fn disconnect_all(&mut self, handle: NodeHandle) -> Result<(), PatchError> {
        self.live(handle)?;
        self.edges.retain(|e| !e.touches(handle));
        Ok(())
    }

    /// Frees a node's slot. Any remaining edges are removed first.
    ///
    /// After release the handle is dead: every later operation on it fails
    /// with [`PatchError::DeadNode`].
    pub fn release(&mut self, handle: NodeHandle) -> Result<(), PatchError> {
        self.disconnect_all(handle)?;
        self.nodes[handle.0 as usize] = None;
        Ok(())
    }

    /// Writes a control value on a live primitive.
    pub fn set_param(
        &mut self,
        handle: NodeHandle,
        name: &str,
        value: f64,
    ) -> Result<(), PatchError> {
        let node = self.live_mut(handle)?;
        let kind = node.kind.tag();
        match node.params.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(PatchError::UnknownParam {
                kind,
                name: name.to_owned(),
            }),
        }
    }

    /// Reads a control value, or `None` when the handle is dead or the
    /// param unknown.
    pub fn param(&self, handle: NodeHandle, name: &str) -> Option<f64> {
        self.nodes
            .get(handle.0 as usize)?
            .as_ref()?
            .params
            .get(name)
            .copied()
    }

    /// Returns true if the given audio edge is live.
    pub fn is_connected(
        &self,
        src: NodeHandle,
        src_output: u32,
        dst: NodeHandle,
        dst_input: u32,
    ) -> bool {
        self.edges.contains(&LiveEdge::Audio {
            src,
            src_output,
            dst,
            dst_input,
        })
    }

    /// Returns true if the given param edge is live.
    pub fn is_param_connected(&self, src: NodeHandle, dst: NodeHandle, param: &str) -> bool {
        self.edges.iter().any(|e| {
            matches!(e, LiveEdge::Param { src: s, dst: d, param: p, .. }
                if *s == src && *d == dst && p == param)
        })
    }

    /// Number of live edges (audio and param).
    pub fn connection_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns true if the handle refers to a live node.
    pub fn is_live(&self, handle: NodeHandle) -> bool {
        self.nodes
            .get(handle.0 as usize)
            .is_some_and(Option::is_some)
    }

    // --- Internal helpers ---

    fn live(&self, handle: NodeHandle) -> Result<&Primitive, PatchError> {
        self.nodes
            .get(handle.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(PatchError::DeadNode(handle))
    }

    fn live_mut(&mut self, handle: NodeHandle) -> Result<&mut Primitive, PatchError> {
        self.nodes
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(PatchError::DeadNode(handle))
    }

    fn check_port(
        &self,
        handle: NodeHandle,
        index: u32,
        direction: &'static str,
    ) -> Result<(), PatchError> {
        let node = self.live(handle)?;
        let count = if direction == "output" {
            node.outputs
        } else {
            node.inputs
        };
        if index >= count {
            return Err(PatchError::PortOutOfRange {
                handle,
                direction,
                index,
                count,
            });
        }
        Ok(())
    }
}
