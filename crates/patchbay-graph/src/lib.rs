//! Patchbay Graph - declarative effects graph model and runtime
//!
//! This crate turns a serializable graph description into live, wired
//! primitives on a [`PatchContext`](patchbay_core::PatchContext), and back
//! again.
//!
//! # Pipeline
//!
//! 1. Describe nodes and wiring with [`NodeDef`] and [`GraphDefBuilder`].
//!    The builder validates ids, infers graph sources and destinations from
//!    topology, and produces an immutable [`GraphDef`].
//! 2. Hand the [`GraphDef`] plus a live context to
//!    [`RuntimeGraph::instantiate`], which creates one [`EffectNode`] per
//!    definition via the [`NodeRegistry`] and applies all connections.
//! 3. Query [`source_effects`](RuntimeGraph::source_effects) /
//!    [`destination_effects`](RuntimeGraph::destination_effects), adjust
//!    params, or re-extract the definition via
//!    [`to_def`](RuntimeGraph::to_def) for persistence and diffing.
//!
//! # Example
//!
//! ```rust
//! use patchbay_core::PatchContext;
//! use patchbay_graph::{GraphDefBuilder, NodeDef, NodeRegistry, RuntimeGraph};
//!
//! let mut builder = GraphDefBuilder::new();
//! builder.add_effect(NodeDef::gain("in"))?;
//! builder.add_effect(NodeDef::delay("echo"))?;
//! builder.connect("in", "echo")?;
//! let def = builder.build()?;
//!
//! assert_eq!(def.source_node_ids, vec!["in"]);
//! assert_eq!(def.destination_node_ids, vec!["echo"]);
//!
//! let mut ctx = PatchContext::new(48000.0);
//! let registry = NodeRegistry::new();
//! let mut graph = RuntimeGraph::instantiate(&def, &mut ctx, &registry)?;
//! assert_eq!(graph.to_def(), def);
//!
//! graph.destroy(&mut ctx)?;
//! # Ok::<(), patchbay_graph::GraphError>(())
//! ```
//!
//! # Failure Semantics
//!
//! Every structural problem — duplicate id, dangling connection target,
//! unknown node type, empty source or destination set — is a fatal,
//! synchronous [`GraphError`] at build or instantiation time. A failed
//! instantiation tears down everything it created; there is no partial
//! graph state.

pub mod builder;
pub mod def;
pub mod error;
pub mod node;
pub mod registry;
pub mod runtime;

pub use builder::GraphDefBuilder;
pub use def::{ConnectionDef, GraphDef, NodeAttrs, NodeDef};
pub use error::GraphError;
pub use node::EffectNode;
pub use registry::{NodeFactory, NodeKindDescriptor, NodeRegistry};
pub use runtime::{EffectFilter, RuntimeGraph};

// Re-exported so graph callers don't need a direct patchbay-core dependency
// for the common types.
pub use patchbay_core::{AutomationPoint, NodeOptions, NodeParam, ParamValue};
