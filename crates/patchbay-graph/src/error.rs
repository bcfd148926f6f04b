//! Error types for graph building and instantiation.

use patchbay_core::PatchError;
use thiserror::Error;

/// Errors from graph definition building or runtime instantiation.
///
/// All variants are fatal configuration errors: the whole graph build or
/// instantiation aborts, and a failed instantiation leaves no live nodes
/// behind.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two node definitions share an id.
    #[error("duplicate node id '{0}'")]
    DuplicateNodeId(String),

    /// An id (connection target, explicit source/destination, or lookup)
    /// does not match any node in the graph.
    #[error("unknown node id '{0}'")]
    UnknownNodeId(String),

    /// The node type tag is not registered.
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    /// The graph has no node definitions.
    #[error("graph has no nodes")]
    EmptyGraph,

    /// After inference and explicit assignment the source set is empty.
    #[error("graph has no source nodes")]
    NoSourceNodes,

    /// After inference and explicit assignment the destination set is empty.
    #[error("graph has no destination nodes")]
    NoDestinationNodes,

    /// The node was already destroyed.
    #[error("node '{0}' was destroyed")]
    NodeDestroyed(String),

    /// The runtime graph was already destroyed.
    #[error("graph was destroyed")]
    GraphDestroyed,

    /// A live patch operation failed underneath the graph layer.
    #[error(transparent)]
    Patch(#[from] PatchError),
}
