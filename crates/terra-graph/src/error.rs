//! Graph error types.

use std::path::PathBuf;

use crate::{NodeId, PortId, PortType};

/// Errors raised while editing, loading, or saving a graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Failed to read a graph file.
    #[error("failed to read graph {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a graph file.
    #[error("failed to write graph {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid graph JSON.
    #[error("failed to parse graph: {0}")]
    Parse(#[source] serde_json::Error),

    /// The graph could not be serialized.
    #[error("failed to serialize graph: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The file was written by an incompatible format version.
    #[error("unsupported graph format version {0}")]
    UnsupportedVersion(u32),

    /// No node with this id exists.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Two nodes share one id.
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    /// The node has no input port with this index.
    #[error("node {node} has no input port {port}")]
    UnknownPort {
        /// Target node.
        node: NodeId,
        /// Requested port.
        port: PortId,
    },

    /// The source's output type does not match the input port.
    #[error("port expects {expected:?} but the source produces {found:?}")]
    TypeMismatch {
        /// Type declared by the input port.
        expected: PortType,
        /// Output type of the source node, if it has an output.
        found: Option<PortType>,
    },

    /// A node cannot feed itself.
    #[error("node {0} cannot connect to itself")]
    SelfLink(NodeId),

    /// The link would make the graph cyclic.
    #[error("linking {from} into {to} would create a cycle")]
    Cycle {
        /// Upstream node of the rejected link.
        from: NodeId,
        /// Downstream node of the rejected link.
        to: NodeId,
    },

    /// A graph holds at most one end node.
    #[error("graph already has an end node ({0})")]
    DuplicateEndNode(NodeId),
}
