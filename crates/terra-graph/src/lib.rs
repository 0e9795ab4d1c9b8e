//! The authoring graph: typed nodes, explicit port tables, and evaluation into
//! generator trees and resolved biomes.
//!
//! Graphs are acyclic by construction: [`Graph::connect`] refuses any link that would
//! close a loop, so recursive evaluation always terminates.

mod error;
mod eval;
mod graph;
mod io;
mod node;

pub use error::GraphError;
pub use eval::{GeneratorNode, Inputs, PreviewNode};
pub use graph::{Graph, Link};
pub use io::{FORMAT_VERSION, GraphStatus};
pub use node::{
    ArithmeticNode, BiomeNode, ConstantNode, EndNode, MaskNode, Node, NodeId, NodeKind, NoiseNode,
    PortId, PortSpec, PortType, ValueNode,
};
