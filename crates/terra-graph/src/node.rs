//! Node identities, port tables, and the closed set of node kinds.

use std::fmt;

use serde::{Deserialize, Serialize};
use terra_biome::BiomeSettings;
use terra_noise::{ArithmeticOp, FractalParams, NoiseKind};

use crate::eval::{GeneratorNode, PreviewNode};

/// Stable identifier of a node within one graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of an input port in a node's port table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub u8);

impl PortId {
    /// Position of the port in [`NodeKind::inputs`].
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What flows along a link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    /// A generator tree.
    Generator,
    /// A scalar parameter.
    Float,
    /// A resolved biome.
    Biome,
}

/// One entry of a node's input table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortSpec {
    /// Display name.
    pub name: &'static str,
    /// Accepted type.
    pub ty: PortType,
}

const fn port(name: &'static str, ty: PortType) -> PortSpec {
    PortSpec { name, ty }
}

/// Emits a constant value everywhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstantNode {
    /// The emitted value.
    pub value: f64,
}

/// A fractal noise source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseNode {
    /// Basis function.
    pub noise: NoiseKind,
    /// Fractal parameters.
    #[serde(default)]
    pub params: FractalParams,
}

/// Point-wise arithmetic of two generators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticNode {
    /// The operation applied.
    pub op: ArithmeticOp,
}

impl ArithmeticNode {
    /// Left operand.
    pub const LHS: PortId = PortId(0);
    /// Right operand.
    pub const RHS: PortId = PortId(1);
    const INPUTS: &'static [PortSpec] = &[
        port("A", PortType::Generator),
        port("B", PortType::Generator),
    ];
}

/// Blends two generators by a third.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MaskNode {}

impl MaskNode {
    /// Value where the mask is 0.
    pub const A: PortId = PortId(0);
    /// Value where the mask is 1.
    pub const B: PortId = PortId(1);
    /// Blend factor.
    pub const MASK: PortId = PortId(2);
    const INPUTS: &'static [PortSpec] = &[
        port("A", PortType::Generator),
        port("B", PortType::Generator),
        port("Mask", PortType::Generator),
    ];
}

/// A scalar parameter that can feed float ports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueNode {
    /// The emitted value.
    pub value: f64,
}

/// A biome classifier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BiomeNode {
    /// Authored settings. `settings.blend` is used when the blend port is unlinked.
    #[serde(default)]
    pub settings: BiomeSettings,
}

impl BiomeNode {
    /// Height channel source.
    pub const HEIGHT: PortId = PortId(0);
    /// Temperature channel source.
    pub const TEMPERATURE: PortId = PortId(1);
    /// Moisture channel source.
    pub const MOISTURE: PortId = PortId(2);
    /// Optional override for the constraint blend margin.
    pub const BLEND: PortId = PortId(3);
    const INPUTS: &'static [PortSpec] = &[
        port("Height", PortType::Generator),
        port("Temperature", PortType::Generator),
        port("Moisture", PortType::Generator),
        port("Blend", PortType::Float),
    ];
}

/// The graph's sink; its input is the final terrain generator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EndNode {}

impl EndNode {
    /// The final generator.
    pub const GENERATOR: PortId = PortId(0);
    const INPUTS: &'static [PortSpec] = &[port("Generator", PortType::Generator)];
}

/// Every node kind the graph understands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// See [`ConstantNode`].
    Constant(ConstantNode),
    /// See [`NoiseNode`].
    Noise(NoiseNode),
    /// See [`ArithmeticNode`].
    Arithmetic(ArithmeticNode),
    /// See [`MaskNode`].
    Mask(MaskNode),
    /// See [`ValueNode`].
    Value(ValueNode),
    /// See [`BiomeNode`].
    Biome(BiomeNode),
    /// See [`EndNode`].
    End(EndNode),
}

impl NodeKind {
    /// Display name used in logs and editors.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Constant(_) => "Constant",
            Self::Noise(node) => match node.noise {
                NoiseKind::Perlin => "Perlin",
                NoiseKind::Billow => "Billow",
                NoiseKind::Ridged => "Ridged",
                NoiseKind::Simplex => "Simplex",
            },
            Self::Arithmetic(node) => match node.op {
                ArithmeticOp::Add => "Add",
                ArithmeticOp::Subtract => "Subtract",
                ArithmeticOp::Multiply => "Multiply",
            },
            Self::Mask(_) => "Mask",
            Self::Value(_) => "Value",
            Self::Biome(_) => "Biome",
            Self::End(_) => "End",
        }
    }

    /// The input port table, indexed by [`PortId`].
    pub fn inputs(&self) -> &'static [PortSpec] {
        match self {
            Self::Arithmetic(_) => ArithmeticNode::INPUTS,
            Self::Mask(_) => MaskNode::INPUTS,
            Self::Biome(_) => BiomeNode::INPUTS,
            Self::End(_) => EndNode::INPUTS,
            Self::Constant(_) | Self::Noise(_) | Self::Value(_) => &[],
        }
    }

    /// Looks up one input port.
    pub fn input(&self, port: PortId) -> Option<&'static PortSpec> {
        self.inputs().get(port.index())
    }

    /// Type of the node's output, if it has one.
    pub fn output(&self) -> Option<PortType> {
        match self {
            Self::Constant(_) | Self::Noise(_) | Self::Arithmetic(_) | Self::Mask(_) => {
                Some(PortType::Generator)
            }
            Self::Value(_) => Some(PortType::Float),
            Self::Biome(_) => Some(PortType::Biome),
            Self::End(_) => None,
        }
    }

    /// Whether this is the graph's sink.
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End(_))
    }

    /// The generator capability, for kinds that produce a generator.
    pub fn as_generator(&self) -> Option<&dyn GeneratorNode> {
        match self {
            Self::Constant(node) => Some(node),
            Self::Noise(node) => Some(node),
            Self::Arithmetic(node) => Some(node),
            Self::Mask(node) => Some(node),
            Self::Value(_) | Self::Biome(_) | Self::End(_) => None,
        }
    }

    /// The preview capability, for kinds that can render a thumbnail.
    pub fn as_preview(&self) -> Option<&dyn PreviewNode> {
        match self {
            Self::Constant(node) => Some(node),
            Self::Noise(node) => Some(node),
            Self::Arithmetic(node) => Some(node),
            Self::Mask(node) => Some(node),
            Self::Biome(node) => Some(node),
            Self::Value(_) | Self::End(_) => None,
        }
    }
}

/// A node placed in a graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier, unique within the graph.
    pub id: NodeId,
    /// What the node does.
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Editor canvas position.
    #[serde(default)]
    pub position: [f32; 2],
}
