//! Node capabilities and recursive evaluation over the link table.

use std::sync::Arc;

use terra_biome::{Biome, BiomeSamplers, PreviewImage, WeightMap};
use terra_noise::{
    Constant, FractalNoise, GeneratorRef, GeneratorSampler, GridPosition, blend, combine,
};

use crate::{
    ArithmeticNode, BiomeNode, ConstantNode, EndNode, Graph, MaskNode, NodeId, NodeKind, NoiseNode,
    PortId,
};

/// Resolves the inputs of one node against its graph.
#[derive(Clone, Copy)]
pub struct Inputs<'g> {
    graph: &'g Graph,
    node: NodeId,
}

impl<'g> Inputs<'g> {
    pub(crate) fn new(graph: &'g Graph, node: NodeId) -> Self {
        Self { graph, node }
    }

    /// The node whose inputs are being resolved.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The generator linked into `port`, or `None` when the port is unlinked or its
    /// source cannot produce one.
    pub fn generator(&self, port: PortId) -> Option<GeneratorRef> {
        let source = self.graph.source(self.node, port)?;
        self.graph.generator(source)
    }

    /// The scalar linked into `port`, or `default` when the port is unlinked.
    pub fn float(&self, port: PortId, default: f64) -> f64 {
        self.graph
            .source(self.node, port)
            .and_then(|source| self.graph.float(source))
            .unwrap_or(default)
    }
}

/// A node that contributes a generator to the tree.
pub trait GeneratorNode {
    /// Builds this node's generator, or `None` if a required input is unset.
    fn generator(&self, inputs: &Inputs<'_>) -> Option<GeneratorRef>;
}

/// A node that can render an editor thumbnail.
pub trait PreviewNode {
    /// Renders a `size × size` preview, or `None` if the node cannot be evaluated yet.
    fn preview(&self, inputs: &Inputs<'_>, size: u32) -> Option<PreviewImage>;
}

impl GeneratorNode for ConstantNode {
    fn generator(&self, _inputs: &Inputs<'_>) -> Option<GeneratorRef> {
        Some(Constant::shared(self.value))
    }
}

impl GeneratorNode for NoiseNode {
    fn generator(&self, _inputs: &Inputs<'_>) -> Option<GeneratorRef> {
        Some(Arc::new(FractalNoise::new(self.noise, &self.params)))
    }
}

impl GeneratorNode for ArithmeticNode {
    fn generator(&self, inputs: &Inputs<'_>) -> Option<GeneratorRef> {
        combine(
            self.op,
            inputs.generator(Self::LHS),
            inputs.generator(Self::RHS),
        )
    }
}

impl GeneratorNode for MaskNode {
    fn generator(&self, inputs: &Inputs<'_>) -> Option<GeneratorRef> {
        blend(
            inputs.generator(Self::A),
            inputs.generator(Self::B),
            inputs.generator(Self::MASK),
        )
    }
}

impl EndNode {
    /// The generator feeding the sink.
    pub fn final_generator(&self, inputs: &Inputs<'_>) -> Option<GeneratorRef> {
        inputs.generator(Self::GENERATOR)
    }
}

impl BiomeNode {
    /// Resolves the biome, binding fresh samplers to whatever is linked right now.
    pub fn resolve(&self, inputs: &Inputs<'_>) -> Biome {
        let mut settings = self.settings.clone();
        settings.blend = inputs.float(Self::BLEND, settings.blend);
        let samplers = BiomeSamplers::bind(
            &settings,
            inputs.generator(Self::HEIGHT),
            inputs.generator(Self::TEMPERATURE),
            inputs.generator(Self::MOISTURE),
        );
        Biome::new(settings, samplers)
    }
}

/// Grayscale preview of a generator over the unit square at the origin, normalized to
/// its own range. A flat field renders black.
fn generator_preview(generator: GeneratorRef, size: u32) -> PreviewImage {
    let sampler = GeneratorSampler::new(generator);
    let mut values = Vec::with_capacity((size as usize) * (size as usize));
    for y in 0..size {
        for x in 0..size {
            values.push(sampler.value(x, y, GridPosition::ZERO, size, 1.0, 1.0));
        }
    }

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    let mut weights = WeightMap::zeros(size);
    if range > 0.0 && range.is_finite() {
        for (i, v) in values.iter().enumerate() {
            let (x, y) = ((i as u32) % size, (i as u32) / size);
            weights.set(x, y, (v - min) / range);
        }
    }
    PreviewImage::from_weights(&weights)
}

macro_rules! generator_previews {
    ($($node:ty),*) => {
        $(
            impl PreviewNode for $node {
                fn preview(&self, inputs: &Inputs<'_>, size: u32) -> Option<PreviewImage> {
                    self.generator(inputs).map(|g| generator_preview(g, size))
                }
            }
        )*
    };
}

generator_previews!(ConstantNode, NoiseNode, ArithmeticNode, MaskNode);

impl PreviewNode for BiomeNode {
    fn preview(&self, inputs: &Inputs<'_>, size: u32) -> Option<PreviewImage> {
        let biome = self.resolve(inputs);
        Some(PreviewImage::from_weights(&biome.preview_weights(size)))
    }
}

impl Graph {
    /// The generator produced by node `id`, or `None` if the node is unknown, produces no
    /// generator, or has an unset input anywhere upstream.
    pub fn generator(&self, id: NodeId) -> Option<GeneratorRef> {
        let node = self.node(id)?;
        node.kind.as_generator()?.generator(&Inputs::new(self, id))
    }

    /// The scalar produced by node `id`, if it is a value node.
    pub fn float(&self, id: NodeId) -> Option<f64> {
        match &self.node(id)?.kind {
            NodeKind::Value(node) => Some(node.value),
            _ => None,
        }
    }

    /// The biome resolved at node `id`, if it is a biome node.
    pub fn biome(&self, id: NodeId) -> Option<Biome> {
        match &self.node(id)?.kind {
            NodeKind::Biome(node) => Some(node.resolve(&Inputs::new(self, id))),
            _ => None,
        }
    }

    /// Every biome in the graph, in node id order, with samplers bound fresh.
    pub fn biomes(&self) -> Vec<Biome> {
        self.nodes()
            .filter_map(|node| match &node.kind {
                NodeKind::Biome(biome) => Some(biome.resolve(&Inputs::new(self, node.id))),
                _ => None,
            })
            .collect()
    }

    /// The graph's end node, if present.
    pub fn end_node(&self) -> Option<NodeId> {
        self.nodes().find(|node| node.kind.is_end()).map(|node| node.id)
    }

    /// The final terrain generator: whatever feeds the end node.
    pub fn graph_generator(&self) -> Option<GeneratorRef> {
        let id = self.end_node()?;
        match &self.node(id)?.kind {
            NodeKind::End(end) => end.final_generator(&Inputs::new(self, id)),
            _ => None,
        }
    }

    /// True iff an end node exists and yields a generator.
    pub fn has_valid_end_node(&self) -> bool {
        self.graph_generator().is_some()
    }

    /// Renders the preview of node `id`.
    pub fn preview(&self, id: NodeId, size: u32) -> Option<PreviewImage> {
        let node = self.node(id)?;
        node.kind.as_preview()?.preview(&Inputs::new(self, id), size)
    }
}
