//! JSON persistence and the load status shown to editors.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use terra_biome::{BiomeChannel, BiomeSettings};
use terra_noise::{FractalParams, NoiseKind};

use crate::{BiomeNode, EndNode, Graph, GraphError, Link, Node, NodeId, NodeKind, NoiseNode};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct GraphFile {
    version: u32,
    name: String,
    nodes: Vec<Node>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Deserialize)]
struct GraphHeader {
    version: u32,
}

impl Graph {
    /// Parses a graph from JSON, re-validating every node and link.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let file: GraphFile = serde_json::from_str(json).map_err(GraphError::Parse)?;
        if file.version != FORMAT_VERSION {
            return Err(GraphError::UnsupportedVersion(file.version));
        }
        Graph::from_parts(file.name, file.nodes, file.links)
    }

    /// Serializes the graph as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        let file = GraphFile {
            version: FORMAT_VERSION,
            name: self.name().to_string(),
            nodes: self.nodes().cloned().collect(),
            links: self.links().collect(),
        };
        serde_json::to_string_pretty(&file).map_err(GraphError::Serialize)
    }

    /// Loads a graph file.
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let contents = fs::read_to_string(path).map_err(|source| GraphError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let graph = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            name = graph.name(),
            nodes = graph.len(),
            "loaded graph"
        );
        Ok(graph)
    }

    /// Writes the graph to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), GraphError> {
        let json = self.to_json()?;
        let write_err = |source| GraphError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, json).map_err(write_err)?;
        tracing::info!(path = %path.display(), name = self.name(), "saved graph");
        Ok(())
    }

    /// True if `path` holds a graph file this version can read.
    ///
    /// Only the version header is checked; the graph itself may still fail validation.
    pub fn can_read(path: &Path) -> bool {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str::<GraphHeader>(&json).ok())
            .is_some_and(|header| header.version == FORMAT_VERSION)
    }

    /// A starter graph: Perlin noise feeding the end node, plus a lowland biome reading
    /// that noise as height.
    pub fn default_template(name: &str) -> Self {
        let nodes = [
            Node {
                id: NodeId(0),
                kind: NodeKind::Noise(NoiseNode {
                    noise: NoiseKind::Perlin,
                    params: FractalParams::default(),
                }),
                position: [0.0, 0.0],
            },
            Node {
                id: NodeId(1),
                kind: NodeKind::End(EndNode::default()),
                position: [300.0, 0.0],
            },
            Node {
                id: NodeId(2),
                kind: NodeKind::Biome(BiomeNode {
                    settings: BiomeSettings {
                        name: "lowland".to_string(),
                        color: [86, 152, 64],
                        blend: 0.1,
                        height: BiomeChannel::enabled(0.0, 0.6),
                        ..Default::default()
                    },
                }),
                position: [300.0, 150.0],
            },
        ];
        let links = [
            Link {
                from: NodeId(0),
                to: NodeId(1),
                port: EndNode::GENERATOR,
            },
            Link {
                from: NodeId(0),
                to: NodeId(2),
                port: BiomeNode::HEIGHT,
            },
        ];
        // Distinct ids, one end node, well-typed acyclic links: cannot fail.
        Graph::from_parts(name, nodes, links).unwrap_or_else(|_| Graph::new(name))
    }

    /// Writes a fresh template graph to `path` and returns it.
    pub fn create_new(path: &Path, name: &str) -> Result<Self, GraphError> {
        let graph = Self::default_template(name);
        graph.save(path)?;
        Ok(graph)
    }
}

/// Outcome of resolving the selected graph file.
#[derive(Debug)]
pub enum GraphStatus {
    /// No graph file is selected.
    NoSelection,
    /// The selected file could not be loaded.
    LoadFailed {
        /// File that failed.
        path: PathBuf,
        /// Why it failed.
        error: GraphError,
    },
    /// The graph loaded but its end node is missing or has no generator.
    NoEndNode(Graph),
    /// The graph loaded and yields a terrain generator.
    Ready(Graph),
}

impl GraphStatus {
    /// Loads the selected graph and classifies the result.
    pub fn resolve(selected: Option<&Path>) -> Self {
        let Some(path) = selected.filter(|p| !p.as_os_str().is_empty()) else {
            return Self::NoSelection;
        };
        match Graph::load(path) {
            Ok(graph) if graph.has_valid_end_node() => Self::Ready(graph),
            Ok(graph) => {
                tracing::warn!(path = %path.display(), "graph has no usable end node");
                Self::NoEndNode(graph)
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to load graph");
                Self::LoadFailed {
                    path: path.to_path_buf(),
                    error,
                }
            }
        }
    }

    /// True if the graph is ready to generate terrain.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The loaded graph, whether or not it is usable.
    pub fn graph(&self) -> Option<&Graph> {
        match self {
            Self::Ready(graph) | Self::NoEndNode(graph) => Some(graph),
            Self::NoSelection | Self::LoadFailed { .. } => None,
        }
    }

    /// Takes ownership of the loaded graph.
    pub fn into_graph(self) -> Option<Graph> {
        match self {
            Self::Ready(graph) | Self::NoEndNode(graph) => Some(graph),
            Self::NoSelection | Self::LoadFailed { .. } => None,
        }
    }

    /// Guidance text for an editor status line.
    pub fn message(&self) -> String {
        match self {
            Self::NoSelection => "No graph selected. Open or create a graph file.".to_string(),
            Self::LoadFailed { path, error } => {
                format!("Could not load {}: {error}", path.display())
            }
            Self::NoEndNode(_) => {
                "The graph needs an End node with a connected generator.".to_string()
            }
            Self::Ready(graph) => format!("Graph '{}' is ready.", graph.name()),
        }
    }
}
