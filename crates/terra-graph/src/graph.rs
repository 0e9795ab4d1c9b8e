//! Graph storage: nodes keyed by id and a link table keyed by input port.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{GraphError, Node, NodeId, NodeKind, PortId};

/// A directed edge from one node's output into another node's input port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Producing node.
    pub from: NodeId,
    /// Consuming node.
    pub to: NodeId,
    /// Input port on `to`.
    pub port: PortId,
}

/// A node graph.
///
/// Each input port holds at most one link; connecting to an occupied port replaces the
/// previous link. The graph holds at most one end node.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    name: String,
    nodes: BTreeMap<NodeId, Node>,
    links: BTreeMap<(NodeId, PortId), NodeId>,
    next_id: u32,
}

impl Graph {
    /// An empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Graph name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the graph.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Mutable access to a node, e.g. to edit its settings.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All links, ordered by consuming node then port.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.links.iter().map(|(&(to, port), &from)| Link { from, to, port })
    }

    /// The node linked into `port` of `node`, if any.
    pub fn source(&self, node: NodeId, port: PortId) -> Option<NodeId> {
        self.links.get(&(node, port)).copied()
    }

    /// Adds a node with a fresh id.
    pub fn add_node(&mut self, kind: NodeKind) -> Result<NodeId, GraphError> {
        self.add_node_at(kind, [0.0, 0.0])
    }

    /// Adds a node with a fresh id at an editor position.
    pub fn add_node_at(&mut self, kind: NodeKind, position: [f32; 2]) -> Result<NodeId, GraphError> {
        let id = NodeId(self.next_id);
        self.insert(Node { id, kind, position })?;
        Ok(id)
    }

    /// Inserts a node with a caller-chosen id.
    pub(crate) fn insert(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        if node.kind.is_end() {
            if let Some(existing) = self.end_node() {
                return Err(GraphError::DuplicateEndNode(existing));
            }
        }
        tracing::debug!(id = %node.id, kind = node.kind.title(), "added node");
        self.next_id = self.next_id.max(node.id.0.saturating_add(1));
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Removes a node and every link touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.links.retain(|&(to, _), from| to != id && *from != id);
        tracing::debug!(%id, kind = node.kind.title(), "removed node");
        Some(node)
    }

    /// Links the output of `from` into input `port` of `to`.
    ///
    /// Replaces any link already on that port. Returns the replaced source, if any.
    /// Rejects unknown nodes and ports, type mismatches, and links that would make the
    /// graph cyclic; a rejected link leaves the graph unchanged.
    pub fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        port: PortId,
    ) -> Result<Option<NodeId>, GraphError> {
        if let Err(error) = self.check_link(from, to, port) {
            tracing::warn!(%from, %to, %port, %error, "rejected link");
            return Err(error);
        }

        let replaced = self.links.insert((to, port), from);
        match replaced {
            Some(old) if old != from => {
                tracing::debug!(%from, %to, %port, replaced = %old, "replaced link");
            }
            _ => tracing::debug!(%from, %to, %port, "linked"),
        }
        Ok(replaced)
    }

    fn check_link(&self, from: NodeId, to: NodeId, port: PortId) -> Result<(), GraphError> {
        let source = self.node(from).ok_or(GraphError::UnknownNode(from))?;
        let target = self.node(to).ok_or(GraphError::UnknownNode(to))?;
        let input = target
            .kind
            .input(port)
            .ok_or(GraphError::UnknownPort { node: to, port })?;

        let found = source.kind.output();
        if found != Some(input.ty) {
            return Err(GraphError::TypeMismatch {
                expected: input.ty,
                found,
            });
        }
        if from == to {
            return Err(GraphError::SelfLink(from));
        }
        if self.depends_on(from, to) {
            return Err(GraphError::Cycle { from, to });
        }
        Ok(())
    }

    /// Removes the link into `port` of `to`, returning its source.
    pub fn disconnect(&mut self, to: NodeId, port: PortId) -> Option<NodeId> {
        self.links.remove(&(to, port))
    }

    /// True if `node` reads, directly or transitively, from `target`.
    pub fn depends_on(&self, node: NodeId, target: NodeId) -> bool {
        let mut stack = vec![node];
        let mut seen = FxHashSet::default();
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            stack.extend(
                self.links
                    .range((current, PortId(0))..=(current, PortId(u8::MAX)))
                    .map(|(_, &from)| from),
            );
        }
        false
    }

    /// Re-checks every node and link, e.g. after a node's kind was edited in place.
    pub fn validate(&self) -> Result<(), GraphError> {
        let nodes = self.nodes.values().cloned();
        Self::from_parts(self.name.clone(), nodes, self.links()).map(|_| ())
    }

    /// Rebuilds a graph from raw parts, re-checking every node and link.
    pub fn from_parts(
        name: impl Into<String>,
        nodes: impl IntoIterator<Item = Node>,
        links: impl IntoIterator<Item = Link>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new(name);
        for node in nodes {
            graph.insert(node)?;
        }
        for link in links {
            graph.connect(link.from, link.to, link.port)?;
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use terra_noise::ArithmeticOp;

    use super::*;
    use crate::{ArithmeticNode, ConstantNode, EndNode, PortType, ValueNode};

    fn add(graph: &mut Graph) -> NodeId {
        graph
            .add_node(NodeKind::Arithmetic(ArithmeticNode {
                op: ArithmeticOp::Add,
            }))
            .unwrap()
    }

    fn constant(graph: &mut Graph) -> NodeId {
        graph
            .add_node(NodeKind::Constant(ConstantNode { value: 1.0 }))
            .unwrap()
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn warnings_during(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.text()
    }

    #[test]
    fn test_ids_are_fresh_and_ordered() {
        let mut graph = Graph::new("ids");
        let a = constant(&mut graph);
        let b = constant(&mut graph);
        graph.remove_node(a);
        let c = constant(&mut graph);
        assert!(a < b && b < c);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_connecting_occupied_port_replaces_link() {
        let mut graph = Graph::new("override");
        let a = constant(&mut graph);
        let b = constant(&mut graph);
        let sum = add(&mut graph);

        assert_eq!(graph.connect(a, sum, ArithmeticNode::LHS).unwrap(), None);
        assert_eq!(
            graph.connect(b, sum, ArithmeticNode::LHS).unwrap(),
            Some(a)
        );
        assert_eq!(graph.source(sum, ArithmeticNode::LHS), Some(b));
        assert_eq!(graph.links().count(), 1);
    }

    #[test]
    fn test_rejects_unknown_nodes_and_ports() {
        let mut graph = Graph::new("bad");
        let a = constant(&mut graph);
        let sum = add(&mut graph);
        assert!(matches!(
            graph.connect(NodeId(99), sum, ArithmeticNode::LHS),
            Err(GraphError::UnknownNode(NodeId(99)))
        ));
        assert!(matches!(
            graph.connect(a, sum, PortId(2)),
            Err(GraphError::UnknownPort { .. })
        ));
        assert!(matches!(
            graph.connect(sum, a, PortId(0)),
            Err(GraphError::UnknownPort { .. })
        ));
    }

    #[test]
    fn test_rejects_type_mismatch() {
        let mut graph = Graph::new("types");
        let value = graph
            .add_node(NodeKind::Value(ValueNode { value: 0.5 }))
            .unwrap();
        let sum = add(&mut graph);
        let err = graph.connect(value, sum, ArithmeticNode::LHS).unwrap_err();
        assert!(matches!(
            err,
            GraphError::TypeMismatch {
                expected: PortType::Generator,
                found: Some(PortType::Float),
            }
        ));

        let end = graph.add_node(NodeKind::End(EndNode::default())).unwrap();
        let other = add(&mut graph);
        assert!(matches!(
            graph.connect(end, other, ArithmeticNode::LHS),
            Err(GraphError::TypeMismatch { found: None, .. })
        ));
    }

    #[test]
    fn test_rejects_cycles_and_self_links() {
        let mut graph = Graph::new("cycles");
        let first = add(&mut graph);
        let second = add(&mut graph);
        let third = add(&mut graph);
        graph.connect(first, second, ArithmeticNode::LHS).unwrap();
        graph.connect(second, third, ArithmeticNode::LHS).unwrap();

        assert!(matches!(
            graph.connect(third, first, ArithmeticNode::RHS),
            Err(GraphError::Cycle { .. })
        ));
        assert!(matches!(
            graph.connect(first, first, ArithmeticNode::RHS),
            Err(GraphError::SelfLink(_))
        ));
        assert!(graph.source(first, ArithmeticNode::RHS).is_none());
        assert!(graph.depends_on(third, first));
        assert!(!graph.depends_on(first, third));
    }

    #[test]
    fn test_only_one_end_node() {
        let mut graph = Graph::new("end");
        let end = graph.add_node(NodeKind::End(EndNode::default())).unwrap();
        assert!(matches!(
            graph.add_node(NodeKind::End(EndNode::default())),
            Err(GraphError::DuplicateEndNode(existing)) if existing == end
        ));
    }

    #[test]
    fn test_removing_node_drops_its_links() {
        let mut graph = Graph::new("remove");
        let a = constant(&mut graph);
        let sum = add(&mut graph);
        let outer = add(&mut graph);
        graph.connect(a, sum, ArithmeticNode::LHS).unwrap();
        graph.connect(sum, outer, ArithmeticNode::RHS).unwrap();

        graph.remove_node(sum);
        assert_eq!(graph.links().count(), 0);
        assert!(graph.remove_node(sum).is_none());
    }

    #[test]
    fn test_validate_catches_in_place_edits() {
        let mut graph = Graph::new("edit");
        let a = constant(&mut graph);
        let sum = add(&mut graph);
        graph.connect(a, sum, ArithmeticNode::LHS).unwrap();
        assert!(graph.validate().is_ok());

        graph.node_mut(a).unwrap().kind = NodeKind::Value(ValueNode { value: 1.0 });
        assert!(matches!(
            graph.validate(),
            Err(GraphError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_from_parts_revalidates_links() {
        let nodes = vec![
            Node {
                id: NodeId(4),
                kind: NodeKind::Constant(ConstantNode { value: 2.0 }),
                position: [0.0, 0.0],
            },
            Node {
                id: NodeId(7),
                kind: NodeKind::End(EndNode::default()),
                position: [100.0, 0.0],
            },
        ];
        let links = [Link {
            from: NodeId(4),
            to: NodeId(7),
            port: EndNode::GENERATOR,
        }];
        let mut graph = Graph::from_parts("parts", nodes.clone(), links).unwrap();
        assert!(graph.has_valid_end_node());
        let next = graph
            .add_node(NodeKind::Constant(ConstantNode { value: 0.0 }))
            .unwrap();
        assert_eq!(next, NodeId(8));

        let bad = [Link {
            from: NodeId(7),
            to: NodeId(4),
            port: PortId(0),
        }];
        assert!(Graph::from_parts("bad", nodes, bad).is_err());
    }

    #[test]
    fn test_rejected_links_are_logged_at_warn() {
        let mut graph = Graph::new("warn");
        let a = add(&mut graph);
        let c = constant(&mut graph);

        let logs = warnings_during(|| {
            assert!(graph.connect(a, a, ArithmeticNode::LHS).is_err());
            assert!(graph.connect(c, NodeId(99), ArithmeticNode::LHS).is_err());
        });
        assert_eq!(logs.matches("rejected link").count(), 2);
        assert!(logs.contains("cannot connect to itself"));
        assert!(logs.contains("unknown node #99"));

        let logs = warnings_during(|| {
            graph.connect(c, a, ArithmeticNode::LHS).unwrap();
        });
        assert!(logs.is_empty());
    }
}
