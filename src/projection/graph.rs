use crate::shared::NodeId;
use crate::styling::{EdgeStyle, ModuleColor};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub color: ModuleColor,
}

/// Directed `dependency -> dependent` edge. At most one edge exists per
/// `(from, to)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub style: EdgeStyle,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            style: EdgeStyle::Neutral,
        }
    }

    fn connects(&self, from: &NodeId, to: &NodeId) -> bool {
        &self.from == from && &self.to == to
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub nodes_added: usize,
    pub nodes_updated: usize,
    pub nodes_removed: usize,
    pub edges_added: usize,
    pub edges_removed: usize,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Node and edge store mirrored by the rendering layer.
#[derive(Debug, Clone, Default)]
pub struct VisualGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl VisualGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn edge(&self, from: &NodeId, to: &NodeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.connects(from, to))
    }

    pub fn has_edge(&self, from: &NodeId, to: &NodeId) -> bool {
        self.edge(from, to).is_some()
    }

    pub fn incoming<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.to == id)
    }

    pub fn outgoing<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.from == id)
    }

    /// Returns `false` when a node with the same id already exists.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.node(&node.id).is_some() {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Returns `true` only when the stored node actually changed.
    pub fn update_node(&mut self, node: Node) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) if *existing != node => {
                *existing = node;
                true
            }
            _ => false,
        }
    }

    pub fn set_label(&mut self, id: &NodeId, label: &str) -> bool {
        match self.nodes.iter_mut().find(|n| &n.id == id) {
            Some(node) if node.label != label => {
                node.label = label.to_string();
                true
            }
            _ => false,
        }
    }

    /// Removes the node and every edge touching it. Returns the number of
    /// edges dropped, or `None` when the node was absent.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<usize> {
        let index = self.nodes.iter().position(|n| &n.id == id)?;
        self.nodes.remove(index);
        let before = self.edges.len();
        self.edges.retain(|e| &e.from != id && &e.to != id);
        Some(before - self.edges.len())
    }

    /// Rejects parallel edges and edges whose endpoints are not nodes.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if self.has_edge(&edge.from, &edge.to)
            || self.node(&edge.from).is_none()
            || self.node(&edge.to).is_none()
        {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn remove_edge(&mut self, from: &NodeId, to: &NodeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| !e.connects(from, to));
        self.edges.len() != before
    }

    pub fn set_edge_style(&mut self, from: &NodeId, to: &NodeId, style: EdgeStyle) -> bool {
        match self.edges.iter_mut().find(|e| e.connects(from, to)) {
            Some(edge) if edge.style != style => {
                edge.style = style;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Replaces the contents with `nodes`/`edges`, keeping the style of edges
    /// that survive, and reports what changed.
    pub fn sync(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> SyncReport {
        let mut report = SyncReport::default();
        for node in &nodes {
            match self.node(&node.id) {
                None => report.nodes_added += 1,
                Some(existing) if existing != node => report.nodes_updated += 1,
                Some(_) => {}
            }
        }
        report.nodes_removed = self
            .nodes
            .iter()
            .filter(|existing| !nodes.iter().any(|n| n.id == existing.id))
            .count();

        let edges: Vec<Edge> = edges
            .into_iter()
            .map(|mut edge| {
                match self.edge(&edge.from, &edge.to) {
                    Some(existing) => edge.style = existing.style,
                    None => report.edges_added += 1,
                }
                edge
            })
            .collect();
        report.edges_removed = self
            .edges
            .iter()
            .filter(|existing| !edges.iter().any(|e| e.connects(&existing.from, &existing.to)))
            .count();

        self.nodes = nodes;
        self.edges = edges;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styling::MODULE_PALETTE;

    fn id(raw: &str) -> NodeId {
        NodeId::parse(raw).expect("node id")
    }

    fn node(raw: &str) -> Node {
        Node {
            id: id(raw),
            label: raw.to_string(),
            color: MODULE_PALETTE[0],
        }
    }

    #[test]
    fn edges_require_both_endpoints_and_no_parallel_pair() {
        let mut graph = VisualGraph::new();
        graph.add_node(node("net:scan"));
        assert!(!graph.add_edge(Edge::new(id("net:scan"), id("net:report"))));

        graph.add_node(node("net:report"));
        assert!(graph.add_edge(Edge::new(id("net:scan"), id("net:report"))));
        assert!(!graph.add_edge(Edge::new(id("net:scan"), id("net:report"))));
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn removing_a_node_drops_its_edges() {
        let mut graph = VisualGraph::new();
        graph.add_node(node("net:scan"));
        graph.add_node(node("net:report"));
        graph.add_edge(Edge::new(id("net:scan"), id("net:report")));

        assert_eq!(graph.remove_node(&id("net:scan")), Some(1));
        assert!(graph.edges().is_empty());
        assert_eq!(graph.remove_node(&id("net:scan")), None);
    }

    #[test]
    fn sync_keeps_styles_of_surviving_edges() {
        let mut graph = VisualGraph::new();
        graph.sync(
            vec![node("net:scan"), node("net:report")],
            vec![Edge::new(id("net:scan"), id("net:report"))],
        );
        graph.set_edge_style(&id("net:scan"), &id("net:report"), EdgeStyle::Done);

        let report = graph.sync(
            vec![node("net:scan"), node("net:report")],
            vec![Edge::new(id("net:scan"), id("net:report"))],
        );
        assert!(report.is_noop());
        assert_eq!(
            graph.edge(&id("net:scan"), &id("net:report")).map(|e| e.style),
            Some(EdgeStyle::Done)
        );
    }
}
