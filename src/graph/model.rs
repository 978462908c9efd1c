//! In-memory topology model.
//!
//! `GraphModel` owns every node and link of a parsed topology and keeps a
//! derived adjacency index in step with its link list.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use crate::error::TopologyError;

/// Kind assigned to nodes that do not declare one
pub const DEFAULT_NODE_KIND: &str = "host";

/// Scalar attribute value carried through from configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    /// Numeric view of the value; plain numeric strings are accepted
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(s) => s.trim().parse::<f64>().ok(),
            AttrValue::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{}", b),
            // Integral numbers print without a trailing ".0"
            AttrValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A host, switch, router or any other entity in the topology
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub kind: String,
    pub label: Option<String>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: DEFAULT_NODE_KIND.to_string(),
            label: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Text drawn next to the node: the explicit label, or the identifier
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Undirected connection between two nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub from: String,
    pub to: String,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Link {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Endpoints ordered lexicographically, so `A--B` and `B--A` compare equal
    pub fn key(&self) -> (&str, &str) {
        if self.from <= self.to {
            (&self.from, &self.to)
        } else {
            (&self.to, &self.from)
        }
    }

    pub fn label(&self) -> Option<String> {
        self.attributes.get("label").map(|v| v.to_string())
    }
}

/// Validated topology snapshot
///
/// Lookups by identifier are O(1); neighbor iteration is O(degree).
/// Nodes keep their input order, links keep their input order and parallel
/// links between the same pair are preserved.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: HashMap<String, Node>,
    order: Vec<String>,
    links: Vec<Link>,
    adjacency: HashMap<String, BTreeSet<String>>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, rejecting a second node with the same identifier
    pub(crate) fn add_node(&mut self, node: Node) -> Result<(), TopologyError> {
        if self.nodes.contains_key(&node.id) {
            return Err(TopologyError::DuplicateNode { id: node.id });
        }
        self.order.push(node.id.clone());
        self.adjacency.insert(node.id.clone(), BTreeSet::new());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Insert a link and update both endpoints' adjacency before returning
    pub(crate) fn add_link(&mut self, link: Link) -> Result<(), TopologyError> {
        let missing = [&link.from, &link.to]
            .into_iter()
            .find(|id| !self.nodes.contains_key(id.as_str()))
            .cloned();
        if let Some(missing) = missing {
            return Err(TopologyError::DanglingLink {
                index: self.links.len(),
                from: link.from,
                to: link.to,
                missing,
            });
        }
        if link.from == link.to {
            return Err(TopologyError::schema(format!(
                "link #{} connects node '{}' to itself",
                self.links.len(),
                link.from
            )));
        }

        if let Some(neighbors) = self.adjacency.get_mut(&link.from) {
            neighbors.insert(link.to.clone());
        }
        if let Some(neighbors) = self.adjacency.get_mut(&link.to) {
            neighbors.insert(link.from.clone());
        }
        self.links.push(link);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in the order they were declared
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(move |id| self.nodes.get(id))
    }

    /// Node identifiers in lexicographic order
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.order.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Distinct neighbors of `id`, ordered by identifier
    pub fn neighbors(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.adjacency.get(id)
    }

    /// Number of distinct neighbors of `id` (0 for unknown nodes)
    pub fn degree(&self, id: &str) -> usize {
        self.adjacency.get(id).map_or(0, BTreeSet::len)
    }

    pub fn attribute(&self, id: &str, key: &str) -> Option<&AttrValue> {
        self.nodes.get(id).and_then(|node| node.attributes.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(nodes: &[&str], links: &[(&str, &str)]) -> GraphModel {
        let mut graph = GraphModel::new();
        for id in nodes {
            graph.add_node(Node::new(*id)).unwrap();
        }
        for (from, to) in links {
            graph.add_link(Link::new(*from, *to)).unwrap();
        }
        graph
    }

    #[test]
    fn test_adjacency_follows_links() {
        let graph = model(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.degree("b"), 2);
        assert!(graph.neighbors("a").unwrap().contains("b"));
        assert!(graph.neighbors("b").unwrap().contains("a"));
        assert!(!graph.neighbors("a").unwrap().contains("c"));

        let neighbors: Vec<&str> =
            graph.neighbors("b").unwrap().iter().map(String::as_str).collect();
        assert_eq!(neighbors, vec!["a", "c"]);
    }

    #[test]
    fn test_parallel_links_preserved() {
        let graph = model(&["a", "b"], &[("a", "b"), ("b", "a")]);

        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.degree("a"), 1);
        assert!(graph.links().iter().all(|link| link.key() == ("a", "b")));
        assert_eq!(graph.links()[0].key(), graph.links()[1].key());
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = model(&["a"], &[]);
        let err = graph.add_node(Node::new("a")).unwrap_err();
        assert!(matches!(err, TopologyError::DuplicateNode { ref id } if id == "a"));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_dangling_link_leaves_adjacency_untouched() {
        let mut graph = model(&["a"], &[]);
        let err = graph.add_link(Link::new("a", "z")).unwrap_err();

        match err {
            TopologyError::DanglingLink { index, missing, .. } => {
                assert_eq!(index, 0);
                assert_eq!(missing, "z");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(graph.link_count(), 0);
        assert_eq!(graph.degree("a"), 0);
    }

    #[test]
    fn test_self_loop_checked_after_endpoints() {
        let mut graph = model(&["a"], &[]);

        let err = graph.add_link(Link::new("z", "z")).unwrap_err();
        assert!(matches!(err, TopologyError::DanglingLink { ref missing, .. } if missing == "z"));

        let err = graph.add_link(Link::new("a", "a")).unwrap_err();
        assert!(matches!(err, TopologyError::Schema(_)));
        assert_eq!(graph.degree("a"), 0);
    }

    #[test]
    fn test_node_order_and_sorted_ids() {
        let graph = model(&["r2", "h1", "s1"], &[]);
        let declared: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(declared, vec!["r2", "h1", "s1"]);
        assert_eq!(graph.sorted_ids(), vec!["h1", "r2", "s1"]);
    }

    #[test]
    fn test_attribute_lookup_and_display() {
        let mut graph = GraphModel::new();
        let mut node = Node::new("h1");
        node.attributes.insert("ports".to_string(), AttrValue::Number(48.0));
        node.attributes.insert("ip".to_string(), AttrValue::Text("10.0.0.1".to_string()));
        graph.add_node(node).unwrap();

        assert_eq!(graph.attribute("h1", "ports").and_then(AttrValue::as_f64), Some(48.0));
        assert_eq!(graph.attribute("h1", "ports").unwrap().to_string(), "48");
        assert_eq!(graph.attribute("h1", "ip").and_then(AttrValue::as_str), Some("10.0.0.1"));
        assert!(graph.attribute("h1", "missing").is_none());
        assert!(graph.attribute("nope", "ip").is_none());
        assert_eq!(graph.node("h1").unwrap().display_label(), "h1");
    }
}
