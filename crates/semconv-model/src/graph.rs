//! The in-memory graph model: six node tables and three edge tables, the
//! latter partitioned by source node type.
//!
//! The model is an explicit value. Builders and resolvers take it by
//! `&mut`, so two builds never share state.

use crate::error::{ModelError, Result};
use crate::types::{Edge, EdgeType, Node, NodeType};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Node collections
// ============================================================================

/// Insertion-ordered, id-keyed node table.
#[derive(Debug, Clone)]
pub struct NodeCollection {
    node_type: NodeType,
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl NodeCollection {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Store `node` unless its id is already taken.
    ///
    /// Never merges and never overwrites: on collision the existing node
    /// stays and the error carries both payloads.
    pub fn insert(&mut self, node: Node) -> Result<()> {
        if let Some(&at) = self.index.get(&node.id) {
            return Err(ModelError::DuplicateNode {
                node_type: self.node_type,
                id: node.id.clone(),
                existing: Box::new(self.nodes[at].clone()),
                incoming: Box::new(node),
            });
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&at| &self.nodes[at])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.index.get(id) {
            Some(&at) => self.nodes.get_mut(at),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }
}

// ============================================================================
// Graph model
// ============================================================================

/// An edge whose `to` endpoint has no node in its target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingEdge {
    pub edge_type: EdgeType,
    pub source_type: NodeType,
    pub from: String,
    pub to: String,
}

/// Node and edge counts of a model.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphSummary {
    pub nodes: BTreeMap<NodeType, usize>,
    pub edge_batches: Vec<EdgeBatchSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeBatchSummary {
    pub edge_type: EdgeType,
    pub source_type: NodeType,
    pub edges: usize,
}

/// All node and edge collections of one run.
#[derive(Debug, Clone)]
pub struct GraphModel {
    nodes: BTreeMap<NodeType, NodeCollection>,
    edges: BTreeMap<EdgeType, BTreeMap<NodeType, Vec<Edge>>>,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphModel {
    /// A model with every node table and edge table present and empty.
    pub fn new() -> Self {
        let nodes = NodeType::ALL
            .iter()
            .map(|&t| (t, NodeCollection::new(t)))
            .collect();
        let edges = EdgeType::ALL
            .iter()
            .map(|&t| (t, BTreeMap::new()))
            .collect();
        Self { nodes, edges }
    }

    fn collection_mut(&mut self, node_type: NodeType) -> &mut NodeCollection {
        self.nodes
            .entry(node_type)
            .or_insert_with(|| NodeCollection::new(node_type))
    }

    pub fn insert_node(&mut self, node_type: NodeType, node: Node) -> Result<()> {
        self.collection_mut(node_type).insert(node)
    }

    /// Attribute registry insert. Attribute ids are unique across the
    /// whole graph.
    pub fn register_attribute(&mut self, node: Node) -> Result<()> {
        self.insert_node(NodeType::Attribute, node)
    }

    pub fn node_mut(&mut self, node_type: NodeType, id: &str) -> Option<&mut Node> {
        self.collection_mut(node_type).get_mut(id)
    }

    pub fn push_edge(&mut self, edge_type: EdgeType, source_type: NodeType, edge: Edge) {
        self.edges
            .entry(edge_type)
            .or_default()
            .entry(source_type)
            .or_default()
            .push(edge);
    }

    pub fn nodes(&self, node_type: NodeType) -> Option<&NodeCollection> {
        self.nodes.get(&node_type)
    }

    pub fn node(&self, node_type: NodeType, id: &str) -> Option<&Node> {
        self.nodes.get(&node_type).and_then(|c| c.get(id))
    }

    /// Node tables in persistence order.
    pub fn node_collections(&self) -> impl Iterator<Item = &NodeCollection> {
        self.nodes.values()
    }

    pub fn edges(&self, edge_type: EdgeType, source_type: NodeType) -> &[Edge] {
        self.edges
            .get(&edge_type)
            .and_then(|by_source| by_source.get(&source_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every nonempty `(edge type, source type)` batch, in a stable order.
    pub fn edge_batches(&self) -> impl Iterator<Item = (EdgeType, NodeType, &[Edge])> {
        self.edges.iter().flat_map(|(&edge_type, by_source)| {
            by_source
                .iter()
                .filter(|(_, edges)| !edges.is_empty())
                .map(move |(&source_type, edges)| (edge_type, source_type, edges.as_slice()))
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.values().map(NodeCollection::len).sum()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_batches().map(|(_, _, edges)| edges.len()).sum()
    }

    /// Edges pointing at ids missing from their target table.
    ///
    /// Event and entity endpoints are produced by a naming heuristic and are
    /// never checked at build time; this is where they get checked.
    pub fn dangling_edges(&self) -> Vec<DanglingEdge> {
        let mut dangling = Vec::new();
        for (edge_type, source_type, edges) in self.edge_batches() {
            let target = edge_type.target_node_type();
            for edge in edges {
                if self.node(target, &edge.to).is_none() {
                    dangling.push(DanglingEdge {
                        edge_type,
                        source_type,
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                    });
                }
            }
        }
        dangling
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            nodes: self
                .nodes
                .iter()
                .map(|(&node_type, c)| (node_type, c.len()))
                .collect(),
            edge_batches: self
                .edge_batches()
                .map(|(edge_type, source_type, edges)| EdgeBatchSummary {
                    edge_type,
                    source_type,
                    edges: edges.len(),
                })
                .collect(),
        }
    }
}
