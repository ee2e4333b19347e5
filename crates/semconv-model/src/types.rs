//! Node and edge records of the convention graph.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Open field bag carried by nodes and edges.
pub type Fields = Map<String, Value>;

// ============================================================================
// Node types
// ============================================================================

/// The closed set of node tables.
///
/// Declaration order is the order collections are persisted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Metric,
    Entity,
    Span,
    AttributeGroup,
    Event,
    Attribute,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Metric,
        NodeType::Entity,
        NodeType::Span,
        NodeType::AttributeGroup,
        NodeType::Event,
        NodeType::Attribute,
    ];

    /// Graph table name for this node type.
    pub fn table_name(self) -> &'static str {
        match self {
            NodeType::Metric => "Metric",
            NodeType::Entity => "Entity",
            NodeType::Span => "Span",
            NodeType::AttributeGroup => "AttributeGroup",
            NodeType::Event => "Event",
            NodeType::Attribute => "Attribute",
        }
    }

    /// Map a group's declared `type` onto a node table.
    ///
    /// `attribute` is deliberately not a declared kind: attribute nodes only
    /// come from inline definitions inside another group's `attributes`.
    pub fn from_declared_kind(kind: &str) -> Option<NodeType> {
        match kind {
            "metric" => Some(NodeType::Metric),
            "entity" => Some(NodeType::Entity),
            "span" => Some(NodeType::Span),
            "attribute_group" => Some(NodeType::AttributeGroup),
            "event" => Some(NodeType::Event),
            _ => None,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.table_name())
    }
}

// ============================================================================
// Edge types
// ============================================================================

/// The closed set of relationship tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    HasAttribute,
    HasEvent,
    AssociatedWith,
}

impl EdgeType {
    pub const ALL: [EdgeType; 3] = [
        EdgeType::HasAttribute,
        EdgeType::HasEvent,
        EdgeType::AssociatedWith,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            EdgeType::HasAttribute => "HasAttribute",
            EdgeType::HasEvent => "HasEvent",
            EdgeType::AssociatedWith => "AssociatedWith",
        }
    }

    /// Node table every edge of this type points into.
    pub fn target_node_type(self) -> NodeType {
        match self {
            EdgeType::HasAttribute => NodeType::Attribute,
            EdgeType::HasEvent => NodeType::Event,
            EdgeType::AssociatedWith => NodeType::Entity,
        }
    }

    /// Prefix that bare identifiers of this edge type are qualified with.
    pub fn namespace_prefix(self) -> Option<&'static str> {
        match self {
            EdgeType::HasAttribute => None,
            EdgeType::HasEvent => Some("event."),
            EdgeType::AssociatedWith => Some("entity."),
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.table_name())
    }
}

// ============================================================================
// Records
// ============================================================================

/// One node: its identity plus passthrough fields.
///
/// Serializes flat as `{"id": ..., ...fields}`, which is the row shape of a
/// node batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Node {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// One directed edge with per-edge properties.
///
/// Serializes flat as `{"from": ..., "to": ..., ...properties}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub properties: Fields,
}

impl Edge {
    /// Keys the flat row reserves for the endpoints.
    pub const ENDPOINT_KEYS: [&'static str; 2] = ["from", "to"];

    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            properties: Fields::new(),
        }
    }

    pub fn with_properties(mut self, properties: Fields) -> Self {
        self.properties = properties;
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}
