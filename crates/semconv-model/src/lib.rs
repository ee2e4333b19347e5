//! Semantic convention graph model
//!
//! Turns semantic convention groups (metrics, spans, entities, events,
//! attribute groups) into a property graph:
//!
//! ```text
//!   raw groups ──► classify ──► ConventionGraphBuilder ──► GraphModel
//!                                   │        ▲
//!                                   ▼        │
//!                          attribute / event / entity resolvers
//! ```
//!
//! - Nodes: `Metric`, `Entity`, `Span`, `AttributeGroup`, `Event`, `Attribute`
//! - Edges: `HasAttribute`, `HasEvent`, `AssociatedWith`, partitioned by
//!   source node type
//!
//! This crate does no I/O. Loading documents and persisting the model live
//! in `semconv-ingest-yaml` and `semconv-storage`.

pub mod builder;
pub mod classify;
pub mod error;
pub mod graph;
pub mod report;
pub mod resolve;
pub mod types;

pub use builder::{build_from_documents, ConventionGraphBuilder};
pub use classify::{classify, Classification};
pub use error::ModelError;
pub use graph::{DanglingEdge, EdgeBatchSummary, GraphModel, GraphSummary, NodeCollection};
pub use report::{BuildIssue, BuildReport};
pub use types::{Edge, EdgeType, Fields, Node, NodeType};
