//! Per-run diagnostics.
//!
//! Every condition the builder isolates (dropped group, rejected duplicate,
//! malformed descriptor) becomes a [`BuildIssue`]. Recording an issue also
//! emits a `tracing` event, so nothing is dropped without a log line.

use crate::error::ModelError;
use crate::types::{EdgeType, Node, NodeType};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildIssue {
    /// Group whose declared kind is not ingestible; dropped entirely.
    UnknownKind {
        declared: Option<String>,
        id: Option<String>,
    },
    /// Group that is not a mapping or has no string `id`.
    MalformedEntry { id: Option<String>, reason: String },
    /// Relation field of an accepted group that is not a list; the group is
    /// kept and the field yields no edges.
    MalformedField {
        id: String,
        field: String,
        reason: String,
    },
    /// Document whose `groups` field is not a list.
    MalformedDocument { reason: String },
    /// Second definition of an id; the first one is kept.
    DuplicateNode {
        node_type: NodeType,
        id: String,
        existing: Node,
        incoming: Node,
    },
    /// Attribute descriptor that yields no edge.
    MalformedAttribute {
        source_id: String,
        position: usize,
        reason: String,
    },
    /// Per-usage attribute property named like an edge endpoint; the
    /// property is dropped and the edge kept.
    ReservedProperty {
        source_id: String,
        position: usize,
        key: String,
        value: Value,
    },
    /// Event or entity reference that is not a string.
    MalformedReference {
        edge_type: EdgeType,
        source_id: String,
        position: usize,
        value: Value,
    },
}

impl From<ModelError> for BuildIssue {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::DuplicateNode {
                node_type,
                id,
                existing,
                incoming,
            } => BuildIssue::DuplicateNode {
                node_type,
                id,
                existing: *existing,
                incoming: *incoming,
            },
        }
    }
}

impl BuildIssue {
    fn emit(&self) {
        match self {
            BuildIssue::UnknownKind { declared, id } => {
                tracing::error!(?declared, ?id, "unknown semantic convention kind, group dropped");
            }
            BuildIssue::MalformedEntry { id, reason } => {
                tracing::error!(?id, %reason, "malformed group, dropped");
            }
            BuildIssue::MalformedField { id, field, reason } => {
                tracing::error!(%id, %field, %reason, "malformed relation field, ignored");
            }
            BuildIssue::MalformedDocument { reason } => {
                tracing::error!(%reason, "malformed document");
            }
            BuildIssue::DuplicateNode {
                node_type,
                id,
                existing,
                incoming,
            } => {
                tracing::error!(
                    %node_type,
                    %id,
                    existing = %serde_json::to_string(existing).unwrap_or_default(),
                    incoming = %serde_json::to_string(incoming).unwrap_or_default(),
                    "node id already exists, skipping"
                );
            }
            BuildIssue::MalformedAttribute {
                source_id,
                position,
                reason,
            } => {
                tracing::error!(%source_id, position, %reason, "malformed attribute descriptor");
            }
            BuildIssue::ReservedProperty {
                source_id,
                position,
                key,
                value,
            } => {
                tracing::error!(%source_id, position, %key, %value, "attribute property shadows an edge endpoint, dropped");
            }
            BuildIssue::MalformedReference {
                edge_type,
                source_id,
                position,
                value,
            } => {
                tracing::error!(%edge_type, %source_id, position, %value, "reference is not a string");
            }
        }
    }
}

/// Outcome of a build: accepted group counts plus every isolated issue.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub documents: usize,
    pub groups_accepted: usize,
    pub issues: Vec<BuildIssue>,
}

impl BuildReport {
    /// Log and keep an issue.
    pub fn record(&mut self, issue: impl Into<BuildIssue>) {
        let issue = issue.into();
        issue.emit();
        self.issues.push(issue);
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn duplicates(&self) -> impl Iterator<Item = &BuildIssue> {
        self.issues
            .iter()
            .filter(|i| matches!(i, BuildIssue::DuplicateNode { .. }))
    }

    pub fn unknown_kinds(&self) -> impl Iterator<Item = &BuildIssue> {
        self.issues
            .iter()
            .filter(|i| matches!(i, BuildIssue::UnknownKind { .. }))
    }
}
