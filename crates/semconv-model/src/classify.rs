//! Group classification: declared `type` → node table.

use crate::types::{Fields, NodeType};

/// Outcome of classifying one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Known(NodeType),
    /// Declared kind is missing, not a string, or not ingestible.
    Unknown { declared: Option<String> },
}

/// Classify a raw group by its `type` discriminator. Pure lookup.
pub fn classify(entry: &Fields) -> Classification {
    let declared = entry.get("type").and_then(|v| v.as_str());
    match declared.and_then(NodeType::from_declared_kind) {
        Some(node_type) => Classification::Known(node_type),
        None => Classification::Unknown {
            declared: declared.map(str::to_string),
        },
    }
}
