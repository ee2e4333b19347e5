use crate::types::{Node, NodeType};

/// Errors raised while mutating a [`crate::GraphModel`].
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A second definition for an id already present in a node table.
    ///
    /// The existing definition is retained; both payloads are kept for
    /// diagnosis.
    #[error("duplicate {node_type} id `{id}`")]
    DuplicateNode {
        node_type: NodeType,
        id: String,
        existing: Box<Node>,
        incoming: Box<Node>,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
