//! Bulk persistence for the semantic convention graph
//!
//! ```text
//!   GraphModel ──► batch files (JSON arrays) ──► GraphStore
//!                   Metrics.json                  execute_schema(ddl)
//!                   rel_Metric_HasAttribute.json  copy_nodes(table, file)
//!                   ...                           copy_edges(table, file, from, to)
//! ```
//!
//! Stores: [`CypherScriptStore`] writes a replayable script; with the
//! `kuzu` feature, `KuzuStore` runs the same statements against an
//! embedded Kuzu database.
//!
//! The model crate knows nothing about stores; this crate only reads a
//! finished [`semconv_model::GraphModel`].

use std::path::PathBuf;

pub mod batch;
#[cfg(feature = "kuzu")]
pub mod kuzu_store;
pub mod loader;
pub mod schema;
pub mod store;

#[cfg(test)]
mod tests;

pub use batch::{edge_batch_file_name, node_batch_file_name, write_batch};
pub use loader::{BulkLoadOptions, BulkLoader, PersistFailure, PersistReport};
pub use schema::split_schema;
pub use store::{CopyStatement, CypherScriptStore, GraphStore, StoreError};

#[cfg(feature = "kuzu")]
pub use kuzu_store::{open_database, KuzuStore};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to read schema {}: {source}", .path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write batch {}: {source}", .path.display())]
    BatchIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode batch {}: {source}", .path.display())]
    BatchEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}
