//! Batch files: one JSON array of flat records per node table and per
//! (source table, edge table) pair.

use crate::PersistError;
use semconv_model::{EdgeType, NodeType};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// `Metrics.json`, `AttributeGroups.json`, ...
pub fn node_batch_file_name(node_type: NodeType) -> String {
    format!("{}s.json", node_type.table_name())
}

/// `rel_Metric_HasAttribute.json`, ...
pub fn edge_batch_file_name(source_type: NodeType, edge_type: EdgeType) -> String {
    format!(
        "rel_{}_{}.json",
        source_type.table_name(),
        edge_type.table_name()
    )
}

/// Write `rows` as a JSON array.
pub fn write_batch<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), PersistError> {
    let file = File::create(path).map_err(|source| PersistError::BatchIo {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, rows).map_err(|source| PersistError::BatchEncode {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| PersistError::BatchIo {
        path: path.to_path_buf(),
        source,
    })
}
