//! Bulk loader: schema, then one load per node table, then one load per
//! nonempty edge batch.
//!
//! Loading is best effort. Each statement runs on its own; a failure is
//! logged with the offending statement, kept in the [`PersistReport`], and
//! the loader moves on.

use crate::batch::{edge_batch_file_name, node_batch_file_name, write_batch};
use crate::schema::split_schema;
use crate::store::{CopyStatement, GraphStore};
use crate::PersistError;
use semconv_model::GraphModel;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkLoadOptions {
    /// Directory batch files are written to.
    pub batch_dir: PathBuf,
    /// Cypher DDL applied before any load.
    pub schema_file: Option<PathBuf>,
    /// Let the store skip malformed node rows instead of failing the table.
    pub ignore_row_errors: bool,
}

impl Default for BulkLoadOptions {
    fn default() -> Self {
        Self {
            batch_dir: PathBuf::from("."),
            schema_file: Some(PathBuf::from("schema/kuzu_schema.cypher")),
            ignore_row_errors: true,
        }
    }
}

/// A statement that did not go through.
#[derive(Debug, Clone, Serialize)]
pub struct PersistFailure {
    pub statement: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PersistReport {
    pub schema_statements: usize,
    pub node_loads: usize,
    pub edge_loads: usize,
    pub batch_files: Vec<PathBuf>,
    pub dangling_edges: usize,
    pub failures: Vec<PersistFailure>,
}

impl PersistReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, statement: impl Into<String>, err: PersistError) {
        let statement = statement.into();
        tracing::error!(%statement, error = %err, "statement failed, continuing");
        self.failures.push(PersistFailure {
            statement,
            error: err.to_string(),
        });
    }
}

pub struct BulkLoader<S> {
    store: S,
    options: BulkLoadOptions,
}

impl<S: GraphStore> BulkLoader<S> {
    pub fn new(store: S, options: BulkLoadOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Schema, nodes, edges.
    pub fn persist(&mut self, model: &GraphModel) -> PersistReport {
        let mut report = PersistReport::default();
        if let Err(err) = std::fs::create_dir_all(&self.options.batch_dir) {
            let path = self.options.batch_dir.clone();
            report.fail(
                format!("create batch directory {}", path.display()),
                PersistError::BatchIo { path, source: err },
            );
        }
        self.apply_schema(&mut report);
        self.persist_nodes(model, &mut report);
        self.persist_edges(model, &mut report);

        tracing::info!(
            schema_statements = report.schema_statements,
            node_loads = report.node_loads,
            edge_loads = report.edge_loads,
            failures = report.failures.len(),
            "persisted convention graph"
        );
        report
    }

    /// Execute the schema file statement by statement. Not transactional:
    /// a failure leaves the statements before it applied.
    pub fn apply_schema(&mut self, report: &mut PersistReport) {
        let Some(schema_file) = self.options.schema_file.clone() else {
            return;
        };
        let text = match std::fs::read_to_string(&schema_file) {
            Ok(text) => text,
            Err(source) => {
                report.fail(
                    format!("read schema {}", schema_file.display()),
                    PersistError::Schema {
                        path: schema_file,
                        source,
                    },
                );
                return;
            }
        };

        for statement in split_schema(&text) {
            match self.store.execute_schema(&statement) {
                Ok(()) => report.schema_statements += 1,
                Err(err) => report.fail(statement, err.into()),
            }
        }
    }

    /// One batch file and one load per node table, empty tables included.
    pub fn persist_nodes(&mut self, model: &GraphModel, report: &mut PersistReport) {
        for collection in model.node_collections() {
            let table = collection.node_type().table_name();
            let batch = self
                .options
                .batch_dir
                .join(node_batch_file_name(collection.node_type()));
            let statement = CopyStatement::Nodes {
                table,
                batch: &batch,
                ignore_errors: self.options.ignore_row_errors,
            }
            .to_string();

            if let Err(err) = write_batch(&batch, collection.as_slice()) {
                report.fail(statement, err);
                continue;
            }
            report.batch_files.push(batch.clone());

            match self
                .store
                .copy_nodes(table, &batch, self.options.ignore_row_errors)
            {
                Ok(()) => report.node_loads += 1,
                Err(err) => report.fail(statement, err.into()),
            }
        }
    }

    /// One batch file and one load per nonempty (source, edge) pair.
    pub fn persist_edges(&mut self, model: &GraphModel, report: &mut PersistReport) {
        let dangling = model.dangling_edges();
        if !dangling.is_empty() {
            for edge in &dangling {
                tracing::debug!(
                    edge_type = %edge.edge_type,
                    from = %edge.from,
                    to = %edge.to,
                    "edge endpoint has no node"
                );
            }
            tracing::warn!(
                count = dangling.len(),
                "edges point at missing nodes; the store will drop them"
            );
        }
        report.dangling_edges = dangling.len();

        for (edge_type, source_type, edges) in model.edge_batches() {
            let table = edge_type.table_name();
            let from_table = source_type.table_name();
            let to_table = edge_type.target_node_type().table_name();
            let batch = self
                .options
                .batch_dir
                .join(edge_batch_file_name(source_type, edge_type));
            let statement = CopyStatement::Edges {
                table,
                batch: &batch,
                from_table,
                to_table,
            }
            .to_string();

            if let Err(err) = write_batch(&batch, edges) {
                report.fail(statement, err);
                continue;
            }
            report.batch_files.push(batch.clone());

            match self.store.copy_edges(table, &batch, from_table, to_table) {
                Ok(()) => report.edge_loads += 1,
                Err(err) => report.fail(statement, err.into()),
            }
        }
    }
}
