//! Loader tests against an in-memory store

use super::*;
use semconv_model::{ConventionGraphBuilder, EdgeType, GraphModel, NodeType};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Schema(String),
    Nodes {
        table: String,
        batch: PathBuf,
        ignore_errors: bool,
    },
    Edges {
        table: String,
        batch: PathBuf,
        from: String,
        to: String,
    },
}

/// Records calls; rejects any call whose text contains a configured needle.
#[derive(Default)]
struct RecordingStore {
    calls: Vec<Call>,
    reject: Vec<String>,
}

impl RecordingStore {
    fn rejecting(needles: &[&str]) -> Self {
        Self {
            calls: Vec::new(),
            reject: needles.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn check(&self, text: &str) -> Result<(), StoreError> {
        match self.reject.iter().find(|n| text.contains(n.as_str())) {
            Some(needle) => Err(StoreError::Rejected {
                message: format!("refusing {needle}"),
            }),
            None => Ok(()),
        }
    }
}

impl GraphStore for RecordingStore {
    fn execute_schema(&mut self, statement: &str) -> Result<(), StoreError> {
        self.calls.push(Call::Schema(statement.to_string()));
        self.check(statement)
    }

    fn copy_nodes(
        &mut self,
        table: &str,
        batch: &Path,
        ignore_errors: bool,
    ) -> Result<(), StoreError> {
        self.calls.push(Call::Nodes {
            table: table.to_string(),
            batch: batch.to_path_buf(),
            ignore_errors,
        });
        self.check(&format!("nodes:{table}"))
    }

    fn copy_edges(
        &mut self,
        table: &str,
        batch: &Path,
        from_table: &str,
        to_table: &str,
    ) -> Result<(), StoreError> {
        self.calls.push(Call::Edges {
            table: table.to_string(),
            batch: batch.to_path_buf(),
            from: from_table.to_string(),
            to: to_table.to_string(),
        });
        self.check(&format!("edges:{table}:{from_table}"))
    }
}

fn sample_model() -> GraphModel {
    let mut builder = ConventionGraphBuilder::new();
    builder.add_entry(json!({
        "type": "attribute_group",
        "id": "registry.http",
        "attributes": [
            {"id": "http.request.method", "type": "string"},
            {"id": "http.response.status_code", "type": "int"},
            {"id": "http.route", "type": "string"},
            {"id": "server.address", "type": "string"},
            {"id": "server.port", "type": "int"}
        ]
    }));
    for id in ["http.server.duration", "http.client.duration", "http.server.active"] {
        builder.add_entry(json!({
            "type": "metric",
            "id": id,
            "attributes": [{"ref": "http.request.method"}, {"ref": "server.port"}],
            "entity_associations": ["service"]
        }));
    }
    let (model, report) = builder.finish();
    assert!(report.is_clean());
    model
}

fn options(dir: &Path, schema: Option<PathBuf>) -> BulkLoadOptions {
    BulkLoadOptions {
        batch_dir: dir.join("batches"),
        schema_file: schema,
        ignore_row_errors: true,
    }
}

fn read_rows(path: &Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn one_batch_and_load_per_node_table_and_edge_batch() {
    let dir = tempdir().unwrap();
    let model = sample_model();
    assert_eq!(model.nodes(NodeType::Metric).unwrap().len(), 3);
    assert_eq!(model.nodes(NodeType::Attribute).unwrap().len(), 5);

    let mut loader = BulkLoader::new(RecordingStore::default(), options(dir.path(), None));
    let report = loader.persist(&model);

    assert!(report.is_complete(), "{:?}", report.failures);
    assert_eq!(report.node_loads, NodeType::ALL.len());
    // HasAttribute from AttributeGroup and Metric, AssociatedWith from Metric.
    assert_eq!(report.edge_loads, 3);

    for node_type in NodeType::ALL {
        let path = dir
            .path()
            .join("batches")
            .join(node_batch_file_name(node_type));
        assert!(path.exists(), "missing {}", path.display());
    }
    assert!(!dir
        .path()
        .join("batches")
        .join(edge_batch_file_name(NodeType::Span, EdgeType::HasEvent))
        .exists());

    let store = loader.into_store();
    let node_tables: Vec<_> = store
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Nodes {
                table,
                ignore_errors,
                ..
            } => {
                assert!(*ignore_errors);
                Some(table.as_str())
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        node_tables,
        vec!["Metric", "Entity", "Span", "AttributeGroup", "Event", "Attribute"]
    );

    let assoc = store.calls.iter().find_map(|c| match c {
        Call::Edges {
            table, from, to, ..
        } if table == "AssociatedWith" => Some((from.clone(), to.clone())),
        _ => None,
    });
    assert_eq!(assoc, Some(("Metric".to_string(), "Entity".to_string())));
}

#[test]
fn batch_files_hold_flat_records_in_insertion_order() {
    let dir = tempdir().unwrap();
    let model = sample_model();
    let mut loader = BulkLoader::new(RecordingStore::default(), options(dir.path(), None));
    loader.persist(&model);

    let metrics = read_rows(&dir.path().join("batches/Metrics.json"));
    let ids: Vec<_> = metrics.iter().map(|m| m["id"].as_str().unwrap()).collect();
    assert_eq!(
        ids,
        vec!["http.server.duration", "http.client.duration", "http.server.active"]
    );
    assert!(metrics.iter().all(|m| m.get("type").is_none()));

    let edges = read_rows(&dir.path().join("batches/rel_Metric_HasAttribute.json"));
    assert_eq!(edges.len(), 6);
    assert_eq!(
        edges[0],
        json!({"from": "http.server.duration", "to": "http.request.method"})
    );

    let empty = read_rows(&dir.path().join("batches/Events.json"));
    assert!(empty.is_empty());
}

#[test]
fn schema_statements_run_in_file_order() {
    let dir = tempdir().unwrap();
    let schema = dir.path().join("schema.cypher");
    std::fs::write(
        &schema,
        "CREATE NODE TABLE Metric(id STRING PRIMARY KEY);\nCREATE NODE TABLE Entity(id STRING PRIMARY KEY);\n",
    )
    .unwrap();

    let mut loader = BulkLoader::new(
        RecordingStore::default(),
        options(dir.path(), Some(schema)),
    );
    let report = loader.persist(&GraphModel::new());
    assert_eq!(report.schema_statements, 2);

    let store = loader.into_store();
    assert_eq!(
        &store.calls[..2],
        &[
            Call::Schema("CREATE NODE TABLE Metric(id STRING PRIMARY KEY)".to_string()),
            Call::Schema("CREATE NODE TABLE Entity(id STRING PRIMARY KEY)".to_string()),
        ]
    );
}

#[test]
fn failures_are_isolated_and_loading_continues() {
    let dir = tempdir().unwrap();
    let schema = dir.path().join("schema.cypher");
    std::fs::write(
        &schema,
        "CREATE NODE TABLE Bad(x);\nCREATE NODE TABLE Good(id STRING PRIMARY KEY);",
    )
    .unwrap();

    let store = RecordingStore::rejecting(&[
        "Bad",
        "nodes:Metric",
        "edges:HasAttribute:AttributeGroup",
    ]);
    let mut loader = BulkLoader::new(store, options(dir.path(), Some(schema)));
    let report = loader.persist(&sample_model());

    assert_eq!(report.schema_statements, 1);
    assert_eq!(report.node_loads, NodeType::ALL.len() - 1);
    assert_eq!(report.edge_loads, 2);
    assert_eq!(report.failures.len(), 3);
    assert!(report.failures[0].statement.contains("CREATE NODE TABLE Bad"));
    assert!(report.failures[1].statement.starts_with("COPY Metric FROM"));
    assert!(report.failures[2]
        .statement
        .contains("(from='AttributeGroup', to='Attribute')"));
}

#[test]
fn missing_schema_file_only_fails_the_schema_phase() {
    let dir = tempdir().unwrap();
    let mut loader = BulkLoader::new(
        RecordingStore::default(),
        options(dir.path(), Some(dir.path().join("absent.cypher"))),
    );
    let report = loader.persist(&sample_model());

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].statement.starts_with("read schema"));
    assert_eq!(report.node_loads, NodeType::ALL.len());
}

#[test]
fn dangling_edges_are_counted_not_rejected() {
    let dir = tempdir().unwrap();
    let model = sample_model();
    let mut loader = BulkLoader::new(RecordingStore::default(), options(dir.path(), None));
    let report = loader.persist(&model);

    // Three metrics point at `entity.service`, which is never defined.
    assert_eq!(report.dangling_edges, 3);
    assert!(report.is_complete());
}

#[test]
fn script_store_collects_a_replayable_script() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("import.cypher");
    let store = CypherScriptStore::create(&script).unwrap();
    let mut loader = BulkLoader::new(store, options(dir.path(), None));
    loader.persist(&sample_model());
    loader.into_store().finish().unwrap();

    let text = std::fs::read_to_string(&script).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), NodeType::ALL.len() + 3);
    assert!(lines[0].starts_with("COPY Metric FROM '"));
    assert!(lines[0].ends_with("Metrics.json' (ignore_errors=true);"));
    assert!(lines
        .iter()
        .any(|l| l.ends_with("rel_Metric_AssociatedWith.json' (from='Metric', to='Entity');")));
}
