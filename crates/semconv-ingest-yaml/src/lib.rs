//! Semantic convention document discovery
//!
//! Walks a model directory (the layout of the upstream
//! `semantic-conventions/model` tree), parses every YAML file into a JSON
//! value and feeds the documents to the graph builder.
//!
//! Files that cannot be read or parsed are skipped and reported; they never
//! abort the walk. A missing root directory yields an empty graph.

use semconv_model::{BuildReport, ConventionGraphBuilder, GraphModel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("directory not found: {}", .0.display())]
    RootNotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Options controlling document discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSourceOptions {
    /// File extensions to parse (lowercase, without dot).
    pub extensions: Vec<String>,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
}

impl Default for DocumentSourceOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["yaml".to_string()],
            follow_links: false,
        }
    }
}

/// One parsed document and where it came from.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub content: Value,
}

/// A file that was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct LoadedDocuments {
    pub documents: Vec<SourceDocument>,
    pub failures: Vec<DocumentFailure>,
    /// Parsed files whose top level is not a mapping.
    pub skipped: usize,
}

/// Parse one file. `Ok(None)` when the document is not a mapping.
pub fn parse_document(path: &Path) -> Result<Option<Value>, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_yaml::from_str(&content).map_err(|source| IngestError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(value.is_object().then_some(value))
}

/// Recursively load every matching document under `root`, in file-name
/// order.
pub fn load_documents(
    root: &Path,
    options: &DocumentSourceOptions,
) -> Result<LoadedDocuments, IngestError> {
    if !root.is_dir() {
        return Err(IngestError::RootNotFound(root.to_path_buf()));
    }

    let extensions = normalize_extensions(&options.extensions);
    let mut loaded = LoadedDocuments::default();

    let walker = WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                let err = IngestError::Walk { path: path.clone(), source: err };
                tracing::error!(path = %path.display(), error = %err, "skipping unreadable path");
                loaded.failures.push(DocumentFailure {
                    path,
                    error: err.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_extension(entry.path(), &extensions) {
            continue;
        }

        let path = entry.path();
        match parse_document(path) {
            Ok(Some(content)) => loaded.documents.push(SourceDocument {
                path: path.to_path_buf(),
                content,
            }),
            Ok(None) => {
                tracing::debug!(path = %path.display(), "document is not a mapping, skipping");
                loaded.skipped += 1;
            }
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "error parsing YAML file");
                loaded.failures.push(DocumentFailure {
                    path: path.to_path_buf(),
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(loaded)
}

/// Lowercase, without a leading dot: `".YAML"` and `"yaml"` are the same.
fn normalize_extensions(extensions: &[String]) -> BTreeSet<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn has_extension(path: &Path, extensions: &BTreeSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_ascii_lowercase()))
        .unwrap_or(false)
}

/// The graph built from a model directory, plus everything that went wrong.
#[derive(Debug, Default)]
pub struct IngestedGraph {
    pub model: GraphModel,
    pub report: BuildReport,
    pub failures: Vec<DocumentFailure>,
    pub skipped: usize,
}

/// Load `root` and build the convention graph.
///
/// A missing root is logged and produces an empty graph so later phases
/// can still run.
pub fn build_graph(root: &Path, options: &DocumentSourceOptions) -> IngestedGraph {
    let loaded = match load_documents(root, options) {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::error!(path = %root.display(), error = %err, "directory not found");
            return IngestedGraph {
                failures: vec![DocumentFailure {
                    path: root.to_path_buf(),
                    error: err.to_string(),
                }],
                ..Default::default()
            };
        }
    };

    let mut builder = ConventionGraphBuilder::new();
    for document in &loaded.documents {
        let _span = tracing::info_span!("document", path = %document.path.display()).entered();
        builder.add_document(&document.content);
    }
    let (model, report) = builder.finish();

    tracing::info!(
        documents = loaded.documents.len(),
        failures = loaded.failures.len(),
        nodes = model.node_count(),
        edges = model.edge_count(),
        issues = report.issues.len(),
        "built convention graph"
    );

    IngestedGraph {
        model,
        report,
        failures: loaded.failures,
        skipped: loaded.skipped,
    }
}
