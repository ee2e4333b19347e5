//! Run configuration: TOML file first, command-line flags on top.

use anyhow::{Context, Result};
use semconv_ingest_yaml::DocumentSourceOptions;
use semconv_storage::BulkLoadOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConventionsConfig {
    /// Root of the semantic convention model tree.
    pub model_dir: PathBuf,
    /// Kuzu database `export --execute` loads into.
    pub database_path: PathBuf,
    /// Cypher DDL applied before loading; `None` skips schema setup.
    pub schema_file: Option<PathBuf>,
    /// Where batch files are written.
    pub batch_dir: PathBuf,
    /// Where the Cypher import script is written.
    pub script_path: PathBuf,
    /// Document extensions to ingest.
    pub extensions: Vec<String>,
    pub follow_links: bool,
    pub ignore_row_errors: bool,
}

impl Default for ConventionsConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("../semantic-conventions/model"),
            database_path: PathBuf::from("db/semantic_conventions.kuzu"),
            schema_file: Some(PathBuf::from("schema/kuzu_schema.cypher")),
            batch_dir: PathBuf::from("db/import"),
            script_path: PathBuf::from("db/import.cypher"),
            extensions: vec!["yaml".to_string()],
            follow_links: false,
            ignore_row_errors: true,
        }
    }
}

impl ConventionsConfig {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn source_options(&self) -> DocumentSourceOptions {
        DocumentSourceOptions {
            extensions: self.extensions.clone(),
            follow_links: self.follow_links,
        }
    }

    pub fn load_options(&self) -> BulkLoadOptions {
        BulkLoadOptions {
            batch_dir: self.batch_dir.clone(),
            schema_file: self.schema_file.clone(),
            ignore_row_errors: self.ignore_row_errors,
        }
    }
}
