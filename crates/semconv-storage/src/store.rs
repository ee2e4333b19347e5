//! The target graph store seen from the loader: schema statements plus
//! bulk node and edge loads.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("statement rejected: {message}")]
    Rejected { message: String },
    #[error("failed to open database {}: {message}", .path.display())]
    Open { path: PathBuf, message: String },
}

/// Entry points a graph store exposes for bulk loading.
///
/// Every call stands alone; a failure never rolls back earlier calls.
pub trait GraphStore {
    /// Execute one schema (DDL) statement.
    fn execute_schema(&mut self, statement: &str) -> Result<(), StoreError>;

    /// Bulk-load a node batch file into `table`.
    fn copy_nodes(
        &mut self,
        table: &str,
        batch: &Path,
        ignore_errors: bool,
    ) -> Result<(), StoreError>;

    /// Bulk-load an edge batch file into `table`, declaring the source and
    /// destination node tables.
    fn copy_edges(
        &mut self,
        table: &str,
        batch: &Path,
        from_table: &str,
        to_table: &str,
    ) -> Result<(), StoreError>;
}

/// A bulk-load call, rendered as Kuzu Cypher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyStatement<'a> {
    Nodes {
        table: &'a str,
        batch: &'a Path,
        ignore_errors: bool,
    },
    Edges {
        table: &'a str,
        batch: &'a Path,
        from_table: &'a str,
        to_table: &'a str,
    },
}

impl fmt::Display for CopyStatement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyStatement::Nodes {
                table,
                batch,
                ignore_errors,
            } => write!(
                f,
                "COPY {table} FROM '{}' (ignore_errors={ignore_errors})",
                quote_path(batch)
            ),
            CopyStatement::Edges {
                table,
                batch,
                from_table,
                to_table,
            } => write!(
                f,
                "COPY {table} FROM '{}' (from='{from_table}', to='{to_table}')",
                quote_path(batch)
            ),
        }
    }
}

fn quote_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "\\'")
}

// ============================================================================
// Cypher script store
// ============================================================================

/// Writes every statement to a Cypher script instead of executing it.
///
/// The script replays against a Kuzu database with
/// `kuzu <database> < script.cypher`.
pub struct CypherScriptStore {
    writer: BufWriter<File>,
    path: PathBuf,
    statements: usize,
}

impl CypherScriptStore {
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            statements: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn statements(&self) -> usize {
        self.statements
    }

    /// Flush the script to disk.
    pub fn finish(mut self) -> Result<PathBuf, StoreError> {
        self.writer.flush()?;
        Ok(self.path)
    }

    fn write_statement(&mut self, statement: &str) -> Result<(), StoreError> {
        writeln!(self.writer, "{};", statement.trim())?;
        self.statements += 1;
        Ok(())
    }
}

impl GraphStore for CypherScriptStore {
    fn execute_schema(&mut self, statement: &str) -> Result<(), StoreError> {
        self.write_statement(statement)
    }

    fn copy_nodes(
        &mut self,
        table: &str,
        batch: &Path,
        ignore_errors: bool,
    ) -> Result<(), StoreError> {
        let statement = CopyStatement::Nodes {
            table,
            batch,
            ignore_errors,
        };
        self.write_statement(&statement.to_string())
    }

    fn copy_edges(
        &mut self,
        table: &str,
        batch: &Path,
        from_table: &str,
        to_table: &str,
    ) -> Result<(), StoreError> {
        let statement = CopyStatement::Edges {
            table,
            batch,
            from_table,
            to_table,
        };
        self.write_statement(&statement.to_string())
    }
}
