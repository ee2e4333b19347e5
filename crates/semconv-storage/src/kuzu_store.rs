//! Embedded Kuzu database as a [`GraphStore`].
//!
//! Runs the same statements [`crate::CypherScriptStore`] writes out, one
//! query per call. Relative batch paths resolve against the process
//! working directory, as they do in the Kuzu shell.

use crate::store::{CopyStatement, GraphStore, StoreError};
use kuzu::{Connection, Database, SystemConfig};
use std::path::Path;

/// Open the Kuzu database at `path`, creating it (and its parent
/// directory) when missing.
pub fn open_database(path: &Path) -> Result<Database, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Database::new(path, SystemConfig::default()).map_err(|err| StoreError::Open {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// A connection to an open database. Every statement is its own query, so
/// a rejected statement leaves earlier ones applied.
pub struct KuzuStore<'db> {
    connection: Connection<'db>,
    statements: usize,
}

impl<'db> KuzuStore<'db> {
    pub fn connect(database: &'db Database) -> Result<Self, StoreError> {
        let connection = Connection::new(database).map_err(rejected)?;
        // JSON batch files need the json extension. Builds that link it
        // statically reject the LOAD, which is harmless.
        if let Err(err) = connection.query("LOAD json") {
            tracing::debug!(error = %err, "json extension not loaded");
        }
        Ok(Self {
            connection,
            statements: 0,
        })
    }

    /// Statements executed successfully so far.
    pub fn statements(&self) -> usize {
        self.statements
    }

    fn run(&mut self, statement: &str) -> Result<(), StoreError> {
        tracing::debug!(%statement, "executing");
        self.connection.query(statement).map_err(rejected)?;
        self.statements += 1;
        Ok(())
    }
}

fn rejected(err: kuzu::Error) -> StoreError {
    StoreError::Rejected {
        message: err.to_string(),
    }
}

impl GraphStore for KuzuStore<'_> {
    fn execute_schema(&mut self, statement: &str) -> Result<(), StoreError> {
        self.run(statement)
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
        self.run(&statement.to_string())
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
        self.run(&statement.to_string())
    }
}
