//! Semantic convention graph CLI
//!
//! - `summary`: build the graph and print node/edge counts
//! - `check`: build the graph and fail on any isolated issue
//! - `export`: build the graph, write batch files and a Kuzu import script,
//!   or with `--execute` load them straight into a Kuzu database

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use semconv_ingest_yaml::{build_graph, IngestedGraph};
use semconv_model::{BuildIssue, GraphSummary};
use semconv_storage::{BulkLoader, CypherScriptStore, PersistReport};
use std::path::PathBuf;

mod config;
mod logging;

use config::ConventionsConfig;
use logging::LogFormat;

#[derive(Parser)]
#[command(name = "semconv-graph")]
#[command(
    author,
    version,
    about = "Semantic conventions as a property graph"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Semantic convention model directory
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph and print node and edge counts.
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the graph and report every dropped group, duplicate and
    /// unparseable file. Exits non-zero when there is any.
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Build the graph, write batch files and a Cypher import script.
    Export {
        #[command(flatten)]
        source: SourceArgs,
        /// Directory for batch files
        #[arg(long)]
        batch_dir: Option<PathBuf>,
        /// Cypher schema file applied before loading
        #[arg(long, conflicts_with = "no_schema")]
        schema: Option<PathBuf>,
        /// Skip schema statements
        #[arg(long)]
        no_schema: bool,
        /// Output Cypher script
        #[arg(long, conflicts_with = "execute")]
        script: Option<PathBuf>,
        /// Load into the Kuzu database at `database_path` instead of
        /// writing a script (needs the `kuzu` feature)
        #[arg(long)]
        execute: bool,
        /// Kuzu database path
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose);

    let mut config = ConventionsConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Summary { source, json } => {
            apply_source(&mut config, source);
            let ingested = ingest(&config);
            print_summary(&ingested, json)?;
        }
        Commands::Check { source } => {
            apply_source(&mut config, source);
            let ingested = ingest(&config);
            check(&ingested)?;
        }
        Commands::Export {
            source,
            batch_dir,
            schema,
            no_schema,
            script,
            execute,
            database,
        } => {
            apply_source(&mut config, source);
            if let Some(dir) = batch_dir {
                config.batch_dir = dir;
            }
            if let Some(schema) = schema {
                config.schema_file = Some(schema);
            }
            if no_schema {
                config.schema_file = None;
            }
            if let Some(script) = script {
                config.script_path = script;
            }
            if let Some(database) = database {
                config.database_path = database;
            }
            let ingested = ingest(&config);
            if execute {
                load_database(&config, &ingested)?;
            } else {
                export(&config, &ingested)?;
            }
        }
    }

    Ok(())
}

fn apply_source(config: &mut ConventionsConfig, source: SourceArgs) {
    if let Some(dir) = source.model_dir {
        config.model_dir = dir;
    }
}

fn ingest(config: &ConventionsConfig) -> IngestedGraph {
    build_graph(&config.model_dir, &config.source_options())
}

fn print_summary(ingested: &IngestedGraph, json: bool) -> Result<()> {
    let summary = ingested.model.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    print_counts(&summary);
    println!(
        "\n{} documents, {} groups accepted, {} issues, {} unreadable files",
        ingested.report.documents,
        ingested.report.groups_accepted,
        ingested.report.issues.len(),
        ingested.failures.len()
    );
    Ok(())
}

fn print_counts(summary: &GraphSummary) {
    println!("{}", "Nodes".bold());
    for (node_type, count) in &summary.nodes {
        println!("  {:<16} {}", node_type.to_string().cyan(), count);
    }
    println!("{}", "Edges".bold());
    for batch in &summary.edge_batches {
        println!(
            "  {:<16} {:<16} -> {:<10} {}",
            batch.edge_type.to_string().cyan(),
            batch.source_type,
            batch.edge_type.target_node_type(),
            batch.edges
        );
    }
}

fn check(ingested: &IngestedGraph) -> Result<()> {
    for failure in &ingested.failures {
        println!(
            "{} {}: {}",
            "unreadable".red(),
            failure.path.display(),
            failure.error
        );
    }
    for issue in &ingested.report.issues {
        println!("{} {}", "issue".red(), describe(issue));
    }

    let dangling = ingested.model.dangling_edges();
    for edge in &dangling {
        println!(
            "{} {} {} -> {}",
            "dangling".yellow(),
            edge.edge_type,
            edge.from,
            edge.to
        );
    }

    let problems = ingested.failures.len() + ingested.report.issues.len();
    if problems > 0 {
        bail!("{problems} problems found");
    }
    println!(
        "{} ({} dangling edges)",
        "ok".green().bold(),
        dangling.len()
    );
    Ok(())
}

fn describe(issue: &BuildIssue) -> String {
    match issue {
        BuildIssue::UnknownKind { declared, id } => format!(
            "unknown kind {:?} for group {:?}",
            declared.as_deref().unwrap_or("<none>"),
            id.as_deref().unwrap_or("<no id>")
        ),
        BuildIssue::MalformedEntry { id, reason } => {
            format!("{reason} ({})", id.as_deref().unwrap_or("<no id>"))
        }
        BuildIssue::MalformedField { id, field, reason } => format!("{id}.{field}: {reason}"),
        BuildIssue::MalformedDocument { reason } => reason.clone(),
        BuildIssue::DuplicateNode { node_type, id, .. } => {
            format!("duplicate {node_type} `{id}`")
        }
        BuildIssue::MalformedAttribute {
            source_id,
            position,
            reason,
        } => format!("{source_id} attribute #{position}: {reason}"),
        BuildIssue::ReservedProperty {
            source_id,
            position,
            key,
            value,
        } => format!("{source_id} attribute #{position}: `{key}` is reserved, dropped {value}"),
        BuildIssue::MalformedReference {
            edge_type,
            source_id,
            position,
            value,
        } => format!("{source_id} {edge_type} #{position}: not a string: {value}"),
    }
}

fn export(config: &ConventionsConfig, ingested: &IngestedGraph) -> Result<()> {
    let store = CypherScriptStore::create(&config.script_path)
        .with_context(|| format!("creating script {}", config.script_path.display()))?;
    let mut loader = BulkLoader::new(store, config.load_options());
    let report = loader.persist(&ingested.model);
    let script = loader
        .into_store()
        .finish()
        .context("flushing import script")?;

    print_persist_report(&report);
    println!(
        "\nReplay with: kuzu {} < {}",
        config.database_path.display(),
        script.display()
    );
    Ok(())
}

#[cfg(feature = "kuzu")]
fn load_database(config: &ConventionsConfig, ingested: &IngestedGraph) -> Result<()> {
    use semconv_storage::{open_database, KuzuStore};

    let database = open_database(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path.display()))?;
    let store = KuzuStore::connect(&database).context("connecting to database")?;
    let mut loader = BulkLoader::new(store, config.load_options());
    let report = loader.persist(&ingested.model);

    print_persist_report(&report);
    println!(
        "\n{} statements applied to {}",
        loader.store().statements(),
        config.database_path.display()
    );
    Ok(())
}

#[cfg(not(feature = "kuzu"))]
fn load_database(_config: &ConventionsConfig, _ingested: &IngestedGraph) -> Result<()> {
    bail!("--execute needs a build with the `kuzu` feature")
}

fn print_persist_report(report: &PersistReport) {
    println!(
        "{} schema statements, {} node loads, {} edge loads, {} batch files",
        report.schema_statements,
        report.node_loads,
        report.edge_loads,
        report.batch_files.len()
    );
    if report.dangling_edges > 0 {
        println!(
            "{} {} edges point at missing nodes",
            "warning".yellow(),
            report.dangling_edges
        );
    }
    for failure in &report.failures {
        println!(
            "{} {}\n  {}",
            "failed".red(),
            failure.statement,
            failure.error
        );
    }
}
