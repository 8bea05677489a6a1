//! Workforce CLI
//!
//! Command-line entry point for ingesting department, job and employee
//! records and running the named analytical queries.

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use workforce_core::db::{health_check, open_db};
use workforce_core::{
    count_records, init_logging, init_stderr_logging, logging_status, EntityKind, ErrorKind,
    EventLog, FacadeLog, IngestConfig, IngestError, IngestService, QueryCatalog, QueryRunner,
    RawRecord,
};

#[derive(Debug, Parser)]
#[command(name = "workforce")]
#[command(about = "Workforce - department, job and employee record ingestion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ingest one delimited file or JSON batch of a single entity kind
    Ingest(IngestArgs),
    /// Run a named read-only query and print its rows as JSON
    Query(QueryArgs),
    /// List the embedded query names
    Queries,
    /// Report whether the store answers
    Health,
    /// Print configuration, logging and per-table row counts
    Status,
}

#[derive(Debug, Args)]
struct IngestArgs {
    /// departments | jobs | employees
    kind: EntityKind,

    /// Comma-delimited file, with or without a header line
    #[arg(long, conflicts_with = "json", required_unless_present = "json")]
    file: Option<PathBuf>,

    /// JSON file holding an array of objects
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Query name, e.g. quarterly_hires_2021
    name: String,
}

type CliResult = Result<Value, Box<dyn std::error::Error>>;

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match IngestConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(2);
        }
    };

    let logging = match &config.log_dir {
        Some(dir) => init_logging(&config.log_level, &dir.to_string_lossy()),
        None => init_stderr_logging(&config.log_level),
    };
    if let Err(err) = logging {
        eprintln!("Error: {err}");
        std::process::exit(2);
    }

    let result = match cli.command {
        Commands::Ingest(args) => execute_ingest(&config, args),
        Commands::Query(args) => execute_query(&config, args),
        Commands::Queries => Ok(json!(QueryCatalog::embedded_names().collect::<Vec<_>>())),
        Commands::Health => execute_health(&config),
        Commands::Status => execute_status(&config),
    };

    match result {
        Ok(output) => println!("{output}"),
        Err(err) => {
            println!("{}", error_output(err.as_ref()));
            std::process::exit(1);
        }
    }
}

/// Logs the full failure and renders only its kind and fixed message.
///
/// Failures outside the taxonomy (store bootstrap, file reads) are reported
/// as transient so raw storage or filesystem text never reaches the caller.
fn error_output(err: &(dyn std::error::Error + 'static)) -> Value {
    let (kind, message, cause) = match err.downcast_ref::<IngestError>() {
        Some(classified) => (
            classified.kind(),
            classified.message(),
            classified
                .cause()
                .map_or_else(|| "none".to_string(), |cause| cause.to_string()),
        ),
        None => (
            ErrorKind::TransientFailure,
            ErrorKind::TransientFailure.default_message(),
            err.to_string(),
        ),
    };
    error!(
        "event=cli_command module=cli status=error error_code={} cause={}",
        kind.code(),
        cause.replace(['\n', '\r'], " ")
    );
    json!({ "status": "error", "error": kind.code(), "message": message })
}

fn execute_ingest(config: &IngestConfig, args: IngestArgs) -> CliResult {
    let conn = open_db(&config.db_path)?;
    let log: Arc<dyn EventLog> = Arc::new(FacadeLog);
    let service = IngestService::try_new(&conn, config.batch_size, log)?;

    let inserted = match (&args.file, &args.json) {
        (Some(path), _) => service.ingest_file_as(args.kind, &std::fs::read(path)?)?,
        (None, Some(path)) => {
            let records = read_json_batch(&std::fs::read(path)?)?;
            service.ingest_batch(args.kind, &records)?
        }
        (None, None) => return Err("either --file or --json is required".into()),
    };

    info!(
        "event=cli_ingest module=cli status=ok kind={} inserted={}",
        args.kind, inserted
    );
    Ok(json!({ "status": "ok", "kind": args.kind, "inserted": inserted }))
}

fn read_json_batch(bytes: &[u8]) -> Result<Vec<RawRecord>, IngestError> {
    let invalid = |cause: String| IngestError::new(ErrorKind::InvalidDataFormat).with_cause(cause);
    let value: Value = serde_json::from_slice(bytes).map_err(|err| invalid(err.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| invalid("batch must be a JSON array".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object()
                .map(RawRecord::from_json_object)
                .ok_or_else(|| invalid(format!("batch item {index} is not an object")))
        })
        .collect()
}

fn execute_query(config: &IngestConfig, args: QueryArgs) -> CliResult {
    let conn = open_db(&config.db_path)?;
    let catalog = match &config.query_dir {
        Some(dir) => QueryCatalog::with_dir(dir),
        None => QueryCatalog::embedded(),
    };
    let runner = QueryRunner::new(&conn, catalog, Arc::new(FacadeLog));
    Ok(json!(runner.run(&args.name)?))
}

fn execute_health(config: &IngestConfig) -> CliResult {
    let status = match open_db(&config.db_path) {
        Ok(conn) => health_check(&conn),
        Err(_) => "unavailable",
    };
    Ok(json!({ "status": status }))
}

fn execute_status(config: &IngestConfig) -> CliResult {
    let conn = open_db(&config.db_path)?;
    let mut counts = serde_json::Map::new();
    for kind in EntityKind::ALL {
        counts.insert(kind.table().to_string(), json!(count_records(&conn, kind)?));
    }
    let logging = logging_status().map(|(level, destination)| {
        json!({ "level": level, "destination": destination.to_string() })
    });

    Ok(json!({
        "version": workforce_core::core_version(),
        "db_path": config.db_path.display().to_string(),
        "batch_size": config.batch_size.get(),
        "health": health_check(&conn),
        "logging": logging,
        "records": counts,
    }))
}
