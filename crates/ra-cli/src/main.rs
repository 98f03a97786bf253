//! ra: repository assistant configuration manager.
//!
//! Thin boundary layer over [`ra_store::ConfigStore`]: validate, upsert,
//! show, list, and delete configuration documents in a directory of JSON
//! files. Success responses are printed as JSON on stdout; diagnostics go
//! to stderr.

mod exit_codes;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::error;

use ra_schema::ConfigDocument;
use ra_store::{ConfigStore, StoreError};

use crate::exit_codes::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "ra", version, about = "Repository assistant configuration manager")]
struct Cli {
    /// Configuration directory holding one JSON file per document.
    #[arg(long, global = true, value_name = "DIR", env = "RA_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Log level filter (overridden by RUST_LOG when set).
    #[arg(long, global = true, default_value = "info", value_name = "LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a document file without storing it.
    Validate {
        /// Path to the JSON document.
        file: PathBuf,
    },
    /// Create or replace a configuration document.
    Upsert {
        /// Path to the JSON document; the store key is its `name` field.
        file: PathBuf,
        /// Replace an existing document of the same name.
        #[arg(long)]
        overwrite: bool,
    },
    /// Print a stored document as JSON.
    Show {
        /// Document name.
        name: String,
    },
    /// List the names of all stored documents.
    List,
    /// Delete a stored document and its file.
    Delete {
        /// Document name.
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(()) => std::process::exit(ExitCode::Ok.as_i32()),
        Err(err) => {
            report(&err);
            std::process::exit(ExitCode::from(&err).as_i32());
        }
    }
}

fn run(cli: Cli) -> Result<(), StoreError> {
    let config_dir = cli.config_dir.unwrap_or_else(default_config_dir);

    match cli.command {
        Command::Validate { file } => {
            let raw = read_request(&file)?;
            let doc = ConfigDocument::from_value(&raw)?;
            println!("{}", serde_json::json!({ "valid": doc.name }));
            Ok(())
        }
        Command::Upsert { file, overwrite } => {
            let raw = read_request(&file)?;
            let store = ConfigStore::open(&config_dir)?;
            let saved = store.create_or_replace(&raw, overwrite)?;
            println!("{}", serde_json::json!({ "saved-conf": saved }));
            Ok(())
        }
        Command::Show { name } => {
            let store = ConfigStore::open(&config_dir)?;
            let doc = store.get(&name)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }
        Command::List => {
            let store = ConfigStore::open(&config_dir)?;
            println!("{}", serde_json::json!({ "configurations": store.names() }));
            Ok(())
        }
        Command::Delete { name } => {
            let store = ConfigStore::open(&config_dir)?;
            let deleted = store.delete(&name)?;
            println!("{}", serde_json::json!({ "deleted": deleted }));
            Ok(())
        }
    }
}

/// Read a request body from disk. Anything that is not well-formed JSON is
/// rejected here, before it reaches the store.
fn read_request(file: &PathBuf) -> Result<Value, StoreError> {
    let contents = std::fs::read_to_string(file).map_err(|e| {
        StoreError::MalformedRequest(format!("cannot read {}: {e}", file.display()))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        StoreError::MalformedRequest(format!("{} is not valid JSON: {e}", file.display()))
    })
}

fn report(err: &StoreError) {
    error!(code = err.code(), client_error = err.is_client_error(), "{err}");
    match err {
        StoreError::Validation(schema_err) => {
            eprintln!("error: schema validation failed");
            for violation in &schema_err.violations {
                eprintln!("  - {violation}");
            }
        }
        other => eprintln!("error: {other}"),
    }
}

/// Default configuration directory: `<config>/repo-assistant/repositories`.
fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("repo-assistant")
        .join("repositories")
}

fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
