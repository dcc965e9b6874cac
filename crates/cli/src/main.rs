//! `assess` operator CLI.
//!
//! Environment (a `.env` file in the working directory is loaded first):
//! - `ASSESS_DATA_DIR`: assignment storage directory (default: `assignment_data`)
//! - `ASSESS_TEMP_ID_PREFIXES`: comma-separated temporary id prefixes
//!   (default: `new-,new_,temp-,temp_,tmp-`)
//! - `RUST_LOG`: log filter; logs go to stderr

use anyhow::Context;
use assess_core::config::{assignment_data_dir_from_env_value, temp_id_prefixes_from_env_value};
use assess_core::constants::QUESTIONS_KEY;
use assess_core::{
    AssignmentService, CoreConfig, FileAssignmentStore, QuestionGraphResolver, UuidIdGenerator,
};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "assess")]
#[command(about = "Assignment question list resolver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a question list and print the result as JSON
    Resolve {
        /// JSON file with a question array or an assignment body (`-` for stdin)
        file: PathBuf,
    },
    /// Resolve and store a new assignment
    Create {
        /// JSON file with a question array or an assignment body (`-` for stdin)
        file: PathBuf,
        /// Store under this id instead of allocating one
        #[arg(long)]
        id: Option<String>,
    },
    /// Update a stored assignment
    Update {
        /// Assignment id
        id: String,
        /// JSON file with a question array or an assignment body (`-` for stdin)
        file: PathBuf,
    },
    /// Print a stored assignment as YAML
    Show {
        /// Assignment id
        id: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("assess_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = Arc::new(core_config_from_env()?);

    run(cli.command, cfg, &mut io::stdout().lock())
}

fn core_config_from_env() -> anyhow::Result<CoreConfig> {
    let data_dir = assignment_data_dir_from_env_value(std::env::var("ASSESS_DATA_DIR").ok());
    let prefixes =
        temp_id_prefixes_from_env_value(std::env::var("ASSESS_TEMP_ID_PREFIXES").ok())?;
    Ok(CoreConfig::new(data_dir, prefixes)?)
}

fn run(command: Commands, cfg: Arc<CoreConfig>, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Resolve { file } => {
            let body = assignment_body(read_json(&file)?);
            let questions = match body {
                Value::Object(mut fields) => fields.remove(QUESTIONS_KEY).unwrap_or(Value::Null),
                other => other,
            };

            let resolver = QuestionGraphResolver::from_config(UuidIdGenerator::new(), &cfg);
            let set = resolver.resolve_value(questions)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&set)?)?;
        }
        Commands::Create { file, id } => {
            let body = assignment_body(read_json(&file)?);
            let saved = service(cfg).create(body, id.as_deref())?;
            tracing::info!("{} anomalies while resolving", saved.anomalies.len());
            writeln!(out, "{}", saved.id)?;
        }
        Commands::Update { id, file } => {
            let body = assignment_body(read_json(&file)?);
            let saved = service(cfg).update(&id, body)?;
            writeln!(out, "{}", saved.id)?;
        }
        Commands::Show { id } => {
            let record = service(cfg).get(&id)?;
            write!(out, "{}", serde_yaml::to_string(&record)?)?;
        }
    }
    Ok(())
}

fn service(cfg: Arc<CoreConfig>) -> AssignmentService<FileAssignmentStore, UuidIdGenerator> {
    AssignmentService::new(
        cfg.clone(),
        FileAssignmentStore::new(cfg),
        UuidIdGenerator::new(),
    )
}

/// A bare question array is shorthand for `{ "questions": [...] }`.
fn assignment_body(input: Value) -> Value {
    match input {
        Value::Array(questions) => {
            let mut body = Map::new();
            body.insert(QUESTIONS_KEY.to_string(), Value::Array(questions));
            Value::Object(body)
        }
        other => other,
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        text
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };

    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}
