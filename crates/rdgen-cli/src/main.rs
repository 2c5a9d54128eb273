//! `rdgen`: generate Rust sources from a JSON schema model, or print the
//! structural fingerprints two endpoints are expected to agree on.

use clap::{Parser, Subcommand};
use rdgen::{ConfigError, FlowTransform, GenError, Generator, GeneratorConfig};
use rdgen_schema::{fingerprint::serialization_hash, node::Schema};
use std::{
    error::Error as _,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};
use thiserror::Error as ThisError;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "RDGEN_LOG";

///
/// CliError
///

#[derive(Debug, ThisError)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generate(#[from] GenError),

    #[error("no output directory: pass --out or set output_dir in the config")]
    MissingOutputDir,

    #[error("model '{path}' is not a valid schema document")]
    ParseModel {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read model '{path}'")]
    ReadModel {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Schema(#[from] rdgen_schema::Error),
}

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "rdgen", version, about = "Generate Rust bindings for an rd protocol schema")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write one module per toplevel plus the aggregate mod.rs
    Generate {
        /// Schema model as JSON
        #[arg(long)]
        model: PathBuf,

        /// Generator config (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory; overrides `output_dir` from the config
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Generate the other side of the protocol
        #[arg(long)]
        reversed: bool,
    },

    /// Print the fingerprint of every toplevel
    Hash {
        /// Schema model as JSON
        #[arg(long)]
        model: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }

            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Generate {
            model,
            config,
            out,
            reversed,
        } => {
            let schema = load_model(&model)?;
            let written = generate(&schema, config.as_deref(), out, reversed)?;
            tracing::info!(files = written.len(), "generation finished");
        }
        Command::Hash { model } => {
            let schema = load_model(&model)?;
            for line in hash_lines(&schema) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<Schema, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::ReadModel {
        path: path.to_path_buf(),
        source,
    })?;
    let schema: Schema = serde_json::from_str(&text).map_err(|source| CliError::ParseModel {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(schema.validated()?)
}

fn generate(
    schema: &Schema,
    config: Option<&Path>,
    out: Option<PathBuf>,
    reversed: bool,
) -> Result<Vec<PathBuf>, CliError> {
    let mut config = match config {
        Some(path) => GeneratorConfig::from_path(path)?,
        None => GeneratorConfig::default(),
    };
    if reversed {
        config = config.with_flow_transform(FlowTransform::Reversed);
    }
    let out = out
        .or_else(|| config.output_dir.clone())
        .ok_or(CliError::MissingOutputDir)?;

    Ok(Generator::new(schema, config).write_output(&out)?)
}

// hash_lines
// `<toplevel> <fingerprint>`, in generation order
fn hash_lines(schema: &Schema) -> Vec<String> {
    schema
        .toplevels()
        .into_iter()
        .map(|toplevel| format!("{} {}", toplevel.name, serialization_hash(schema, toplevel)))
        .collect()
}

///
/// TESTS
///
