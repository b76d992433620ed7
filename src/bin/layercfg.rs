// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line front end: resolves configuration and prints it as JSON.

use clap::Parser;
use layercfg::adapters::{MissingDirectoryPolicy, Schema};
use layercfg::domain::{ConfigError, IntegerCoercion, Result};
use layercfg::service::LoadOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Resolve layered JSON + environment configuration and validate it.
#[derive(Debug, Parser)]
#[command(name = "layercfg", version, about)]
struct Cli {
    /// JSON Type Definition schema file
    #[arg(long)]
    schema: PathBuf,

    /// Application name, selects `<APP>__*` environment variables
    #[arg(long)]
    app_name: Option<String>,

    /// Separator between environment key segments
    #[arg(long)]
    separator: Option<String>,

    /// Directory holding the configuration files [default: ./config]
    #[arg(long)]
    target_dir: Option<PathBuf>,

    /// Override file, absolute or relative to the target directory
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// Read integers from leading digits ("5432x" becomes 5432)
    #[arg(long)]
    lenient_integers: bool,

    /// Treat a missing target directory as empty
    #[arg(long)]
    allow_missing_dir: bool,

    /// Only validate; print nothing on success
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn options(&self) -> LoadOptions {
        LoadOptions {
            app_name: self.app_name.clone(),
            separator: self.separator.clone(),
            target_dir: self.target_dir.clone(),
            config_path: self.config_path.clone(),
            integer_coercion: if self.lenient_integers {
                IntegerCoercion::Lenient
            } else {
                IntegerCoercion::Strict
            },
            missing_directory: self
                .allow_missing_dir
                .then_some(MissingDirectoryPolicy::Ignore),
        }
    }
}

fn read_schema(path: &Path) -> Result<Schema> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourceError {
        source_name: "schema".to_string(),
        message: format!("Failed to read schema file: {}", path.display()),
        source: Some(Box::new(e)),
    })?;
    content.parse()
}

fn run(cli: &Cli) -> Result<()> {
    let schema = read_schema(&cli.schema)?;
    let config = layercfg::load_config(&schema, cli.options())?;

    if !cli.check {
        let rendered =
            serde_json::to_string_pretty(&config).map_err(|e| ConfigError::SourceError {
                source_name: "output".to_string(),
                message: "Failed to render configuration".to_string(),
                source: Some(Box::new(e)),
            })?;
        println!("{}", rendered);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(ConfigError::ConfigValidationError { violations }) => {
            eprintln!("error: configuration is invalid");
            for violation in &violations {
                eprintln!("  {}", violation);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
