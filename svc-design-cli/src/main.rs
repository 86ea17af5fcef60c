//! svc-design: render declarative service designs into handler source.
//!
//! # Usage
//!
//! ```bash
//! # Generate handler source from a design script
//! svc-design generate --file demos/http_service.dsl
//!
//! # Same design, YAML front-end
//! svc-design generate --file demos/http_service.yaml
//!
//! # Dump the parsed statement list as JSON
//! echo '(service.open :name "s") (service.close)' | svc-design parse
//!
//! # Execute and print the resolved description as JSON
//! svc-design describe --file demos/http_service.dsl
//! ```

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod execute;
mod script;
mod yaml;

use script::Statement;

#[derive(Parser)]
#[command(name = "svc-design")]
#[command(version = "0.1.0")]
#[command(about = "Render declarative service designs into handler source")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a design script and print the generated handler source
    Generate {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Treat the input as a YAML document (implied by .yaml/.yml)
        #[arg(long)]
        yaml: bool,
    },

    /// Parse a design script and print its statement list as JSON
    Parse {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Treat the input as a YAML document (implied by .yaml/.yml)
        #[arg(long)]
        yaml: bool,
    },

    /// Execute a design script and print the resolved description as JSON
    Describe {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Treat the input as a YAML document (implied by .yaml/.yml)
        #[arg(long)]
        yaml: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate { file, yaml } => {
            let statements = load_statements(file.as_deref(), yaml)?;
            let outputs = execute::generate(&statements)?;
            for rendered in &outputs {
                println!("{}", rendered.source());
            }
            Ok(())
        }
        Commands::Parse { file, yaml } => {
            let statements = load_statements(file.as_deref(), yaml)?;
            println!("{}", serde_json::to_string_pretty(&statements)?);
            Ok(())
        }
        Commands::Describe { file, yaml } => {
            let statements = load_statements(file.as_deref(), yaml)?;
            let specs = execute::describe(&statements)?;
            println!("{}", serde_json::to_string_pretty(&specs)?);
            Ok(())
        }
    }
}

fn load_statements(file: Option<&Path>, force_yaml: bool) -> anyhow::Result<Vec<Statement>> {
    let input = read_input(file)?;
    if force_yaml || file.is_some_and(has_yaml_extension) {
        yaml::parse_service_yaml(&input).context("invalid YAML service document")
    } else {
        script::parse_script(&input).map_err(|e| anyhow!("parse error:\n{}", e))
    }
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn has_yaml_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
