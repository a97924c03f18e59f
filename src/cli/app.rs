//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{build_cmd, generate_cmd};
use crate::storage::{Project, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "lambdakit")]
#[command(author, version, about = "Split a compiled serverless project into per-service Lambda bundles")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (defaults to the nearest directory with lambdakit.toml or package.json)
    #[arg(long, short = 'C', global = true, env = "LAMBDAKIT_PROJECT")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default lambdakit.toml
    Init {
        /// Project directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Build one deployment bundle per keyword, plus the triggers bundle
    Build(build_cmd::BuildArgs),

    /// Scaffold a new endpoint (controller, route, handler, template, entry)
    Generate(generate_cmd::GenerateArgs),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("lambdakit starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path.display()));
            let (project, created) = Project::init(&path)?;
            let config_path = project.root().join(CONFIG_FILE);
            if output.is_json() {
                output.data(&serde_json::json!({
                    "config": config_path,
                    "created": created,
                }));
            } else if created {
                output.success(&format!("Wrote {}", config_path.display()));
            } else {
                output.success(&format!("{} already exists, left unchanged", config_path.display()));
            }
        }

        Commands::Build(args) => build_cmd::run(args, cli.project.as_deref(), &output)?,

        Commands::Generate(args) => generate_cmd::run(args, cli.project.as_deref(), &output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
