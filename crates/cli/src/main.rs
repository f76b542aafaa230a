//! agentdir CLI: the main entry point.
//!
//! Commands:
//! - `run`   : Organize a directory according to a task
//! - `tools` : Show the tools the agent can use
//! - `init`  : Write a starter config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "agentdir",
    about = "agentdir: an LLM agent that organizes a directory for you",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent once against a working directory
    Run {
        /// Working directory (created if missing)
        #[arg(short, long)]
        dir: PathBuf,

        /// What the agent should do
        #[arg(short, long, default_value = commands::run::DEFAULT_TASK)]
        task: String,

        /// Override the configured iteration limit
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Print the Thought/Action/Observation trace
        #[arg(long)]
        show_trace: bool,
    },

    /// List the available tools and their parameters
    Tools {
        /// Print the raw JSON schemas instead
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            dir,
            task,
            max_iterations,
            show_trace,
        } => {
            let succeeded = commands::run::run(commands::run::RunArgs {
                dir,
                task,
                max_iterations,
                show_trace,
            })
            .await?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Commands::Tools { json } => commands::tools::run(json)?,
        Commands::Init { force } => commands::init::run(force)?,
    }

    Ok(())
}
