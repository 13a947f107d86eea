// Stepflow CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: State lives in a JSON file so every invocation is a fresh process.

mod commands;
mod demo;
mod document;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use stepflow::StepFlowConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stepflow")]
#[command(about = "Stepflow CLI - Drive and inspect resumable workflows")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml", "mermaid"])]
    pub output: String,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the compiled transition table of the demo flow
    Describe,

    /// Advance a demo flow instance stored in a state file
    Run {
        /// State file (created when missing)
        #[arg(long, short, env = "STEPFLOW_STATE_FILE", default_value = "stepflow-state.json")]
        state_file: PathBuf,

        /// Keep applying until the flow completes
        #[arg(long, short)]
        follow: bool,

        /// Pause between calls when following, in milliseconds
        #[arg(long, default_value = "500")]
        interval_ms: u64,

        /// Upper bound on apply calls when following
        #[arg(long, default_value = "1000")]
        max_calls: usize,
    },

    /// Show where a stored instance is
    Status {
        /// State file
        #[arg(long, short, env = "STEPFLOW_STATE_FILE", default_value = "stepflow-state.json")]
        state_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepflow=info,stepflow_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output_format = output::OutputFormat::from_str(&cli.output);

    let config = StepFlowConfig::from_env();
    tracing::debug!(?config, "loaded configuration");
    let flow = demo::flow(config)?;

    match cli.command {
        Commands::Describe => commands::describe::run(&flow, output_format),
        Commands::Run {
            state_file,
            follow,
            interval_ms,
            max_calls,
        } => {
            commands::run::run(
                &flow,
                output_format,
                cli.quiet,
                commands::run::RunOptions {
                    state_file: &state_file,
                    follow,
                    interval: Duration::from_millis(interval_ms),
                    max_calls,
                },
            )
            .await
        }
        Commands::Status { state_file } => {
            commands::status::run(&flow, output_format, &state_file).await
        }
    }
}
