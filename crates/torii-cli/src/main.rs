//! torii CLI - MCP server runtime.

use clap::{Parser, Subcommand};

mod commands;
mod toolbox;

/// torii - MCP server runtime over SSE or stdio.
#[derive(Debug, Parser)]
#[command(name = "torii", version, about)]
struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format: plain (default) or json (for log aggregation).
    #[arg(long, global = true, default_value = "plain", value_parser = ["plain", "json"])]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the MCP server over SSE or stdio.
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = torii_config::load_config(cli.config.as_deref())?;

    // Logging always goes to stderr: stdout belongs to the frame
    // writer when serving over stdio.
    let filter = match cli.verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    match cli.log_format.as_str() {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .with_target(true)
            .init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    };

    tracing::debug!(config = ?cli.config, "torii starting");

    match &cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
    }
}
