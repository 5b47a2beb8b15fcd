mod cli;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hippocampus::config::HippoConfig;
use hippocampus::memory::{EngramInput, EngramType, RecallMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hippocampus",
    version,
    about = "Per-role associative memory MCP server for AI agents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server
    Serve {
        /// Transport to use: stdio or http (overrides config)
        #[arg(long)]
        transport: Option<String>,
    },
    /// Store one engram for a role
    Remember {
        role: String,
        content: String,
        /// Keywords or indented mind-map outline of the content
        #[arg(long)]
        schema: Option<String>,
        /// Retrieval priority 0.0-1.0 (default 0.8)
        #[arg(long)]
        strength: Option<f64>,
        /// ATOMIC, LINK or PATTERN
        #[arg(long = "type", default_value_t = EngramType::Atomic.to_string())]
        engram_type: String,
        /// Stable ID; reusing one replaces the engram
        #[arg(long)]
        id: Option<String>,
    },
    /// Recall a role's engrams; omit the query for a DMN overview
    Recall {
        role: String,
        /// Space-separated keywords (quote multiple words)
        query: Option<String>,
        /// creative, balanced or focused
        #[arg(long)]
        mode: Option<RecallMode>,
    },
    /// Show memory statistics for a role
    Stats { role: String },
    /// List roles that have memories
    Roles,
    /// Export a role's engrams as JSON to stdout
    Export { role: String },
    /// Import engrams from an export file into a role
    Import { role: String, file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let mut config = HippoConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { transport } => {
            if let Some(transport) = transport {
                config.server.transport = transport;
            }
            server::serve(config).await?;
        }
        Command::Remember {
            role,
            content,
            schema,
            strength,
            engram_type,
            id,
        } => {
            let input = EngramInput {
                id,
                content,
                schema,
                strength,
                engram_type,
            };
            cli::remember::remember(&config, &role, input)?;
        }
        Command::Recall { role, query, mode } => {
            cli::recall::recall(&config, &role, query.as_deref(), mode)?;
        }
        Command::Stats { role } => cli::stats::stats(&config, &role)?,
        Command::Roles => cli::roles::roles(&config)?,
        Command::Export { role } => cli::export::export(&config, &role)?,
        Command::Import { role, file } => cli::import::import(&config, &role, &file)?,
    }

    Ok(())
}
