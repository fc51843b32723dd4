//! CityPulse command-line interface.
//!
//! Commands:
//! - `ask`    - Run a weather/news/risk briefing for a city
//! - `tools`  - List the registered tools and their arguments
//! - `init`   - Write a starter config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "citypulse",
    about = "CityPulse: weather, news, and risk briefings for any city",
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
    /// Ask about a city's weather, news, and risk
    Ask {
        /// The city to ask about, e.g. "Cebu City"
        city: String,

        /// A specific question about the city instead of the standard briefing
        #[arg(short, long)]
        intent: Option<String>,

        /// Use the deterministic rule policy instead of the LLM
        #[arg(long)]
        offline: bool,

        /// Print every tool call and observation after the answer
        #[arg(long)]
        show_transcript: bool,

        /// Load configuration from this file instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the registered tools
    Tools,

    /// Initialize the configuration file
    Init,
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
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask {
            city,
            intent,
            offline,
            show_transcript,
            config,
        } => commands::ask::run(city, intent, offline, show_transcript, config).await?,
        Commands::Tools => commands::tools::run().await?,
        Commands::Init => commands::init::run().await?,
    }

    Ok(())
}
