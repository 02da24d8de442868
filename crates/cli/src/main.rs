//! Order Sync CLI - Database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! osync migrate
//!
//! # List applied and pending migrations
//! osync migrate --status
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "osync")]
#[command(author, version, about = "Order Sync CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Only report which migrations are applied
        #[arg(long)]
        status: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { status: true } => commands::migrate::status().await?,
        Commands::Migrate { status: false } => commands::migrate::run().await?,
    }
    Ok(())
}
