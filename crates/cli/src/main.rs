//! Harbor Market CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations (and create the session table)
//! hm-cli migrate
//!
//! # Load the demo catalog; existing products are left alone
//! hm-cli seed catalog
//!
//! # Load a different catalog file, wiping products, orders and reviews first
//! hm-cli seed catalog --file my-catalog.yaml --reset
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed catalog` - Insert catalog products from a YAML file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hm-cli")]
#[command(author, version, about = "Harbor Market CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert catalog products (idempotent by product name)
    Catalog {
        /// Path to the catalog YAML file
        #[arg(short, long, default_value = commands::seed::DEFAULT_CATALOG_FILE)]
        file: String,

        /// Delete all products, orders and reviews before seeding
        #[arg(long)]
        reset: bool,
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
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, reset } => {
                commands::seed::catalog(&file, reset).await?;
            }
        },
    }
    Ok(())
}
