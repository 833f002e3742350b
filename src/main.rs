use clap::{Parser, Subcommand};
use std::error::Error;

use bundler_ledger::utils::logging;

mod commands;

/// Bundler ledger maintenance CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Number of migrations to run (all if not specified)
        #[arg(short, long)]
        steps: Option<u32>,
    },
    /// Print order totals per settlement status
    Status,
    /// Compute and persist the rollup for one day
    Rollup {
        /// Day in YYYYMMDD form
        #[arg(short, long)]
        date: String,
    },
    /// Expire unpaid orders past their payment deadline
    Expire,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables before the filter reads RUST_LOG
    dotenv::dotenv().ok();
    logging::init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate { steps } => {
            commands::migrate::execute(steps).await?;
        }
        Commands::Status => {
            commands::report::status().await?;
        }
        Commands::Rollup { date } => {
            commands::report::rollup(&date).await?;
        }
        Commands::Expire => {
            commands::expire::execute().await?;
        }
    }

    Ok(())
}
