mod cache;
mod output;
mod search;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shelfscan")]
#[command(about = "Search an online catalog for products under a price ceiling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the catalog and print matching listings
    Search(SearchArgs),
    /// Manage the persistent result cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SearchArgs {
    /// Search terms, e.g. "wireless mouse"
    query: String,
    /// Skip listings priced above this (listings without a price are kept)
    #[arg(long)]
    max_price: Option<Decimal>,
    /// Number of listings to return
    #[arg(long)]
    max_results: Option<usize>,
    /// Maximum catalog pages to fetch
    #[arg(long)]
    page_limit: Option<u32>,
    /// Restrict to a category slug, e.g. "mobile-phones"
    #[arg(long)]
    category: Option<String>,
    /// Scan a wider pool and return the cheapest listings first
    #[arg(long)]
    cheapest: bool,
    /// Bypass the result cache for this search
    #[arg(long)]
    no_cache: bool,
    /// Give up after this many seconds and print what was found so far
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum CacheCommands {
    /// Delete expired rows from the persistent cache
    Purge,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = shelfscan_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search(args) => search::run_search(&config, &args).await?,
        Commands::Cache {
            command: CacheCommands::Purge,
        } => cache::run_cache_purge(&config).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
