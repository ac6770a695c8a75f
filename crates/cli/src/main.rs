#![allow(clippy::print_stdout, reason = "CLI prints results to stdout")]
#![allow(clippy::print_stderr, reason = "CLI renders progress on stderr")]
#![allow(clippy::single_call_fn, reason = "Command handlers are split for readability")]

mod commands;
mod config;
mod export;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::search::SearchArgs;
use config::AppConfig;

#[derive(Parser)]
#[command(name = "photo-search")]
#[command(about = "Search geotagged Flickr photos and fetch their images and locations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search photos by keyword
    Search {
        keyword: String,
        /// Number of result pages to load
        #[arg(short, long, default_value = "1")]
        pages: u32,
        /// Photos requested per page
        #[arg(long)]
        per_page: Option<u32>,
        /// Maximum paired fetches in flight (concurrency limit)
        #[arg(short, long)]
        concurrency: Option<usize>,
        /// Save fetched images to the default pictures directory
        #[arg(short, long)]
        export: bool,
        /// Save fetched images to this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
        /// Convert exported images to grayscale
        #[arg(short, long)]
        monochrome: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Search {
            keyword,
            pages,
            per_page,
            concurrency,
            export,
            export_dir,
            monochrome,
            json,
        } => {
            let config = config.with_overrides(per_page, concurrency);
            let args = SearchArgs { keyword, pages, export, export_dir, monochrome, json };
            commands::search::run_search(&config, args).await?;
        },
        Commands::Config => commands::config::run_config(&config)?,
    }

    Ok(())
}
