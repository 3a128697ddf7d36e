//! # sparky ingest
//!
//! Loads the textbook library (`<books_dir>/<grade>/<subject>/*.pdf`) into the
//! vector index, or prints the index statistics. Uses the same configuration
//! as the server.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use sparky::providers::{
    factory::{create_embedding_provider, create_vector_index},
    index::VectorIndex,
};
use sparky_pdf::{IngestionOptions, IngestionPipeline};
use sparky_server::{config::get_config, init_tracing};
use std::{path::PathBuf, sync::Arc};
use tracing::info;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the config file (defaults to ./config.yml)
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract, chunk and embed every book, then upload the vectors
    Run(RunArgs),
    /// Print the vector index statistics
    Verify,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// The library root; overrides `books_dir` from the config
    #[arg(long, env = "BOOKS_DIR")]
    books_dir: Option<PathBuf>,
    /// Append to the index instead of clearing it first
    #[arg(long)]
    keep_existing: bool,
    #[arg(long, default_value_t = sparky::ingest::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
    #[arg(long, default_value_t = sparky::ingest::DEFAULT_CHUNK_OVERLAP)]
    chunk_overlap: usize,
    #[arg(long, default_value_t = sparky_pdf::DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let config = get_config(cli.config.as_deref())?;

    let index: Arc<dyn VectorIndex> = create_vector_index(&config.vector_index)?
        .ok_or_else(|| anyhow!("The vector index is not configured; check its host and api_key"))?;

    match cli.command {
        Commands::Run(args) => {
            let embedder = create_embedding_provider(&config.embedding)?
                .ok_or_else(|| anyhow!("The embedding provider is not configured; set its api_url"))?;

            let mut options =
                IngestionOptions::new(args.books_dir.unwrap_or_else(|| config.books_dir.clone()));
            options.clear_existing = !args.keep_existing;
            options.chunk_size = args.chunk_size;
            options.chunk_overlap = args.chunk_overlap;
            options.batch_size = args.batch_size;
            info!(?options, "Starting ingestion");

            let report = IngestionPipeline::new(embedder, index).run(&options).await?;
            for skipped in &report.skipped {
                println!("Skipped {}: {}", skipped.path.display(), skipped.reason);
            }
            println!(
                "Ingested {}/{} books: {} vectors in {} batches; index now holds {}.",
                report.books_ingested,
                report.books_found,
                report.vectors_created,
                report.batches,
                report.vectors_in_index
            );
            if options.clear_existing && !report.verified() {
                println!(
                    "Warning: the index reports {} vectors but {} were uploaded; it may still be catching up. Run `ingest verify` again shortly.",
                    report.vectors_in_index, report.vectors_created
                );
            }
        }
        Commands::Verify => {
            let stats = index.describe_stats().await?;
            println!(
                "{} index: {} vectors (dimension {})",
                index.name(),
                stats.total_vector_count,
                stats
                    .dimension
                    .map_or_else(|| "unknown".to_string(), |d| d.to_string())
            );
        }
    }
    Ok(())
}
