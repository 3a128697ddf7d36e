use sparky::{ingest::IngestError as ChunkingError, SparkyError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Provider error: {0}")]
    Provider(#[from] SparkyError),
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse PDF content: {0}")]
    PdfParse(String),
    #[error("Failed to chunk text: {0}")]
    Chunking(#[from] ChunkingError),
    #[error("No data points were created from the books in '{0}'")]
    NoRecords(PathBuf),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
