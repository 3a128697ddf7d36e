//! # Book Ingestion Pipeline
//!
//! The one-shot job that loads the book library into the vector index:
//! discover PDFs, extract each page, chunk, embed every chunk, then upsert in
//! batches and compare the index's vector count with what was sent.

use crate::{
    errors::IngestError,
    extract::extract_pages_from_pdf,
    library::{discover_books, BookFile},
};
use serde::Serialize;
use sparky::{
    ingest::{
        chunk_text_with, IngestError as ChunkingError, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
    },
    providers::{ai::EmbeddingProvider, index::VectorIndex},
    types::{IndexStats, RetrievedChunk, VectorRecord},
};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info, instrument, warn};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Options for a single ingestion run.
#[derive(Debug, Clone)]
pub struct IngestionOptions {
    pub books_dir: PathBuf,
    /// Delete every vector before loading, for a fresh start.
    pub clear_existing: bool,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

impl IngestionOptions {
    pub fn new(books_dir: impl Into<PathBuf>) -> Self {
        Self {
            books_dir: books_dir.into(),
            clear_existing: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// A book that could not be ingested, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBook {
    pub path: PathBuf,
    pub reason: String,
}

/// The outcome of an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub books_found: usize,
    pub books_ingested: usize,
    pub skipped: Vec<SkippedBook>,
    /// Vectors sent to the index.
    pub vectors_created: usize,
    pub batches: usize,
    /// The index's own count after the run.
    pub vectors_in_index: u64,
}

impl IngestionReport {
    /// True when the index holds exactly the vectors this run created.
    pub fn verified(&self) -> bool {
        self.vectors_in_index == self.vectors_created as u64
    }
}

/// Loads books into a vector index.
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl IngestionPipeline {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Runs the whole job. A book that fails is logged and skipped; a run that
    /// produces no vectors at all is an error and leaves the index untouched.
    #[instrument(skip(self, options), fields(books_dir = %options.books_dir.display(), index = self.index.name()))]
    pub async fn run(&self, options: &IngestionOptions) -> Result<IngestionReport, IngestError> {
        let books = discover_books(&options.books_dir)?;
        info!("Found {} PDF files", books.len());

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        let mut books_ingested = 0;
        for book in &books {
            info!(path = %book.path.display(), grade = %book.grade, subject = %book.subject, "Processing book");
            match self.book_records(book, options).await {
                Ok(book_records) if book_records.is_empty() => {
                    warn!(path = %book.path.display(), "Book has no extractable text, skipping");
                    skipped.push(SkippedBook {
                        path: book.path.clone(),
                        reason: "no extractable text".to_string(),
                    });
                }
                Ok(book_records) => {
                    books_ingested += 1;
                    records.extend(book_records);
                }
                Err(e) => {
                    error!(path = %book.path.display(), "Failed to process book, skipping: {e}");
                    skipped.push(SkippedBook {
                        path: book.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if records.is_empty() {
            return Err(IngestError::NoRecords(options.books_dir.clone()));
        }
        info!("Total data points to upload: {}", records.len());

        // Only clear once there is something to replace the old vectors with.
        if options.clear_existing {
            info!("Clearing the index for a fresh start");
            self.index.delete_all().await?;
        }

        let batch_size = options.batch_size.max(1);
        let mut batches = 0;
        for (i, batch) in records.chunks(batch_size).enumerate() {
            info!("Uploading batch {} ({} points)", i + 1, batch.len());
            self.index.upsert(batch).await?;
            batches += 1;
        }

        let stats = self.verify().await?;
        let report = IngestionReport {
            books_found: books.len(),
            books_ingested,
            skipped,
            vectors_created: records.len(),
            batches,
            vectors_in_index: stats.total_vector_count,
        };
        if report.verified() {
            info!(vectors = report.vectors_created, "Ingestion verified");
        } else {
            // Serverless indexes update their counts asynchronously, so this is not fatal.
            warn!(
                expected = report.vectors_created,
                actual = report.vectors_in_index,
                "Index count does not match the uploaded vectors"
            );
        }
        Ok(report)
    }

    /// Current index statistics.
    pub async fn verify(&self) -> Result<IndexStats, IngestError> {
        Ok(self.index.describe_stats().await?)
    }

    /// Extracts, chunks and embeds one book. Ids run `"{grade}/{subject}/{file_name}-{i}"`
    /// across pages, so equal file names in different folders never collide.
    async fn book_records(
        &self,
        book: &BookFile,
        options: &IngestionOptions,
    ) -> Result<Vec<VectorRecord>, IngestError> {
        let data = tokio::fs::read(&book.path)
            .await
            .map_err(|source| IngestError::Io {
                path: book.path.clone(),
                source,
            })?;
        let pages = extract_pages_from_pdf(&data).await?;

        let mut records = Vec::new();
        for page in pages {
            let chunks = match chunk_text_with(&page, options.chunk_size, options.chunk_overlap) {
                Ok(chunks) => chunks,
                Err(ChunkingError::EmptyContent) => continue,
                Err(e) => return Err(e.into()),
            };
            for text in chunks {
                let values = self.embedder.embed(&text).await?;
                records.push(VectorRecord {
                    id: format!(
                        "{}/{}/{}-{}",
                        book.grade,
                        book.subject,
                        book.file_name,
                        records.len()
                    ),
                    values,
                    chunk: RetrievedChunk {
                        text,
                        source: book.file_name.clone(),
                        grade: book.grade.clone(),
                        subject: book.subject.clone(),
                    },
                });
            }
        }
        Ok(records)
    }
}
