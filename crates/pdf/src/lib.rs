//! # sparky-pdf: Book Library and Ingestion
//!
//! Reads the `books/<grade>/<subject>/*.pdf` library that feeds Sparky's vector
//! index. The same directory tree drives the grade and subject pickers, so the
//! catalog helpers live here too.

pub mod errors;
pub mod extract;
pub mod library;
pub mod pipeline;

pub use errors::IngestError;
pub use extract::{extract_pages_from_pdf, extract_text_from_pdf};
pub use library::{discover_books, list_grades, list_subjects, BookFile};
pub use pipeline::{
    IngestionOptions, IngestionPipeline, IngestionReport, SkippedBook, DEFAULT_BATCH_SIZE,
};
