//! # Ingestion Helpers
//!
//! Source-independent pieces of the book ingestion job. Reading the book
//! library itself lives in the `sparky-pdf` crate.

pub mod text;

pub use text::{chunk_text, chunk_text_with, IngestError, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
