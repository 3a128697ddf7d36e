pub mod memory;
pub mod pinecone;

use crate::{
    errors::SparkyError,
    types::{IndexStats, RetrievalFilter, ScoredChunk, VectorRecord},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub use memory::MemoryVectorIndex;
pub use pinecone::PineconeIndex;

/// A trait for a store of (vector, chunk) pairs with filtered nearest-neighbour search.
///
/// The orchestrator only ever reads through `query`; the write methods exist for
/// the ingestion job.
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Returns a short name for logs (e.g. "Pinecone").
    fn name(&self) -> &str;

    /// Returns up to `top_k` entries nearest to `vector` whose grade and subject
    /// equal the filter's values, best match first.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &RetrievalFilter,
    ) -> Result<Vec<ScoredChunk>, SparkyError>;

    /// Inserts or replaces records by id. Returns the number written.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, SparkyError>;

    /// Removes every record.
    async fn delete_all(&self) -> Result<(), SparkyError>;

    async fn describe_stats(&self) -> Result<IndexStats, SparkyError>;
}
