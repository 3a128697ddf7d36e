//! # In-Memory Vector Index
//!
//! A process-local index with exact cosine scoring. It backs local development
//! (`vector_index.provider: memory`) and tests; nothing is persisted.

use crate::{
    errors::SparkyError,
    providers::index::VectorIndex,
    types::{IndexStats, RetrievalFilter, ScoredChunk, VectorRecord},
};
use async_trait::async_trait;
use std::cmp::Ordering;
use tokio::sync::RwLock;

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[derive(Debug, Default)]
pub struct MemoryVectorIndex {
    records: RwLock<Vec<VectorRecord>>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &RetrievalFilter,
    ) -> Result<Vec<ScoredChunk>, SparkyError> {
        let records = self.records.read().await;
        let mut scored: Vec<ScoredChunk> = records
            .iter()
            .filter(|r| filter.matches(&r.chunk))
            .map(|r| ScoredChunk {
                id: r.id.clone(),
                score: cosine_similarity(vector, &r.values),
                chunk: r.chunk.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn upsert(&self, new_records: &[VectorRecord]) -> Result<usize, SparkyError> {
        let mut records = self.records.write().await;
        for record in new_records {
            match records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => records.push(record.clone()),
            }
        }
        Ok(new_records.len())
    }

    async fn delete_all(&self) -> Result<(), SparkyError> {
        self.records.write().await.clear();
        Ok(())
    }

    async fn describe_stats(&self) -> Result<IndexStats, SparkyError> {
        let records = self.records.read().await;
        Ok(IndexStats {
            dimension: records.first().map(|r| r.values.len()),
            total_vector_count: records.len() as u64,
        })
    }
}
