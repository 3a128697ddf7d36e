//! # Pinecone Vector Index
//!
//! A thin client for the Pinecone data-plane REST API. Chunk fields are stored as
//! flat metadata (`text`, `source`, `grade`, `subject`) so the `grade`/`subject`
//! equality filters can run server-side.

use crate::{
    errors::SparkyError,
    providers::index::VectorIndex,
    types::{IndexStats, RetrievalFilter, RetrievedChunk, ScoredChunk, VectorRecord},
};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

const API_VERSION: &str = "2024-07";

// --- Request and response structures ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    filter: Value,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize, Debug)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize, Debug)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<ChunkMetadata>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct ChunkMetadata {
    #[serde(default)]
    text: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    grade: String,
    #[serde(default)]
    subject: String,
}

impl From<ChunkMetadata> for RetrievedChunk {
    fn from(m: ChunkMetadata) -> Self {
        RetrievedChunk {
            text: m.text,
            source: m.source,
            grade: m.grade,
            subject: m.subject,
        }
    }
}

impl From<&RetrievedChunk> for ChunkMetadata {
    fn from(c: &RetrievedChunk) -> Self {
        ChunkMetadata {
            text: c.text.clone(),
            source: c.source.clone(),
            grade: c.grade.clone(),
            subject: c.subject.clone(),
        }
    }
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: ChunkMetadata,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    total_vector_count: u64,
}

/// Builds the metadata filter `{grade: {$eq: ..}, subject: {$eq: ..}}`.
fn equality_filter(filter: &RetrievalFilter) -> Value {
    json!({
        "grade": { "$eq": filter.grade },
        "subject": { "$eq": filter.subject },
    })
}

// --- Pinecone Index implementation ---

/// A client bound to one Pinecone index host.
#[derive(Clone, Debug)]
pub struct PineconeIndex {
    client: ReqwestClient,
    host: String,
    api_key: String,
    namespace: Option<String>,
}

impl PineconeIndex {
    /// Creates a client for the index served at `host`
    /// (e.g. `https://educade-prod-db-abc123.svc.us-east-1.pinecone.io`).
    pub fn new(
        host: String,
        api_key: String,
        namespace: Option<String>,
    ) -> Result<Self, SparkyError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(SparkyError::ReqwestClientBuild)?;
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("https://{host}")
        };
        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key,
            namespace: namespace.filter(|n| !n.is_empty()),
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{path}", self.host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SparkyError> {
        let response = request
            .send()
            .await
            .map_err(SparkyError::VectorIndexRequest)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SparkyError::VectorIndexApi(format!("{status}: {error_text}")));
        }

        response
            .json()
            .await
            .map_err(SparkyError::VectorIndexDeserialization)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        "Pinecone"
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &RetrievalFilter,
    ) -> Result<Vec<ScoredChunk>, SparkyError> {
        let body = QueryRequest {
            vector,
            top_k,
            filter: equality_filter(filter),
            include_metadata: true,
            namespace: self.namespace.as_deref(),
        };
        debug!(top_k, grade = %filter.grade, subject = %filter.subject, "--> Pinecone query");

        let response: QueryResponse = self.send(self.post("/query").json(&body)).await?;

        let chunks = response
            .matches
            .into_iter()
            .filter_map(|m| match m.metadata {
                Some(metadata) => Some(ScoredChunk {
                    id: m.id,
                    score: m.score,
                    chunk: metadata.into(),
                }),
                None => {
                    warn!(id = %m.id, "Pinecone match has no metadata, skipping");
                    None
                }
            })
            .collect::<Vec<_>>();
        debug!("<-- Pinecone returned {} matches", chunks.len());
        Ok(chunks)
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, SparkyError> {
        if records.is_empty() {
            return Ok(0);
        }
        let body = UpsertRequest {
            vectors: records
                .iter()
                .map(|r| UpsertVector {
                    id: &r.id,
                    values: &r.values,
                    metadata: (&r.chunk).into(),
                })
                .collect(),
            namespace: self.namespace.as_deref(),
        };
        let response: UpsertResponse = self.send(self.post("/vectors/upsert").json(&body)).await?;
        Ok(response.upserted_count)
    }

    async fn delete_all(&self) -> Result<(), SparkyError> {
        let mut body = json!({ "deleteAll": true });
        if let Some(ns) = &self.namespace {
            body["namespace"] = json!(ns);
        }
        let _: Value = self.send(self.post("/vectors/delete").json(&body)).await?;
        info!(host = %self.host, "Cleared Pinecone index");
        Ok(())
    }

    async fn describe_stats(&self) -> Result<IndexStats, SparkyError> {
        let response: StatsResponse = self
            .send(self.post("/describe_index_stats").json(&json!({})))
            .await?;
        Ok(IndexStats {
            dimension: response.dimension,
            total_vector_count: response.total_vector_count,
        })
    }
}
