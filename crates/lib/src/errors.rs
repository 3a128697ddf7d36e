use thiserror::Error;

/// Custom error types for the library.
#[derive(Error, Debug)]
pub enum SparkyError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to completion provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize completion provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("Completion provider returned an error: {0}")]
    AiApi(String),
    #[error("Failed to send request to embeddings API: {0}")]
    EmbeddingRequest(reqwest::Error),
    #[error("Embeddings API returned an error: {0}")]
    EmbeddingApi(String),
    #[error("Embedding has {actual} dimensions, expected {expected}")]
    EmbeddingDimension { expected: usize, actual: usize },
    #[error("Failed to send request to vector index: {0}")]
    VectorIndexRequest(reqwest::Error),
    #[error("Failed to deserialize vector index response: {0}")]
    VectorIndexDeserialization(reqwest::Error),
    #[error("Vector index returned an error: {0}")]
    VectorIndexApi(String),
    #[error("Service is not configured: {0}")]
    NotConfigured(String),
    #[error("Invalid conversation history: {0}")]
    InvalidHistory(String),
    #[error("Persona configuration error: {0}")]
    PersonaConfig(String),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}
