//! # Provider Factory
//!
//! Builds provider clients from plain configuration structs. A section whose
//! credentials are missing (often an unset `${VAR}` substituted to an empty
//! string) produces `None` rather than an error: the orchestrator then answers
//! with its fixed "not configured" message instead of the process refusing to start.

use crate::{
    errors::SparkyError,
    providers::{
        ai::{
            embedding::DEFAULT_EMBEDDING_DIMENSION, gemini::GeminiProvider, local::LocalAiProvider,
            AiProvider, EmbeddingProvider, HttpEmbeddingProvider,
        },
        index::{MemoryVectorIndex, PineconeIndex, VectorIndex},
    },
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration for the chat-completion provider.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider ("local" for any OpenAI-compatible API, or "gemini").
    #[serde(default = "default_completion_provider")]
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_completion_model")]
    pub model_name: String,
}

fn default_completion_provider() -> String {
    "local".to_string()
}

fn default_completion_model() -> String {
    "llama3-70b-8192".to_string()
}

/// Configuration for the embedding model provider.
#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub model_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_embedding_dimension() -> usize {
    DEFAULT_EMBEDDING_DIMENSION
}

/// Configuration for the vector index holding the book chunks.
#[derive(Debug, Deserialize, Clone)]
pub struct VectorIndexConfig {
    /// "pinecone" or "memory".
    #[serde(default = "default_index_provider")]
    pub provider: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
}

fn default_index_provider() -> String {
    "pinecone".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: default_completion_provider(),
            api_url: None,
            api_key: None,
            model_name: default_completion_model(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            model_name: default_embedding_model(),
            api_key: None,
            dimension: default_embedding_dimension(),
        }
    }
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            provider: default_index_provider(),
            host: None,
            api_key: None,
            namespace: None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Creates the completion provider, or `None` when its credentials are absent.
pub fn create_ai_provider(
    config: &ProviderConfig,
) -> Result<Option<Arc<dyn AiProvider>>, SparkyError> {
    let provider: Arc<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let Some(api_key) = non_empty(&config.api_key) else {
                warn!("No api_key for the gemini completion provider; answers will be disabled.");
                return Ok(None);
            };
            let api_url = non_empty(&config.api_url)
                .unwrap_or_else(|| GeminiProvider::default_url(&config.model_name));
            info!("Configuring Gemini completion provider with URL: {}", api_url);
            Arc::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            let Some(api_url) = non_empty(&config.api_url) else {
                warn!("No api_url for the completion provider; answers will be disabled.");
                return Ok(None);
            };
            info!(
                "Configuring OpenAI-compatible completion provider with URL: {}",
                api_url
            );
            Arc::new(LocalAiProvider::new(
                api_url,
                non_empty(&config.api_key),
                Some(config.model_name.clone()),
            )?)
        }
        other => {
            return Err(SparkyError::NotConfigured(format!(
                "unsupported completion provider type '{other}'"
            )))
        }
    };
    Ok(Some(provider))
}

/// Creates the embedding provider, or `None` when no API URL is configured.
pub fn create_embedding_provider(
    config: &EmbeddingConfig,
) -> Result<Option<Arc<dyn EmbeddingProvider>>, SparkyError> {
    let Some(api_url) = non_empty(&config.api_url) else {
        warn!("No api_url for the embedding provider; retrieval will be disabled.");
        return Ok(None);
    };
    info!(
        model = %config.model_name,
        dimension = config.dimension,
        "Configuring embedding provider with URL: {}",
        api_url
    );
    let provider = HttpEmbeddingProvider::new(
        api_url,
        config.model_name.clone(),
        non_empty(&config.api_key),
    )?
    .with_dimension(config.dimension);
    Ok(Some(Arc::new(provider)))
}

/// Creates the vector index client, or `None` when its credentials are absent.
pub fn create_vector_index(
    config: &VectorIndexConfig,
) -> Result<Option<Arc<dyn VectorIndex>>, SparkyError> {
    match config.provider.as_str() {
        "pinecone" => {
            let (Some(host), Some(api_key)) = (non_empty(&config.host), non_empty(&config.api_key))
            else {
                warn!("Pinecone host or api_key missing; retrieval will be disabled.");
                return Ok(None);
            };
            info!("Configuring Pinecone index at {}", host);
            Ok(Some(Arc::new(PineconeIndex::new(
                host,
                api_key,
                non_empty(&config.namespace),
            )?)))
        }
        "memory" => {
            info!("Using an in-memory vector index; it starts empty.");
            Ok(Some(Arc::new(MemoryVectorIndex::new())))
        }
        other => Err(SparkyError::NotConfigured(format!(
            "unsupported vector index type '{other}'"
        ))),
    }
}
