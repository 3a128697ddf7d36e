//! # Hosted Provider Tests
//!
//! Runs each HTTP-backed provider against a `wiremock` server to check the wire
//! format it sends and how it reads (or rejects) the reply.

mod common;

use common::setup_tracing;
use serde_json::json;
use sparky::{
    errors::SparkyError,
    providers::{
        ai::{
            gemini::GeminiProvider, local::LocalAiProvider, AiProvider, CompletionOptions,
            EmbeddingProvider, HttpEmbeddingProvider,
        },
        factory::{create_vector_index, VectorIndexConfig},
        index::{PineconeIndex, VectorIndex},
    },
    types::{Message, RetrievalFilter, RetrievedChunk, VectorRecord},
};
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

// --- Completion providers ---

/// Verifies that the OpenAI-compatible provider sends role-tagged messages, model and
/// temperature with bearer auth, and returns the first choice's content.
#[tokio::test]
async fn test_local_provider_chat() {
    setup_tracing();
    // --- 1. Arrange ---
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer groq-key"))
        .and(body_partial_json(json!({
            "model": "llama3-70b-8192",
            "temperature": 0.5,
            "messages": [
                {"role": "system", "content": "You are Sparky."},
                {"role": "user", "content": "Why is the sky blue?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "What colour is sunlight? 🌞"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = LocalAiProvider::new(
        format!("{}/openai/v1/chat/completions", server.uri()),
        Some("groq-key".to_string()),
        Some("llama3-70b-8192".to_string()),
    )
    .unwrap();

    // --- 2. Act ---
    let reply = provider
        .generate(
            "You are Sparky.",
            "Why is the sky blue?",
            CompletionOptions::with_temperature(0.5),
        )
        .await
        .unwrap();

    // --- 3. Assert ---
    assert_eq!(reply, "What colour is sunlight? 🌞");
}

/// Verifies that an error status surfaces as an API error carrying the status and body.
#[tokio::test]
async fn test_local_provider_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let provider = LocalAiProvider::new(server.uri(), None, None).unwrap();
    let err = provider
        .chat(&[Message::user("hi")], CompletionOptions::default())
        .await
        .unwrap_err();

    match err {
        SparkyError::AiApi(message) => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid api key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// Verifies that Gemini receives the key as a query parameter, system text as the
/// system instruction, and that candidate parts are concatenated.
#[tokio::test]
async fn test_gemini_provider_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(query_param("key", "gemini-key"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "You are Sparky."}]},
            "contents": [{"role": "user", "parts": [{"text": "Tell me about frogs"}]}],
            "generationConfig": {"temperature": 0.0, "maxOutputTokens": 4}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Frogs "}, {"text": "hop!"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(
        format!("{}/v1beta/models/gemini-pro:generateContent", server.uri()),
        "gemini-key".to_string(),
    )
    .unwrap();

    let reply = provider
        .generate(
            "You are Sparky.",
            "Tell me about frogs",
            CompletionOptions::with_temperature(0.0).max_tokens(4),
        )
        .await
        .unwrap();

    assert_eq!(reply, "Frogs hop!");
}

// --- Embeddings ---

/// Verifies the embeddings request and the 384-dimension check.
#[tokio::test]
async fn test_embedding_provider_dimension() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({
            "model": "sentence-transformers/all-MiniLM-L6-v2",
            "input": "Why is the sky blue?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": vec![0.25_f32; 384]}]
        })))
        .mount(&server)
        .await;

    let url = format!("{}/v1/embeddings", server.uri());
    let model = "sentence-transformers/all-MiniLM-L6-v2".to_string();

    let provider = HttpEmbeddingProvider::new(url.clone(), model.clone(), None)
        .unwrap()
        .with_dimension(384);
    let vector = provider.embed("Why is the sky blue?").await.unwrap();
    assert_eq!(vector.len(), 384);

    let mismatched = HttpEmbeddingProvider::new(url, model, None)
        .unwrap()
        .with_dimension(768);
    let err = mismatched.embed("Why is the sky blue?").await.unwrap_err();
    assert!(matches!(
        err,
        SparkyError::EmbeddingDimension {
            expected: 768,
            actual: 384
        }
    ));
}

// --- Pinecone ---

fn pinecone(server: &MockServer) -> PineconeIndex {
    PineconeIndex::new(server.uri(), "pc-key".to_string(), None).unwrap()
}

/// Verifies the Pinecone query body and that matches map onto retrieved chunks.
#[tokio::test]
async fn test_pinecone_query() {
    // --- 1. Arrange ---
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("Api-Key", "pc-key"))
        .and(header("X-Pinecone-API-Version", "2024-07"))
        .and(body_partial_json(json!({
            "topK": 3,
            "includeMetadata": true,
            "filter": {"grade": {"$eq": "Grade1"}, "subject": {"$eq": "Science"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                {
                    "id": "Grade1/Science/light.pdf-0",
                    "score": 0.91,
                    "metadata": {
                        "text": "light scatters",
                        "source": "light.pdf",
                        "grade": "Grade1",
                        "subject": "Science"
                    }
                },
                {"id": "orphan", "score": 0.5}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // --- 2. Act ---
    let chunks = pinecone(&server)
        .query(&[0.1, 0.2], 3, &RetrievalFilter::new("Grade1", "Science"))
        .await
        .unwrap();

    // --- 3. Assert ---
    assert_eq!(chunks.len(), 1, "matches without metadata are skipped");
    assert_eq!(chunks[0].id, "Grade1/Science/light.pdf-0");
    assert_eq!(chunks[0].chunk.text, "light scatters");
    assert_eq!(chunks[0].chunk.source, "light.pdf");
}

/// Verifies upsert, delete-all and stats against their data-plane endpoints.
#[tokio::test]
async fn test_pinecone_write_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .and(body_partial_json(json!({
            "vectors": [{
                "id": "Grade1/Science/light.pdf-0",
                "values": [0.5],
                "metadata": {"text": "light scatters", "grade": "Grade1", "subject": "Science"}
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upsertedCount": 1})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vectors/delete"))
        .and(body_partial_json(json!({"deleteAll": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/describe_index_stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dimension": 384,
            "totalVectorCount": 42,
            "namespaces": {"": {"vectorCount": 42}}
        })))
        .mount(&server)
        .await;

    let index = pinecone(&server);
    let record = VectorRecord {
        id: "Grade1/Science/light.pdf-0".to_string(),
        values: vec![0.5],
        chunk: RetrievedChunk {
            text: "light scatters".to_string(),
            source: "light.pdf".to_string(),
            grade: "Grade1".to_string(),
            subject: "Science".to_string(),
        },
    };

    assert_eq!(index.upsert(&[record]).await.unwrap(), 1);
    index.delete_all().await.unwrap();
    let stats = index.describe_stats().await.unwrap();
    assert_eq!(stats.dimension, Some(384));
    assert_eq!(stats.total_vector_count, 42);
}

/// Verifies that a missing index surfaces as a vector index API error.
#[tokio::test]
async fn test_pinecone_missing_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(404).set_body_string("index not found"))
        .mount(&server)
        .await;

    let err = pinecone(&server)
        .query(&[0.1], 3, &RetrievalFilter::new("Grade1", "Science"))
        .await
        .unwrap_err();

    assert!(matches!(err, SparkyError::VectorIndexApi(ref m) if m.contains("404")));
}

// --- Factory ---

/// Verifies that the factory builds a working in-memory index from config.
#[tokio::test]
async fn test_factory_memory_index() {
    let config = VectorIndexConfig {
        provider: "memory".to_string(),
        ..Default::default()
    };
    let index = create_vector_index(&config).unwrap().unwrap();
    assert_eq!(index.name(), "Memory");
    assert_eq!(index.describe_stats().await.unwrap().total_vector_count, 0);
}
