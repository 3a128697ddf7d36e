//! # Configuration Tests
//!
//! Tests for the layered configuration loader: YAML file, `${VAR}`
//! substitution, top-level environment overrides and `SPARKY_`-prefixed
//! nested overrides. Environment variables are process-global, so every test
//! here runs serially.

use serial_test::serial;
use sparky::providers::factory::{create_ai_provider, create_vector_index};
use sparky_server::config::{get_config, substitute_env_vars, ConfigError};
use std::{env, fs, path::PathBuf};
use tempfile::{tempdir, TempDir};

/// Clears every environment variable these tests set.
fn clear_env_vars() {
    for var in [
        "PORT",
        "BOOKS_DIR",
        "TEST_GROQ_KEY",
        "TEST_PINECONE_HOST",
        "SPARKY_COMPLETION__MODEL_NAME",
        "SPARKY_ANSWER__TOP_K",
    ] {
        env::remove_var(var);
    }
}

fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.yml");
    fs::write(&path, content).expect("Failed to write config file");
    (dir, path)
}

const FULL_CONFIG: &str = r#"
port: 8123
books_dir: "/srv/books"
completion:
  provider: "local"
  api_url: "https://api.groq.com/openai/v1/chat/completions"
  api_key: "${TEST_GROQ_KEY}"
  model_name: "llama3-70b-8192"
embedding:
  api_url: "http://localhost:8080/v1/embeddings"
vector_index:
  provider: "pinecone"
  host: "${TEST_PINECONE_HOST}"
  api_key: "pc-key"
answer:
  top_k: 4
"#;

/// Verifies that every section of a full file is read.
#[test]
#[serial]
fn test_get_config_reads_file() {
    // --- Arrange ---
    clear_env_vars();
    env::set_var("TEST_GROQ_KEY", "gsk-123");
    env::set_var("TEST_PINECONE_HOST", "educade.svc.pinecone.io");
    let (_dir, path) = write_config(FULL_CONFIG);

    // --- Act ---
    let config = get_config(path.to_str()).expect("Configuration should load successfully");

    // --- Assert ---
    assert_eq!(config.port, 8123);
    assert_eq!(config.books_dir, PathBuf::from("/srv/books"));
    assert_eq!(config.completion.api_key.as_deref(), Some("gsk-123"));
    assert_eq!(config.completion.model_name, "llama3-70b-8192");
    assert_eq!(
        config.vector_index.host.as_deref(),
        Some("educade.svc.pinecone.io")
    );
    assert_eq!(config.answer.top_k, 4);
    assert_eq!(config.answer.tutor_temperature, 0.7);
    assert_eq!(config.embedding.dimension, 384);
    assert!(config.personas_path().is_none());

    clear_env_vars();
}

/// Verifies that an unset `${VAR}` leaves an empty value, which disables the
/// section instead of failing startup.
#[test]
#[serial]
fn test_unset_placeholder_disables_section() {
    // --- Arrange ---
    clear_env_vars();
    let (_dir, path) = write_config(FULL_CONFIG);

    // --- Act ---
    let config = get_config(path.to_str()).expect("Configuration should load successfully");

    // --- Assert ---
    assert_eq!(config.vector_index.host.as_deref(), Some(""));
    assert!(create_vector_index(&config.vector_index)
        .expect("factory should not fail")
        .is_none());
    assert!(create_ai_provider(&config.completion)
        .expect("factory should not fail")
        .is_some());

    clear_env_vars();
}

/// Verifies that `PORT` and `SPARKY_` variables override the file.
#[test]
#[serial]
fn test_environment_overrides_file() {
    // --- Arrange ---
    clear_env_vars();
    env::set_var("PORT", "9999");
    env::set_var("SPARKY_COMPLETION__MODEL_NAME", "llama-3.1-8b-instant");
    env::set_var("SPARKY_ANSWER__TOP_K", "5");
    let (_dir, path) = write_config(FULL_CONFIG);

    // --- Act ---
    let config = get_config(path.to_str()).expect("Configuration should load successfully");

    // --- Assert ---
    assert_eq!(config.port, 9999);
    assert_eq!(config.completion.model_name, "llama-3.1-8b-instant");
    assert_eq!(config.answer.top_k, 5);
    assert_eq!(config.answer.story_temperature, 0.8);

    clear_env_vars();
}

/// Verifies the defaults of every section a minimal file leaves out.
#[test]
#[serial]
fn test_minimal_file_uses_defaults() {
    // --- Arrange ---
    clear_env_vars();
    let (_dir, path) = write_config("port: 9100\n");

    // --- Act ---
    let config = get_config(path.to_str()).expect("Configuration should load successfully");

    // --- Assert ---
    assert_eq!(config.port, 9100);
    assert_eq!(config.books_dir, PathBuf::from("books"));
    assert_eq!(config.completion.provider, "local");
    assert!(config.completion.api_url.is_none());
    assert_eq!(config.vector_index.provider, "pinecone");
    assert_eq!(
        config.embedding.model_name,
        "sentence-transformers/all-MiniLM-L6-v2"
    );
    assert_eq!(config.answer.top_k, 3);

    clear_env_vars();
}

/// Verifies that an explicitly requested file must exist.
#[test]
#[serial]
fn test_missing_override_path_is_not_found() {
    clear_env_vars();
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nope.yml");

    let result = get_config(path.to_str());

    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

/// Verifies placeholder substitution on its own.
#[test]
#[serial]
fn test_substitute_env_vars() {
    clear_env_vars();
    env::set_var("TEST_GROQ_KEY", "gsk-abc");

    let expanded = substitute_env_vars("key: ${TEST_GROQ_KEY}\nhost: ${TEST_PINECONE_HOST}\n")
        .expect("substitution should succeed");

    assert_eq!(expanded, "key: gsk-abc\nhost: \n");
    clear_env_vars();
}
