#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup and fixtures for the `sparky` integration tests. The test
//! doubles themselves live in `sparky-test-utils`.

use dotenvy::dotenv;
use sparky::types::{Message, RetrievedChunk, ScoredChunk};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// A retrieved chunk with the given text, tagged Grade1 / Science.
pub fn science_chunk(id: &str, text: &str, score: f32) -> ScoredChunk {
    ScoredChunk {
        id: id.to_string(),
        score,
        chunk: RetrievedChunk {
            text: text.to_string(),
            source: "light.pdf".to_string(),
            grade: "Grade1".to_string(),
            subject: "Science".to_string(),
        },
    }
}

/// A short tutor conversation ending with a user question.
pub fn tutor_history(question: &str) -> Vec<Message> {
    vec![
        Message::assistant("Hi Asha! I'm Sparky! 🤖 What do you want to learn about today?"),
        Message::user(question),
    ]
}
