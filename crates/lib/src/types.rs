//! # Core Data Model
//!
//! The conversation, retrieval and answer types shared by the orchestrator,
//! the providers and the HTTP layer.

use crate::errors::SparkyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged turn of a conversation.
///
/// Incoming payloads may carry extra fields (rendered images, offered choices);
/// they are dropped on deserialization so only `role` and `content` reach a
/// completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Selects which branch of the orchestrator answers a request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    /// Retrieval-grounded guided discovery.
    #[default]
    #[serde(alias = "Tutor Mode")]
    Tutor,
    /// Branching storytelling with `[CHOICE: ...]` markers.
    #[serde(alias = "Story Mode")]
    Story,
}

/// Exact-match predicate applied to indexed chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalFilter {
    pub grade: String,
    pub subject: String,
}

impl RetrievalFilter {
    pub fn new(grade: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            grade: grade.into(),
            subject: subject.into(),
        }
    }

    /// Returns true when the chunk's grade and subject match exactly (case-sensitive).
    pub fn matches(&self, chunk: &RetrievedChunk) -> bool {
        chunk.grade == self.grade && chunk.subject == self.subject
    }
}

/// A span of book text stored alongside its embedding at ingestion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub source: String,
    pub grade: String,
    pub subject: String,
}

/// A chunk returned by a similarity query, with its index id and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub id: String,
    pub score: f32,
    pub chunk: RetrievedChunk,
}

/// A vector ready to be written to an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub chunk: RetrievedChunk,
}

/// Summary statistics reported by a vector index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub dimension: Option<usize>,
    pub total_vector_count: u64,
}

fn default_language() -> String {
    "en".to_string()
}

/// The input of one orchestration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// The conversation so far; the last entry is the new user message.
    pub messages: Vec<Message>,
    pub grade: String,
    pub subject: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub child_name: String,
    #[serde(default)]
    pub mode: AppMode,
}

impl AnswerRequest {
    /// Checks that the history is non-empty and ends with a user message.
    pub fn validate(&self) -> Result<(), SparkyError> {
        match self.messages.last() {
            None => Err(SparkyError::InvalidHistory(
                "conversation history is empty".to_string(),
            )),
            Some(last) if last.role != Role::User => Err(SparkyError::InvalidHistory(format!(
                "the last message must come from the user, found '{}'",
                last.role
            ))),
            Some(_) => Ok(()),
        }
    }

    /// The newest user message, if the history ends with one.
    pub fn latest_user_message(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    pub fn filter(&self) -> RetrievalFilter {
        RetrievalFilter::new(self.grade.clone(), self.subject.clone())
    }
}

/// The output of one orchestration call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub image_url: Option<String>,
    pub choices: Option<Vec<String>>,
    /// A non-fatal notice for the operator when the answer is a fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl AnswerResult {
    pub fn text(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            ..Default::default()
        }
    }
}
