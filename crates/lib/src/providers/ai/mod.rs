pub mod embedding;
pub mod gemini;
pub mod local;

use crate::{errors::SparkyError, types::Message};
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{EmbeddingProvider, HttpEmbeddingProvider};
use std::fmt::Debug;

/// Sampling options for a single completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            max_tokens: None,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self::with_temperature(0.7)
    }
}

/// A trait for interacting with a hosted chat-completion model.
///
/// The model identifier is part of the provider's configuration, so callers only
/// decide the conversation and the sampling options.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Sends an ordered list of role-tagged messages and returns the generated text.
    async fn chat(
        &self,
        messages: &[Message],
        options: CompletionOptions,
    ) -> Result<String, SparkyError>;

    /// Convenience wrapper for a single system + user exchange.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, SparkyError> {
        let messages = [Message::system(system_prompt), Message::user(user_prompt)];
        self.chat(&messages, options).await
    }
}

dyn_clone::clone_trait_object!(AiProvider);
