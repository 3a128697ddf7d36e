//! # Answer Orchestrator
//!
//! The one integration flow of the tutor. For each call it:
//! 1.  **Story mode**: sends a storyteller system prompt plus the conversation
//!     (minus its scripted opening) to the completion provider.
//! 2.  **Tutor mode**: embeds the newest user message, fetches the `top_k`
//!     nearest book chunks for the exact grade and subject, and wraps the
//!     conversation between the language's persona prompt and a context message.
//! 3.  Strips an optional `[CHOICE: ...]` marker from the reply.
//!
//! `get_answer` never fails: missing clients and runtime errors both degrade to
//! fixed, child-safe answers so the conversation can simply continue.

use crate::{
    choices::parse_reply,
    errors::SparkyError,
    persona::PersonaTable,
    prompts::tasks::{
        CONTEXT_INJECTION_PROMPT, NOT_CONFIGURED_ANSWER, NO_CONTEXT_FALLBACK, STORY_SYSTEM_PROMPT,
        TROUBLE_NOTICE, TROUBLE_THINKING_ANSWER,
    },
    providers::{
        ai::{AiProvider, CompletionOptions, EmbeddingProvider},
        index::VectorIndex,
    },
    types::{AnswerRequest, AnswerResult, AppMode, Message, RetrievalFilter, ScoredChunk},
};
use serde::Deserialize;
use std::{fmt, sync::Arc};
use tracing::{debug, error, info, instrument, warn};

/// Tunables of the answer flow.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AnswerSettings {
    /// How many book chunks to retrieve per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_tutor_temperature")]
    pub tutor_temperature: f32,
    #[serde(default = "default_story_temperature")]
    pub story_temperature: f32,
}

fn default_top_k() -> usize {
    3
}

fn default_tutor_temperature() -> f32 {
    0.7
}

fn default_story_temperature() -> f32 {
    0.8
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            tutor_temperature: default_tutor_temperature(),
            story_temperature: default_story_temperature(),
        }
    }
}

// --- Prompt assembly ---

/// Joins retrieved chunk texts with newlines, or returns the fixed fallback
/// sentence when nothing usable was retrieved. Never returns an empty string.
pub fn assemble_context(chunks: &[ScoredChunk]) -> String {
    let texts: Vec<&str> = chunks
        .iter()
        .map(|c| c.chunk.text.as_str())
        .filter(|t| !t.trim().is_empty())
        .collect();
    if texts.is_empty() {
        NO_CONTEXT_FALLBACK.to_string()
    } else {
        texts.join("\n")
    }
}

/// `[system: persona, ...history, system: context instruction]`
pub fn build_tutor_messages(
    persona_prompt: &str,
    history: &[Message],
    context: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(persona_prompt));
    messages.extend(history.iter().cloned());
    messages.push(Message::system(
        CONTEXT_INJECTION_PROMPT.replace("{context}", context),
    ));
    messages
}

/// The storyteller prompt for a child, grade and subject.
pub fn story_system_prompt(child_name: &str, grade: &str, subject: &str) -> String {
    STORY_SYSTEM_PROMPT
        .replace("{child_name}", child_name)
        .replace("{subject}", subject)
        .replace("{grade}", grade)
}

/// `[system: story prompt, ...history[1..]]`
///
/// The first history entry is the scripted opening line and is not replayed.
pub fn build_story_messages(story_prompt: &str, history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len());
    messages.push(Message::system(story_prompt));
    messages.extend(history.iter().skip(1).cloned());
    messages
}

// --- Orchestrator ---

/// Holds the external clients and static configuration of the answer flow.
///
/// Constructed once at process start and shared by reference; it has no
/// per-call mutable state.
pub struct Orchestrator {
    ai_provider: Option<Arc<dyn AiProvider>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    personas: Arc<PersonaTable>,
    settings: AnswerSettings,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("ai_provider", &self.ai_provider.is_some())
            .field("embedder", &self.embedder.is_some())
            .field("index", &self.index.as_ref().map(|i| i.name().to_string()))
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// A builder for creating `Orchestrator` instances.
///
/// Every client is optional; an orchestrator missing any of them answers with
/// the "not configured" message.
#[derive(Default)]
pub struct OrchestratorBuilder {
    ai_provider: Option<Arc<dyn AiProvider>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    personas: Option<PersonaTable>,
    settings: AnswerSettings,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ai_provider(mut self, provider: Option<Arc<dyn AiProvider>>) -> Self {
        self.ai_provider = provider;
        self
    }

    pub fn embedder(mut self, embedder: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn vector_index(mut self, index: Option<Arc<dyn VectorIndex>>) -> Self {
        self.index = index;
        self
    }

    pub fn personas(mut self, personas: PersonaTable) -> Self {
        self.personas = Some(personas);
        self
    }

    pub fn settings(mut self, settings: AnswerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the `Orchestrator`, falling back to the embedded persona table.
    pub fn build(self) -> Result<Orchestrator, SparkyError> {
        let personas = match self.personas {
            Some(p) => p,
            None => PersonaTable::embedded()?,
        };
        Ok(Orchestrator {
            ai_provider: self.ai_provider,
            embedder: self.embedder,
            index: self.index,
            personas: Arc::new(personas),
            settings: self.settings,
        })
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn personas(&self) -> &PersonaTable {
        &self.personas
    }

    pub fn settings(&self) -> &AnswerSettings {
        &self.settings
    }

    /// The completion provider, shared with the readability helpers.
    pub fn ai_provider(&self) -> Option<&dyn AiProvider> {
        self.ai_provider.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.ai_provider.is_some() && self.embedder.is_some() && self.index.is_some()
    }

    /// Answers the newest message of a conversation.
    ///
    /// Never returns an error: an unconfigured orchestrator yields the fixed
    /// "not configured" answer without any network call, and any failure during
    /// retrieval or completion yields the "having trouble thinking" answer with a
    /// `notice` describing the cause. No retry is attempted.
    #[instrument(skip(self, request), fields(mode = ?request.mode, grade = %request.grade, subject = %request.subject, language = %request.language))]
    pub async fn get_answer(&self, request: &AnswerRequest) -> AnswerResult {
        let (Some(ai_provider), Some(embedder), Some(index)) = (
            self.ai_provider.as_deref(),
            self.embedder.as_deref(),
            self.index.as_deref(),
        ) else {
            warn!(orchestrator = ?self, "Answer requested but the orchestrator is not configured");
            return AnswerResult::text(NOT_CONFIGURED_ANSWER);
        };

        match self.answer_with(ai_provider, embedder, index, request).await {
            Ok(result) => result,
            Err(e) => {
                error!("Failed to answer: {e:?}");
                AnswerResult {
                    answer: TROUBLE_THINKING_ANSWER.to_string(),
                    notice: Some(TROUBLE_NOTICE.replace("{error}", &e.to_string())),
                    ..Default::default()
                }
            }
        }
    }

    async fn answer_with(
        &self,
        ai_provider: &dyn AiProvider,
        embedder: &dyn EmbeddingProvider,
        index: &dyn VectorIndex,
        request: &AnswerRequest,
    ) -> Result<AnswerResult, SparkyError> {
        request.validate()?;

        let reply = match request.mode {
            AppMode::Story => {
                let prompt =
                    story_system_prompt(&request.child_name, &request.grade, &request.subject);
                let messages = build_story_messages(&prompt, &request.messages);
                ai_provider
                    .chat(
                        &messages,
                        CompletionOptions::with_temperature(self.settings.story_temperature),
                    )
                    .await?
            }
            AppMode::Tutor => {
                let question = request.latest_user_message().unwrap_or_default();
                let context = retrieve_context(
                    embedder,
                    index,
                    question,
                    &request.filter(),
                    self.settings.top_k,
                )
                .await?;
                let persona = self
                    .personas
                    .render_system_prompt(&request.language, &request.child_name);
                let messages = build_tutor_messages(&persona, &request.messages, &context);
                ai_provider
                    .chat(
                        &messages,
                        CompletionOptions::with_temperature(self.settings.tutor_temperature),
                    )
                    .await?
            }
        };

        let parsed = parse_reply(&reply)?;
        info!(
            choices = parsed.choices.as_ref().map_or(0, Vec::len),
            "Answer generated"
        );

        Ok(AnswerResult {
            answer: parsed.answer,
            image_url: None,
            choices: parsed.choices,
            notice: None,
        })
    }

    /// Embeds `question` and assembles the book context for it.
    pub async fn retrieve_context(
        &self,
        question: &str,
        filter: &RetrievalFilter,
    ) -> Result<String, SparkyError> {
        let (Some(embedder), Some(index)) = (self.embedder.as_deref(), self.index.as_deref())
        else {
            return Err(SparkyError::NotConfigured(
                "retrieval needs both an embedder and a vector index".to_string(),
            ));
        };
        retrieve_context(embedder, index, question, filter, self.settings.top_k).await
    }
}

async fn retrieve_context(
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    question: &str,
    filter: &RetrievalFilter,
    top_k: usize,
) -> Result<String, SparkyError> {
    let vector = embedder.embed(question).await?;
    let chunks = index.query(&vector, top_k, filter).await?;
    debug!(
        index = index.name(),
        matches = chunks.len(),
        "Retrieved book chunks"
    );
    Ok(assemble_context(&chunks))
}
