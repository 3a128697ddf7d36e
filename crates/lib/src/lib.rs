//! # Sparky
//!
//! The core of Sparky, a children's tutor chatbot. Questions are answered from
//! grade and subject specific textbook chunks retrieved from a vector index,
//! phrased through a guided-discovery persona in the child's language. A story
//! mode tells branching adventures that end in `[CHOICE: A | B]` markers.
//!
//! The hosted services (completion, embeddings, vector index) sit behind traits
//! in [`providers`]; the [`orchestrator`] wires them into one answer flow.

pub mod choices;
pub mod errors;
pub mod ingest;
pub mod orchestrator;
pub mod persona;
pub mod prompts;
pub mod providers;
pub mod readability;
pub mod session;
pub mod simplify;
pub mod types;

pub use choices::{parse_reply, ParsedReply};
pub use errors::SparkyError;
pub use orchestrator::{AnswerSettings, Orchestrator, OrchestratorBuilder};
pub use persona::{PersonaConfig, PersonaTable};
pub use types::{
    AnswerRequest, AnswerResult, AppMode, Message, RetrievalFilter, RetrievedChunk, Role,
    ScoredChunk,
};
