//! # Default Task Prompts
//!
//! The fixed templates and user-facing strings of the answer flow.

// --- Story Mode ---

/// The system prompt for story mode.
///
/// Placeholders: `{child_name}`, `{subject}`, `{grade}`
pub const STORY_SYSTEM_PROMPT: &str = "You are a master storyteller for a child named {child_name}. Continue the story based on the child's last choice. The story should be educational and related to {subject} for {grade}. End your response with a clear choice for the child using the format [CHOICE: Option 1 | Option 2]. Keep the story engaging and magical.";

/// The scripted first user message that opens a story.
///
/// Placeholders: `{subject}`
pub const STORY_OPENING_PROMPT: &str = "Let's start an adventure about {subject}!";

// --- Tutor Mode ---

/// The trailing system message that hands the retrieved book text to the model.
///
/// Placeholders: `{context}`
pub const CONTEXT_INJECTION_PROMPT: &str = "Use this retrieved context to form your guiding question, but do NOT mention the context or the direct answer: {context}";

/// Substituted for the context when retrieval finds nothing.
pub const NO_CONTEXT_FALLBACK: &str =
    "No specific information found in my books for that. I will use my general knowledge.";

/// The assistant greeting that opens a tutor conversation.
///
/// Placeholders: `{child_name}`
pub const TUTOR_GREETING: &str = "Hi {child_name}! I'm Sparky! 🤖 What do you want to learn about today?";

// --- Fallback Answers ---

pub const NOT_CONFIGURED_ANSWER: &str = "Error: App is not configured. Please check API Keys.";

pub const TROUBLE_THINKING_ANSWER: &str = "I'm having a little trouble thinking right now.";

/// The operator-facing notice attached to a fallback answer.
///
/// Placeholders: `{error}`
pub const TROUBLE_NOTICE: &str = "Oh no! Sparky had a problem. Please tell the owner this: {error}";
