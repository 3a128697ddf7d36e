//! # Session Openers
//!
//! Conversation history lives in the caller's session; these helpers produce the
//! scripted lines a fresh session starts with.

use crate::{
    prompts::tasks::{STORY_OPENING_PROMPT, TUTOR_GREETING},
    types::{AppMode, Message},
};

/// The history a new session starts with.
///
/// Tutor mode opens with Sparky's greeting. Story mode starts empty; the caller
/// pushes [`story_opening`] once a subject is picked.
pub fn initial_messages(mode: AppMode, child_name: &str) -> Vec<Message> {
    match mode {
        AppMode::Tutor => vec![Message::assistant(
            TUTOR_GREETING.replace("{child_name}", child_name),
        )],
        AppMode::Story => Vec::new(),
    }
}

/// The scripted first user message of a story.
pub fn story_opening(subject: &str) -> Message {
    Message::user(STORY_OPENING_PROMPT.replace("{subject}", subject))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn tutor_session_opens_with_greeting() {
        let messages = initial_messages(AppMode::Tutor, "Asha");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
        assert!(messages[0].content.starts_with("Hi Asha! I'm Sparky!"));
    }

    #[test]
    fn story_session_starts_empty() {
        assert!(initial_messages(AppMode::Story, "Asha").is_empty());
        let opening = story_opening("Space");
        assert_eq!(opening.role, Role::User);
        assert_eq!(opening.content, "Let's start an adventure about Space!");
    }
}
