//! # Answer Simplification
//!
//! Rewrites an answer for a younger reader when its Flesch-Kincaid level is
//! more than one grade above the target.

use crate::{
    errors::SparkyError,
    prompts::readability::SIMPLIFY_PROMPT,
    providers::ai::{AiProvider, CompletionOptions},
    readability::flesch_kincaid_grade,
    types::Message,
};
use tracing::{info, warn};

/// True when `text` reads above `target_grade + 1`, or cannot be scored.
pub fn needs_simplify(text: &str, target_grade: u8) -> bool {
    match flesch_kincaid_grade(text) {
        Some(score) => score > f64::from(target_grade) + 1.0,
        None => true,
    }
}

pub async fn simplify_with_llm(
    provider: &dyn AiProvider,
    text: &str,
    target_grade: u8,
) -> Result<String, SparkyError> {
    let prompt = SIMPLIFY_PROMPT
        .replace("{grade}", &target_grade.to_string())
        .replace("{text}", text);
    let reply = provider
        .chat(
            &[Message::user(prompt)],
            CompletionOptions::with_temperature(0.2).max_tokens(400),
        )
        .await?;
    Ok(reply.trim().to_string())
}

/// Returns `answer` rewritten for `target_grade`, or unchanged when it is
/// already simple enough or no provider is configured.
pub async fn adjust_for_grade(
    provider: Option<&dyn AiProvider>,
    answer: &str,
    target_grade: u8,
) -> Result<String, SparkyError> {
    if !needs_simplify(answer, target_grade) {
        return Ok(answer.to_string());
    }
    let Some(provider) = provider else {
        warn!("Answer needs simplifying but no completion provider is configured");
        return Ok(answer.to_string());
    };
    info!(target_grade, "Simplifying answer");
    simplify_with_llm(provider, answer, target_grade).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscored_text_needs_simplify() {
        assert!(needs_simplify("", 2));
        assert!(needs_simplify("123 456", 2));
    }

    #[test]
    fn short_words_are_already_simple() {
        assert!(!needs_simplify("The cat sat. The dog ran. I see a sun.", 2));
    }
}
