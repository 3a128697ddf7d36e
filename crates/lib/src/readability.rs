//! # Readability and Grade Detection
//!
//! Estimates the school level of a piece of text. A Flesch-Kincaid score is
//! tried first; when the text gives the formula nothing to work with, a short
//! classification prompt is sent to the completion provider.

use crate::{
    errors::SparkyError,
    prompts::readability::GRADE_CLASSIFICATION_PROMPT,
    providers::ai::{AiProvider, CompletionOptions},
    types::Message,
};
use tracing::{debug, warn};

/// Grade levels run from 0 (nursery / pre-reader) to 4 (Grade 4).
pub const MAX_GRADE_LEVEL: u8 = 4;

/// The level used when neither the formula nor the model can decide.
pub const DEFAULT_GRADE_LEVEL: u8 = 2;

/// Flesch-Kincaid grade level of `text`, or `None` when it has no words.
///
/// `0.39 * (words / sentences) + 11.8 * (syllables / words) - 15.59`
pub fn flesch_kincaid_grade(text: &str) -> Option<f64> {
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .collect();
    if words.is_empty() {
        return None;
    }

    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| s.chars().any(char::is_alphabetic))
        .count()
        .max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words = words.len() as f64;
    Some(0.39 * (words / sentences as f64) + 11.8 * (syllables as f64 / words) - 15.59)
}

/// Vowel-group syllable estimate; every word has at least one.
fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut count = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    // Silent trailing "e", as in "make", but not "table".
    if count > 1 && letters.ends_with(&['e']) && !letters.ends_with(&['l', 'e']) {
        count -= 1;
    }
    count.max(1)
}

/// Maps a Flesch-Kincaid score onto the 0..=4 grade scale.
pub fn grade_from_score(score: f64) -> u8 {
    match score {
        s if s < 1.5 => 0,
        s if s < 2.5 => 1,
        s if s < 3.5 => 2,
        s if s < 4.5 => 3,
        _ => 4,
    }
}

pub fn heuristic_grade_from_text(text: &str) -> Option<u8> {
    flesch_kincaid_grade(text).map(grade_from_score)
}

/// Asks the completion provider to classify a question.
///
/// Returns `Ok(None)` when the reply does not start with a digit in 0..=4.
pub async fn llm_detect_grade(
    provider: &dyn AiProvider,
    question: &str,
    context: &str,
) -> Result<Option<u8>, SparkyError> {
    let prompt = GRADE_CLASSIFICATION_PROMPT
        .replace("{question}", question)
        .replace("{context}", context);
    let reply = provider
        .chat(
            &[Message::user(prompt)],
            CompletionOptions::with_temperature(0.0).max_tokens(4),
        )
        .await?;

    let grade = reply
        .trim()
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .and_then(|d| u8::try_from(d).ok())
        .filter(|d| *d <= MAX_GRADE_LEVEL);
    debug!(reply = %reply.trim(), ?grade, "Grade classification reply");
    Ok(grade)
}

/// Heuristic first, then the model, then [`DEFAULT_GRADE_LEVEL`].
pub async fn detect_grade(
    provider: Option<&dyn AiProvider>,
    question: &str,
    retrieved_text: &str,
) -> u8 {
    let combined = format!("{question}\n\n{retrieved_text}");
    let combined = combined.trim();
    if !combined.is_empty() {
        if let Some(grade) = heuristic_grade_from_text(combined) {
            return grade;
        }
    }

    if let Some(provider) = provider {
        match llm_detect_grade(provider, question, retrieved_text).await {
            Ok(Some(grade)) => return grade,
            Ok(None) => debug!("Model did not return a usable grade"),
            Err(e) => warn!("Grade classification failed: {e}"),
        }
    }
    DEFAULT_GRADE_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syllable_estimates() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("Banana!"), 3);
    }

    #[test]
    fn score_thresholds() {
        assert_eq!(grade_from_score(-3.0), 0);
        assert_eq!(grade_from_score(1.5), 1);
        assert_eq!(grade_from_score(3.49), 2);
        assert_eq!(grade_from_score(4.0), 3);
        assert_eq!(grade_from_score(9.0), 4);
    }
}
