//! # Readability Tests
//!
//! Validates grade detection and answer simplification, including their
//! fallbacks to the completion provider.

use sparky::{
    readability::{
        detect_grade, flesch_kincaid_grade, heuristic_grade_from_text, llm_detect_grade,
        DEFAULT_GRADE_LEVEL,
    },
    simplify::{adjust_for_grade, needs_simplify},
};
use sparky_test_utils::MockAiProvider;

const SIMPLE_TEXT: &str = "The cat sat on the mat. The dog ran to the sun.";
const HARD_TEXT: &str = "Photosynthesis is the biochemical process through which chlorophyll-containing organisms transform electromagnetic radiation into chemical energy, subsequently synthesizing carbohydrates from atmospheric carbon dioxide.";

/// Verifies that the formula ranks very simple text below dense technical text.
#[test]
fn test_flesch_kincaid_orders_texts() {
    let simple = flesch_kincaid_grade(SIMPLE_TEXT).unwrap();
    let hard = flesch_kincaid_grade(HARD_TEXT).unwrap();

    assert!(simple < 1.5, "simple text scored {simple}");
    assert!(hard > 12.0, "hard text scored {hard}");
    assert_eq!(heuristic_grade_from_text(SIMPLE_TEXT), Some(0));
    assert_eq!(heuristic_grade_from_text(HARD_TEXT), Some(4));
}

/// Verifies that text without words cannot be scored.
#[test]
fn test_text_without_words_has_no_score() {
    assert_eq!(flesch_kincaid_grade(""), None);
    assert_eq!(flesch_kincaid_grade("42 ... 7!"), None);
}

/// Verifies that the heuristic answers without consulting the model.
#[tokio::test]
async fn test_detect_grade_prefers_heuristic() {
    let ai = MockAiProvider::with_reply("3");

    let grade = detect_grade(Some(&ai), "Why is the sun hot?", "The sun is a big star.").await;

    assert_eq!(grade, 0);
    assert!(ai.get_calls().is_empty());
}

/// Verifies the model fallback when the text gives the formula nothing to score.
#[tokio::test]
async fn test_detect_grade_falls_back_to_model() {
    let ai = MockAiProvider::with_reply("3 (Grade 2-3)");

    let grade = detect_grade(Some(&ai), "2 + 2 = ?", "").await;

    assert_eq!(grade, 3);
    let calls = ai.get_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0][0].content.contains("2 + 2 = ?"));
    let options = ai.get_options()[0];
    assert_eq!(options.temperature, 0.0);
    assert_eq!(options.max_tokens, Some(4));
}

/// Verifies that unusable model replies and missing providers end at the default grade.
#[tokio::test]
async fn test_detect_grade_default() {
    let ai = MockAiProvider::with_reply("seven");
    assert_eq!(llm_detect_grade(&ai, "1 + 1", "").await.unwrap(), None);
    assert_eq!(detect_grade(Some(&ai), "1 + 1", "").await, DEFAULT_GRADE_LEVEL);

    let out_of_range = MockAiProvider::with_reply("9");
    assert_eq!(detect_grade(Some(&out_of_range), "1 + 1", "").await, DEFAULT_GRADE_LEVEL);

    let failing = MockAiProvider::failing("timeout");
    assert_eq!(detect_grade(Some(&failing), "1 + 1", "").await, DEFAULT_GRADE_LEVEL);

    assert_eq!(detect_grade(None, "1 + 1", "").await, DEFAULT_GRADE_LEVEL);
}

/// Verifies the simplification threshold of one grade above the target.
#[test]
fn test_needs_simplify_threshold() {
    assert!(!needs_simplify(SIMPLE_TEXT, 1));
    assert!(needs_simplify(HARD_TEXT, 4));
}

/// Verifies that hard answers are rewritten by the model and simple ones are left alone.
#[tokio::test]
async fn test_adjust_for_grade() {
    let ai =
        MockAiProvider::with_reply("  Plants eat sunlight! 🌱 Try putting a plant by a window.  ");

    let simplified = adjust_for_grade(Some(&ai), HARD_TEXT, 2).await.unwrap();
    assert_eq!(simplified, "Plants eat sunlight! 🌱 Try putting a plant by a window.");
    let calls = ai.get_calls();
    assert!(calls[0][0].content.contains("Grade 2"));
    assert!(calls[0][0].content.contains("Photosynthesis"));
    assert_eq!(ai.get_options()[0].max_tokens, Some(400));

    let untouched = adjust_for_grade(Some(&ai), SIMPLE_TEXT, 2).await.unwrap();
    assert_eq!(untouched, SIMPLE_TEXT);
    assert_eq!(ai.get_calls().len(), 1);

    let no_provider = adjust_for_grade(None, HARD_TEXT, 2).await.unwrap();
    assert_eq!(no_provider, HARD_TEXT);
}
