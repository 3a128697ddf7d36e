//! # Readability Prompts
//!
//! Templates for the optional grade classification and simplification helpers.

/// Classifies the school level of a child's question.
///
/// Placeholders: `{question}`, `{context}`
pub const GRADE_CLASSIFICATION_PROMPT: &str = r#"
You're a helpful assistant. Classify the appropriate school level for the following child's question and short context.
Return only a single integer between 0 and 4, where:
0 = nursery / pre-reader,
1 = LKG (pre-school),
2 = UKG / Grade 1,
3 = Grade 2–3,
4 = Grade 4

Question:
{question}

Context (short):
{context}

Return just the digit (0,1,2,3 or 4).
"#;

/// Rewrites an answer for a younger reader.
///
/// Placeholders: `{grade}`, `{text}`
pub const SIMPLIFY_PROMPT: &str = r#"
You are a very friendly primary school teacher who explains things simply.
Rewrite the following answer so a child at Grade {grade} can read and understand it.
- Use short sentences (<= 10 words per sentence).
- Use simple words.
- Give one short example or tiny activity.
- Keep it cheerful and encouraging.

Answer:
{text}
"#;
