//! # API Payloads
//!
//! Request and response bodies for the `sparky-server` endpoints. Every
//! successful response is wrapped in [`ApiResponse`].

use serde::{Deserialize, Serialize};
use sparky::{AppMode, Message};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: T,
}

pub fn wrap_response<T>(result: T) -> axum::Json<ApiResponse<T>> {
    axum::Json(ApiResponse { result })
}

// --- Sessions ---

#[derive(Debug, Deserialize)]
pub struct SessionStartRequest {
    pub child_name: String,
    #[serde(default)]
    pub mode: AppMode,
    /// Story mode only: the subject the adventure is about.
    #[serde(default)]
    pub subject: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStartResponse {
    pub messages: Vec<Message>,
}

// --- Catalog ---

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub code: String,
    /// The language's own name, e.g. "Español".
    pub name: String,
    pub english_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub baseline: String,
    pub languages: Vec<LanguageEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GradesResponse {
    pub grades: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectsResponse {
    pub grade: String,
    pub subjects: Vec<String>,
}

// --- Readability ---

#[derive(Debug, Deserialize)]
pub struct DetectGradeRequest {
    pub question: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectGradeResponse {
    pub grade: u8,
}

#[derive(Debug, Deserialize)]
pub struct SimplifyRequest {
    pub text: String,
    pub target_grade: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimplifyResponse {
    pub text: String,
    /// False when the text was already readable at the target grade.
    pub simplified: bool,
}
