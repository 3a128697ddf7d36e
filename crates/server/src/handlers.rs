//! # Route Handlers
//!
//! The Axum handlers for `sparky-server`: the answer endpoint, session
//! openers, the language and book catalogs, and the readability helpers.

use crate::{
    errors::AppError,
    state::AppState,
    types::{
        wrap_response, ApiResponse, DetectGradeRequest, DetectGradeResponse, GradesResponse,
        LanguageEntry, LanguagesResponse, SessionStartRequest, SessionStartResponse,
        SimplifyRequest, SimplifyResponse, SubjectsResponse,
    },
};
use axum::{
    extract::{Path, State},
    Json,
};
use sparky::{
    readability::{detect_grade, MAX_GRADE_LEVEL},
    session::{initial_messages, story_opening},
    simplify::adjust_for_grade,
    AnswerRequest, AnswerResult, AppMode,
};
use sparky_pdf::{list_grades, list_subjects};
use tracing::info;

// --- General-Purpose Handlers ---

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "sparky server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

// --- Answers ---

/// Answers the latest child message in tutor or story mode.
///
/// A malformed history is rejected here with 400; everything past validation
/// is handled by the orchestrator, which always produces a child-facing answer.
pub async fn ask_handler(
    State(app_state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<ApiResponse<AnswerResult>>, AppError> {
    info!(
        mode = ?request.mode,
        grade = %request.grade,
        subject = %request.subject,
        language = %request.language,
        turns = request.messages.len(),
        "Received ask request"
    );
    request.validate()?;

    let result = app_state.orchestrator.get_answer(&request).await;
    Ok(wrap_response(result))
}

/// Returns the scripted messages a new conversation starts with.
pub async fn session_start_handler(
    Json(request): Json<SessionStartRequest>,
) -> Result<Json<ApiResponse<SessionStartResponse>>, AppError> {
    let child_name = request.child_name.trim();
    if child_name.is_empty() {
        return Err(AppError::BadRequest("child_name must not be empty".into()));
    }

    let mut messages = initial_messages(request.mode, child_name);
    if request.mode == AppMode::Story {
        if let Some(subject) = request.subject.as_deref().filter(|s| !s.trim().is_empty()) {
            messages.push(story_opening(subject));
        }
    }
    Ok(wrap_response(SessionStartResponse { messages }))
}

// --- Catalog ---

/// Lists the supported tutor languages for a language picker.
pub async fn languages_handler(
    State(app_state): State<AppState>,
) -> Json<ApiResponse<LanguagesResponse>> {
    let personas = app_state.orchestrator.personas();
    let mut languages: Vec<LanguageEntry> = personas
        .languages()
        .map(|(code, persona)| LanguageEntry {
            code: code.to_string(),
            name: persona.name.clone(),
            english_name: persona.english_name.clone(),
        })
        .collect();
    languages.sort_by(|a, b| a.code.cmp(&b.code));

    wrap_response(LanguagesResponse {
        baseline: personas.baseline_code().to_string(),
        languages,
    })
}

/// Lists the grade folders of the book library.
pub async fn grades_handler(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<GradesResponse>>, AppError> {
    let grades = list_grades(&app_state.config.books_dir)?;
    Ok(wrap_response(GradesResponse { grades }))
}

/// Lists the subject folders under one grade.
pub async fn subjects_handler(
    State(app_state): State<AppState>,
    Path(grade): Path<String>,
) -> Result<Json<ApiResponse<SubjectsResponse>>, AppError> {
    let subjects = list_subjects(&app_state.config.books_dir, &grade)?;
    Ok(wrap_response(SubjectsResponse { grade, subjects }))
}

// --- Readability ---

/// Estimates the grade level (0..=4) of a question and optional context.
pub async fn detect_grade_handler(
    State(app_state): State<AppState>,
    Json(request): Json<DetectGradeRequest>,
) -> Result<Json<ApiResponse<DetectGradeResponse>>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }
    let grade = detect_grade(
        app_state.orchestrator.ai_provider(),
        &request.question,
        &request.context,
    )
    .await;
    Ok(wrap_response(DetectGradeResponse { grade }))
}

/// Rewrites a text for a younger reader when it reads above the target grade.
pub async fn simplify_handler(
    State(app_state): State<AppState>,
    Json(request): Json<SimplifyRequest>,
) -> Result<Json<ApiResponse<SimplifyResponse>>, AppError> {
    if request.target_grade > MAX_GRADE_LEVEL {
        return Err(AppError::BadRequest(format!(
            "target_grade must be between 0 and {MAX_GRADE_LEVEL}"
        )));
    }
    let text = adjust_for_grade(
        app_state.orchestrator.ai_provider(),
        &request.text,
        request.target_grade,
    )
    .await?;
    let simplified = text != request.text;
    Ok(wrap_response(SimplifyResponse { text, simplified }))
}
