use super::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ask", post(handlers::ask_handler))
        .route("/session/start", post(handlers::session_start_handler))
        .route("/languages", get(handlers::languages_handler))
        .route("/grades", get(handlers::grades_handler))
        .route("/grades/{grade}/subjects", get(handlers::subjects_handler))
        .route("/grade/detect", post(handlers::detect_grade_handler))
        .route("/simplify", post(handlers::simplify_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
