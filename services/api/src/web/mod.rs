pub mod protocol;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use rest::{
    check_access_handler, generate_chapter_questions_handler, generate_questions_handler,
    list_quiz_times_handler, record_attempt_handler,
};
pub use state::AppState;

/// Builds the API router over the shared state.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate-questions", post(generate_questions_handler))
        .route(
            "/api/generate-questions-by-chapter",
            post(generate_chapter_questions_handler),
        )
        .route(
            "/api/user/{user_id}/can-quiz/{chapter_id}",
            get(check_access_handler),
        )
        .route(
            "/api/user/{user_id}/quiz-time/{chapter_id}",
            post(record_attempt_handler),
        )
        .route("/api/user/{user_id}/quiz-times", get(list_quiz_times_handler))
        .with_state(app_state)
}
