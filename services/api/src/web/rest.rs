//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::protocol::{
    AccessCheckQuery, AccessCheckResponse, ChapterQuestionsRequest, GenerateQuestionsRequest,
    QuestionResponse, QuizTimeResponse, RecordAttemptRequest,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use quiz_core::{gate::parse_timestamp, QuizError};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_questions_handler,
        generate_chapter_questions_handler,
        check_access_handler,
        record_attempt_handler,
        list_quiz_times_handler,
    ),
    components(
        schemas(
            GenerateQuestionsRequest,
            ChapterQuestionsRequest,
            RecordAttemptRequest,
            QuestionResponse,
            AccessCheckResponse,
            QuizTimeResponse,
        )
    ),
    tags(
        (name = "Quiz Practice API", description = "Question generation and spaced access for chapter quizzes.")
    )
)]
pub struct ApiDoc;

type HandlerError = (StatusCode, String);

/// Maps a core error onto a status code. Storage details stay in the logs.
fn reject(context: &str, err: QuizError) -> HandlerError {
    match err {
        QuizError::InvalidRequest(message) => {
            warn!("{context}: {message}");
            (StatusCode::BAD_REQUEST, message)
        }
        QuizError::Storage(e) => {
            error!("{context}: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{context}: storage unavailable"),
            )
        }
    }
}

fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>, QuizError> {
    now.map(parse_timestamp).unwrap_or_else(|| Ok(Utc::now()))
}

//=========================================================================================
// Question Generation
//=========================================================================================

/// Generate practice questions for a chapter, a chapter pair, or everything.
///
/// An unknown chapter or a chapter without questions yields an empty list.
#[utoipa::path(
    post,
    path = "/api/generate-questions",
    request_body = GenerateQuestionsRequest,
    responses(
        (status = 200, description = "Generated questions, possibly empty", body = [QuestionResponse]),
        (status = 400, description = "Negative count"),
        (status = 500, description = "Knowledge store unavailable")
    )
)]
pub async fn generate_questions_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<GenerateQuestionsRequest>,
) -> Result<Json<Vec<QuestionResponse>>, HandlerError> {
    let count = request
        .count
        .unwrap_or(app_state.config.default_question_count);
    let mut rng = StdRng::from_entropy();

    let questions = app_state
        .quiz
        .generate_questions(&request.scope(), count, &mut rng)
        .await
        .map_err(|e| reject("Failed to generate questions", e))?;

    Ok(Json(questions.into_iter().map(QuestionResponse::from).collect()))
}

/// Generate practice questions from the entries of exactly one chapter.
#[utoipa::path(
    post,
    path = "/api/generate-questions-by-chapter",
    request_body = ChapterQuestionsRequest,
    responses(
        (status = 200, description = "Generated questions, possibly empty", body = [QuestionResponse]),
        (status = 400, description = "Negative question count"),
        (status = 500, description = "Knowledge store unavailable")
    )
)]
pub async fn generate_chapter_questions_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ChapterQuestionsRequest>,
) -> Result<Json<Vec<QuestionResponse>>, HandlerError> {
    let count = request
        .question_count
        .unwrap_or(app_state.config.chapter_question_count);
    let mut rng = StdRng::from_entropy();

    let questions = app_state
        .quiz
        .generate_chapter_questions(request.chapter_id, count, &mut rng)
        .await
        .map_err(|e| reject("Failed to generate chapter questions", e))?;

    Ok(Json(questions.into_iter().map(QuestionResponse::from).collect()))
}

//=========================================================================================
// Access Gate
//=========================================================================================

/// Check whether a user may start a quiz on a chapter.
#[utoipa::path(
    get,
    path = "/api/user/{user_id}/can-quiz/{chapter_id}",
    params(
        ("user_id" = i64, Path, description = "The user's id."),
        ("chapter_id" = i64, Path, description = "The chapter's id."),
        AccessCheckQuery
    ),
    responses(
        (status = 200, description = "Access decision", body = AccessCheckResponse),
        (status = 400, description = "Malformed `now`"),
        (status = 500, description = "Knowledge store unavailable")
    )
)]
pub async fn check_access_handler(
    State(app_state): State<Arc<AppState>>,
    Path((user_id, chapter_id)): Path<(i64, i64)>,
    Query(query): Query<AccessCheckQuery>,
) -> Result<Json<AccessCheckResponse>, HandlerError> {
    let result = async {
        let now = resolve_now(query.now.as_deref())?;
        app_state.quiz.check_access(user_id, chapter_id, now).await
    }
    .await;

    result
        .map(|decision| Json(decision.into()))
        .map_err(|e| reject("Failed to check quiz access", e))
}

/// Record a quiz attempt and lock the chapter for `interval_days`.
#[utoipa::path(
    post,
    path = "/api/user/{user_id}/quiz-time/{chapter_id}",
    request_body = RecordAttemptRequest,
    params(
        ("user_id" = i64, Path, description = "The user's id."),
        ("chapter_id" = i64, Path, description = "The chapter's id.")
    ),
    responses(
        (status = 200, description = "The stored gate record", body = QuizTimeResponse),
        (status = 400, description = "Malformed `now` or cooldown out of range"),
        (status = 500, description = "Knowledge store unavailable")
    )
)]
pub async fn record_attempt_handler(
    State(app_state): State<Arc<AppState>>,
    Path((user_id, chapter_id)): Path<(i64, i64)>,
    Json(request): Json<RecordAttemptRequest>,
) -> Result<Json<QuizTimeResponse>, HandlerError> {
    let result = async {
        let now = resolve_now(request.now.as_deref())?;
        app_state
            .quiz
            .record_attempt(user_id, chapter_id, request.interval_days, now)
            .await
    }
    .await;

    result
        .map(|record| Json(record.into()))
        .map_err(|e| reject("Failed to record quiz attempt", e))
}

/// List every gate record of a user.
#[utoipa::path(
    get,
    path = "/api/user/{user_id}/quiz-times",
    params(
        ("user_id" = i64, Path, description = "The user's id.")
    ),
    responses(
        (status = 200, description = "Gate records ordered by chapter", body = [QuizTimeResponse]),
        (status = 500, description = "Knowledge store unavailable")
    )
)]
pub async fn list_quiz_times_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<QuizTimeResponse>>, HandlerError> {
    let records = app_state
        .quiz
        .list_access_records(user_id)
        .await
        .map_err(|e| reject("Failed to list quiz times", e))?;

    Ok(Json(records.into_iter().map(QuizTimeResponse::from).collect()))
}
