//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged with the quiz front end. Field names
//! follow what existing callers already send and expect.

use chrono::{DateTime, Utc};
use quiz_core::{AccessDecision, AccessGateRecord, GeneratedQuestion, ScopeRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// Requests FROM the Client
//=========================================================================================

/// Body of `POST /api/generate-questions`.
///
/// Send either `chapter_id`, or the `first_level_id`/`second_level_id` pair,
/// or nothing for the whole knowledge base.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct GenerateQuestionsRequest {
    pub chapter_id: Option<i64>,
    pub first_level_id: Option<i64>,
    pub second_level_id: Option<i64>,
    pub course_code: Option<String>,
    /// Number of questions wanted; the server default applies when absent.
    pub count: Option<i64>,
}

impl GenerateQuestionsRequest {
    pub fn scope(&self) -> ScopeRequest {
        ScopeRequest {
            chapter_id: self.chapter_id,
            first_level_id: self.first_level_id,
            second_level_id: self.second_level_id,
            course_code: self.course_code.clone(),
        }
    }
}

/// Body of `POST /api/generate-questions-by-chapter`.
#[derive(Deserialize, Debug, ToSchema)]
pub struct ChapterQuestionsRequest {
    pub chapter_id: i64,
    pub question_count: Option<i64>,
}

/// Query string of `GET /api/user/{user_id}/can-quiz/{chapter_id}`.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccessCheckQuery {
    /// RFC 3339 instant to evaluate at instead of the server clock.
    pub now: Option<String>,
}

/// Body of `POST /api/user/{user_id}/quiz-time/{chapter_id}`.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct RecordAttemptRequest {
    #[serde(default)]
    pub interval_days: i64,
    /// RFC 3339 instant of the attempt instead of the server clock.
    pub now: Option<String>,
}

//=========================================================================================
// Responses TO the Client
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct QuestionResponse {
    /// 1-based position in this response.
    pub id: usize,
    /// Random tag that changes with every generated set.
    pub quiz_id: u32,
    pub question: String,
    pub options: Vec<String>,
    /// Index of the correct entry in `options`.
    pub answer: usize,
    pub category: String,
    pub course_id: Option<i64>,
    pub explanation: String,
}

impl From<GeneratedQuestion> for QuestionResponse {
    fn from(q: GeneratedQuestion) -> Self {
        Self {
            id: q.display_id,
            quiz_id: q.quiz_tag,
            question: q.prompt,
            options: q.options,
            answer: q.correct_index,
            category: q.category,
            course_id: q.scope_id,
            explanation: q.explanation,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct AccessCheckResponse {
    pub can_quiz: bool,
    pub next_available_time: Option<DateTime<Utc>>,
    /// Whole seconds until the chapter unlocks; 0 when allowed.
    pub remaining_time: i64,
}

impl From<AccessDecision> for AccessCheckResponse {
    fn from(d: AccessDecision) -> Self {
        Self {
            can_quiz: d.allowed,
            next_available_time: d.next_available_at,
            remaining_time: d.remaining_seconds,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct QuizTimeResponse {
    pub user_id: i64,
    pub chapter_id: i64,
    pub last_quiz_time: DateTime<Utc>,
    pub next_available_time: DateTime<Utc>,
    pub interval_days: i64,
}

impl From<AccessGateRecord> for QuizTimeResponse {
    fn from(r: AccessGateRecord) -> Self {
        Self {
            user_id: r.user_id,
            chapter_id: r.chapter_id,
            last_quiz_time: r.last_attempt_at,
            next_available_time: r.next_available_at,
            interval_days: r.cooldown_days,
        }
    }
}
