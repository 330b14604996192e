use std::collections::HashMap;
use std::sync::Arc;

use api_lib::config::Config;
use api_lib::web::protocol::{
    AccessCheckQuery, ChapterQuestionsRequest, GenerateQuestionsRequest, RecordAttemptRequest,
};
use api_lib::web::{
    check_access_handler, generate_chapter_questions_handler, generate_questions_handler,
    list_quiz_times_handler, record_attempt_handler, AppState,
};
use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use quiz_core::{
    AccessGateRecord, ChapterNode, InMemoryKnowledgeStore, KnowledgeEntry, KnowledgeFilter,
    KnowledgeStore, PortError, PortResult, TemplateBank,
};

fn config() -> Arc<Config> {
    let vars: HashMap<&str, &str> = [("DATABASE_URL", "postgres://unused")].into();
    Arc::new(Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap())
}

async fn state() -> Arc<AppState> {
    let store = InMemoryKnowledgeStore::new();
    store.insert_chapter(ChapterNode::first_level(1, "科学")).await.unwrap();
    store.insert_chapter(ChapterNode::first_level(2, "探索")).await.unwrap();
    store.insert_chapter(ChapterNode::second_level(3, "声音", 2)).await.unwrap();
    let titles = [
        ("光合作用", "生物", Some(2)),
        ("地球自转", "地理", Some(2)),
        ("可再生能源", "能源", Some(2)),
        ("呼吸系统", "生物", Some(2)),
        ("简单机械", "物理", Some(2)),
        ("伯努利原理", "物理", Some(2)),
        ("声音的三要素", "物理", Some(3)),
    ];
    for (i, (title, category, chapter_id)) in titles.into_iter().enumerate() {
        store
            .insert_entry(KnowledgeEntry {
                id: i as i64 + 1,
                title: title.to_string(),
                content: format!("{title}。"),
                category: category.to_string(),
                chapter_id,
                course_code: None,
            })
            .await;
    }
    Arc::new(AppState::new(Arc::new(store), TemplateBank::builtin(), config()))
}

#[tokio::test]
async fn generate_uses_the_default_count() {
    let Json(questions) = generate_questions_handler(
        State(state().await),
        Json(GenerateQuestionsRequest {
            chapter_id: Some(2),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(questions.len(), 5);
    for (i, q) in questions.iter().enumerate() {
        assert_eq!(q.id, i + 1);
        assert_eq!(q.options.len(), 4);
        assert!(q.answer < q.options.len());
        assert_eq!(q.course_id, Some(2));
        assert!((100_000..=999_999).contains(&q.quiz_id));
    }
}

#[tokio::test]
async fn generate_for_unknown_chapter_is_an_empty_ok() {
    let Json(questions) = generate_questions_handler(
        State(state().await),
        Json(GenerateQuestionsRequest {
            chapter_id: Some(77),
            count: Some(10),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert!(questions.is_empty());
}

#[tokio::test]
async fn generate_rejects_negative_count() {
    let (status, _) = generate_questions_handler(
        State(state().await),
        Json(GenerateQuestionsRequest {
            count: Some(-2),
            ..Default::default()
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chapter_endpoint_defaults_to_ten() {
    let state = state().await;
    let Json(questions) = generate_chapter_questions_handler(
        State(state.clone()),
        Json(ChapterQuestionsRequest {
            chapter_id: 2,
            question_count: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(questions.len(), 6);

    let Json(questions) = generate_chapter_questions_handler(
        State(state),
        Json(ChapterQuestionsRequest {
            chapter_id: 3,
            question_count: Some(1),
        }),
    )
    .await
    .unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].course_id, Some(3));
}

#[tokio::test]
async fn attempt_locks_the_chapter() {
    let state = state().await;

    let Json(record) = record_attempt_handler(
        State(state.clone()),
        Path((9, 2)),
        Json(RecordAttemptRequest {
            interval_days: 3,
            now: Some("2024-06-01T10:00:00Z".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(record.interval_days, 3);
    assert_eq!(record.next_available_time.to_rfc3339(), "2024-06-04T10:00:00+00:00");

    let Json(locked) = check_access_handler(
        State(state.clone()),
        Path((9, 2)),
        Query(AccessCheckQuery {
            now: Some("2024-06-02T10:00:00Z".to_string()),
        }),
    )
    .await
    .unwrap();
    assert!(!locked.can_quiz);
    assert_eq!(locked.remaining_time, 2 * 86_400);
    assert_eq!(locked.next_available_time, Some(record.next_available_time));

    let Json(open) = check_access_handler(
        State(state.clone()),
        Path((9, 2)),
        Query(AccessCheckQuery {
            now: Some("2024-06-04T10:00:00Z".to_string()),
        }),
    )
    .await
    .unwrap();
    assert!(open.can_quiz);
    assert_eq!(open.remaining_time, 0);
    assert_eq!(open.next_available_time, None);

    let Json(times) = list_quiz_times_handler(State(state), Path(9)).await.unwrap();
    assert_eq!(times, vec![record]);
}

#[tokio::test]
async fn malformed_time_is_a_bad_request() {
    let state = state().await;
    let (status, _) = check_access_handler(
        State(state.clone()),
        Path((9, 2)),
        Query(AccessCheckQuery {
            now: Some("yesterday".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = record_attempt_handler(
        State(state.clone()),
        Path((9, 2)),
        Json(RecordAttemptRequest {
            interval_days: 1,
            now: Some("01/06/2024".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let Json(times) = list_quiz_times_handler(State(state), Path(9)).await.unwrap();
    assert!(times.is_empty());
}

#[tokio::test]
async fn request_payloads_accept_the_legacy_field_names() {
    let request: GenerateQuestionsRequest =
        serde_json::from_str(r#"{"first_level_id": 2, "second_level_id": 3, "count": 10}"#).unwrap();
    assert_eq!(request.scope().second_level_id, Some(3));
    assert_eq!(request.count, Some(10));

    let attempt: RecordAttemptRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(attempt.interval_days, 0);
    assert!(attempt.now.is_none());
}

const BACKEND_MESSAGE: &str = "db down: password authentication failed for user quiz";

struct DownStore;

#[async_trait]
impl KnowledgeStore for DownStore {
    async fn list_knowledge_entries(
        &self,
        _: &KnowledgeFilter,
    ) -> PortResult<Vec<KnowledgeEntry>> {
        Err(PortError::Unexpected(BACKEND_MESSAGE.to_string()))
    }

    async fn list_chapter_children(&self, _: i64) -> PortResult<Vec<i64>> {
        Err(PortError::Unexpected(BACKEND_MESSAGE.to_string()))
    }

    async fn get_gate_record(&self, _: i64, _: i64) -> PortResult<Option<AccessGateRecord>> {
        Err(PortError::Unexpected(BACKEND_MESSAGE.to_string()))
    }

    async fn upsert_gate_record(&self, _: &AccessGateRecord) -> PortResult<()> {
        Err(PortError::Unexpected(BACKEND_MESSAGE.to_string()))
    }

    async fn list_gate_records(&self, _: i64) -> PortResult<Vec<AccessGateRecord>> {
        Err(PortError::Unexpected(BACKEND_MESSAGE.to_string()))
    }
}

#[tokio::test]
async fn storage_failures_are_opaque_server_errors() {
    let state = Arc::new(AppState::new(
        Arc::new(DownStore),
        TemplateBank::builtin(),
        config(),
    ));

    let mut failures = vec![
        generate_questions_handler(
            State(state.clone()),
            Json(GenerateQuestionsRequest {
                chapter_id: Some(2),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err(),
        generate_chapter_questions_handler(
            State(state.clone()),
            Json(ChapterQuestionsRequest {
                chapter_id: 2,
                question_count: None,
            }),
        )
        .await
        .unwrap_err(),
        check_access_handler(
            State(state.clone()),
            Path((9, 2)),
            Query(AccessCheckQuery { now: None }),
        )
        .await
        .unwrap_err(),
        record_attempt_handler(
            State(state.clone()),
            Path((9, 2)),
            Json(RecordAttemptRequest {
                interval_days: 1,
                now: None,
            }),
        )
        .await
        .unwrap_err(),
    ];
    failures.push(list_quiz_times_handler(State(state), Path(9)).await.unwrap_err());

    for (status, body) in failures {
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("db down"), "{body}");
        assert!(!body.contains("password"), "{body}");
    }
}
