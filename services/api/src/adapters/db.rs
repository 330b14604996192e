//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `KnowledgeStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::domain::{AccessGateRecord, EntityId, KnowledgeEntry};
use quiz_core::ports::{KnowledgeFilter, KnowledgeStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `KnowledgeStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct KnowledgeRecord {
    id: i64,
    title: String,
    content: String,
    category: String,
    chapter_id: Option<i64>,
    course_code: Option<String>,
}
impl KnowledgeRecord {
    fn to_domain(self) -> KnowledgeEntry {
        KnowledgeEntry {
            id: self.id,
            title: self.title,
            content: self.content,
            category: self.category,
            chapter_id: self.chapter_id,
            course_code: self.course_code,
        }
    }
}

#[derive(FromRow)]
struct QuizTimeRecord {
    user_id: i64,
    chapter_id: i64,
    last_quiz_time: DateTime<Utc>,
    next_available_time: DateTime<Utc>,
    interval_days: i64,
}
impl QuizTimeRecord {
    fn to_domain(self) -> PortResult<AccessGateRecord> {
        if self.next_available_time < self.last_quiz_time {
            return Err(PortError::InvalidData(format!(
                "gate record for user {} chapter {} unlocks before its last attempt",
                self.user_id, self.chapter_id
            )));
        }
        Ok(AccessGateRecord {
            user_id: self.user_id,
            chapter_id: self.chapter_id,
            last_attempt_at: self.last_quiz_time,
            next_available_at: self.next_available_time,
            cooldown_days: self.interval_days,
        })
    }
}

//=========================================================================================
// `KnowledgeStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl KnowledgeStore for DbAdapter {
    async fn list_knowledge_entries(
        &self,
        filter: &KnowledgeFilter,
    ) -> PortResult<Vec<KnowledgeEntry>> {
        let records = sqlx::query_as::<_, KnowledgeRecord>(
            "SELECT id, title, content, category, chapter_id, course_code FROM knowledge \
             WHERE ($1::BIGINT[] IS NULL OR chapter_id = ANY($1)) \
             AND ($2::TEXT IS NULL OR course_code = $2) \
             ORDER BY id ASC",
        )
        .bind(filter.chapter_ids.clone())
        .bind(filter.course_code.clone())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_chapter_children(&self, parent_id: EntityId) -> PortResult<Vec<EntityId>> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM chapters WHERE parent_id = $1 ORDER BY id ASC")
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn get_gate_record(
        &self,
        user_id: EntityId,
        chapter_id: EntityId,
    ) -> PortResult<Option<AccessGateRecord>> {
        let record = sqlx::query_as::<_, QuizTimeRecord>(
            "SELECT user_id, chapter_id, last_quiz_time, next_available_time, interval_days \
             FROM user_quiz_times WHERE user_id = $1 AND chapter_id = $2",
        )
        .bind(user_id)
        .bind(chapter_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(QuizTimeRecord::to_domain).transpose()
    }

    async fn upsert_gate_record(&self, record: &AccessGateRecord) -> PortResult<()> {
        // A single statement, so the three fields are replaced together.
        sqlx::query(
            "INSERT INTO user_quiz_times \
             (user_id, chapter_id, last_quiz_time, next_available_time, interval_days) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, chapter_id) DO UPDATE SET \
             last_quiz_time = EXCLUDED.last_quiz_time, \
             next_available_time = EXCLUDED.next_available_time, \
             interval_days = EXCLUDED.interval_days",
        )
        .bind(record.user_id)
        .bind(record.chapter_id)
        .bind(record.last_attempt_at)
        .bind(record.next_available_at)
        .bind(record.cooldown_days)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_gate_records(&self, user_id: EntityId) -> PortResult<Vec<AccessGateRecord>> {
        let records = sqlx::query_as::<_, QuizTimeRecord>(
            "SELECT user_id, chapter_id, last_quiz_time, next_available_time, interval_days \
             FROM user_quiz_times WHERE user_id = $1 ORDER BY chapter_id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(QuizTimeRecord::to_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn quiz_time(last: DateTime<Utc>, next: DateTime<Utc>) -> QuizTimeRecord {
        QuizTimeRecord {
            user_id: 4,
            chapter_id: 2,
            last_quiz_time: last,
            next_available_time: next,
            interval_days: 1,
        }
    }

    #[test]
    fn quiz_time_that_unlocks_before_its_attempt_is_invalid() {
        let last = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

        let err = quiz_time(last, last - Duration::seconds(1)).to_domain().unwrap_err();
        assert!(matches!(err, PortError::InvalidData(_)));

        let record = quiz_time(last, last + Duration::days(1)).to_domain().unwrap();
        assert_eq!(record.last_attempt_at, last);
        assert_eq!(record.next_available_at, last + Duration::days(1));
        assert_eq!(record.cooldown_days, 1);

        assert!(quiz_time(last, last).to_domain().is_ok());
    }

    // The tests below run against a scratch database created by `sqlx::test`
    // from DATABASE_URL: `cargo test -p api -- --ignored`.

    async fn seed(pool: &PgPool) -> sqlx::Result<()> {
        // The migration already created first-level chapters 1..=7.
        sqlx::query(
            "INSERT INTO chapters (id, name, level, parent_id) VALUES \
             (30, '声音', 2, 3), (31, '光', 2, 3)",
        )
        .execute(pool)
        .await?;
        sqlx::query(
            "INSERT INTO knowledge (title, content, category, chapter_id, course_code) VALUES \
             ('光合作用', '绿色植物利用光能。', '生物', 3, 'BIO-1'), \
             ('声音的三要素', '音调、响度和音色。', '物理', 30, NULL), \
             ('光的折射', '光从一种介质斜射入另一种介质。', '物理', 31, 'PHY-2'), \
             ('地球自转', '地球绕地轴自西向东转动。', '地理', NULL, NULL)",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    fn titles(entries: &[KnowledgeEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn knowledge_filter_matches_chapter_set_and_course_code(
        pool: PgPool,
    ) -> sqlx::Result<()> {
        seed(&pool).await?;
        let db = DbAdapter::new(pool);

        let all = db.list_knowledge_entries(&KnowledgeFilter::all()).await.unwrap();
        assert_eq!(all.len(), 4);

        let tree = db
            .list_knowledge_entries(&KnowledgeFilter::chapters(vec![3, 30, 31]))
            .await
            .unwrap();
        assert_eq!(titles(&tree), ["光合作用", "声音的三要素", "光的折射"]);

        let single = db
            .list_knowledge_entries(&KnowledgeFilter::chapters(vec![30]))
            .await
            .unwrap();
        assert_eq!(titles(&single), ["声音的三要素"]);
        assert_eq!(single[0].chapter_id, Some(30));
        assert_eq!(single[0].course_code, None);

        let by_course = db
            .list_knowledge_entries(
                &KnowledgeFilter::chapters(vec![3, 30, 31])
                    .with_course_code(Some("PHY-2".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(titles(&by_course), ["光的折射"]);

        let none = db
            .list_knowledge_entries(&KnowledgeFilter::chapters(vec![]))
            .await
            .unwrap();
        assert!(none.is_empty());

        assert_eq!(db.list_chapter_children(3).await.unwrap(), vec![30, 31]);
        assert!(db.list_chapter_children(30).await.unwrap().is_empty());
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn upsert_keeps_one_row_per_user_and_chapter(pool: PgPool) -> sqlx::Result<()> {
        let db = DbAdapter::new(pool.clone());
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

        for (chapter_id, days, at) in [(5, 3, t0), (2, 1, t0), (5, 0, t0 + Duration::hours(2))] {
            db.upsert_gate_record(&AccessGateRecord {
                user_id: 4,
                chapter_id,
                last_attempt_at: at,
                next_available_at: at + Duration::days(days),
                cooldown_days: days,
            })
            .await
            .unwrap();
        }

        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_quiz_times WHERE user_id = 4 AND chapter_id = 5",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(rows, 1);

        let overwritten = db.get_gate_record(4, 5).await.unwrap().unwrap();
        assert_eq!(overwritten.last_attempt_at, t0 + Duration::hours(2));
        assert_eq!(overwritten.next_available_at, t0 + Duration::hours(2));
        assert_eq!(overwritten.cooldown_days, 0);

        let listed = db.list_gate_records(4).await.unwrap();
        let chapters: Vec<_> = listed.iter().map(|r| r.chapter_id).collect();
        assert_eq!(chapters, vec![2, 5]);
        assert!(db.get_gate_record(4, 7).await.unwrap().is_none());
        assert!(db.list_gate_records(99).await.unwrap().is_empty());
        Ok(())
    }
}
