//! crates/quiz_core/src/gate.rs
//!
//! Spaced access: after an attempt a chapter stays locked for the user until
//! the cooldown runs out. There is no manual unlock.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{AccessDecision, AccessGateRecord, EntityId};
use crate::error::{QuizError, QuizResult};

/// Builds the record stored for an attempt made at `now`.
///
/// A cooldown of zero or less unlocks immediately (`next_available_at == now`).
pub fn attempt_record(
    user_id: EntityId,
    chapter_id: EntityId,
    cooldown_days: i64,
    now: DateTime<Utc>,
) -> QuizResult<AccessGateRecord> {
    let next_available_at = if cooldown_days > 0 {
        Duration::try_days(cooldown_days)
            .and_then(|cooldown| now.checked_add_signed(cooldown))
            .ok_or_else(|| {
                QuizError::InvalidRequest(format!(
                    "cooldown of {cooldown_days} days is out of range"
                ))
            })?
    } else {
        now
    };

    Ok(AccessGateRecord {
        user_id,
        chapter_id,
        last_attempt_at: now,
        next_available_at,
        cooldown_days,
    })
}

/// Decides whether a new attempt is allowed at `now`.
pub fn evaluate(record: Option<&AccessGateRecord>, now: DateTime<Utc>) -> AccessDecision {
    match record {
        Some(record) if now < record.next_available_at => AccessDecision {
            allowed: false,
            next_available_at: Some(record.next_available_at),
            remaining_seconds: (record.next_available_at - now).num_seconds().max(0),
        },
        _ => AccessDecision::unlocked(),
    }
}

/// Parses an RFC 3339 timestamp supplied by a caller.
pub fn parse_timestamp(value: &str) -> QuizResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| QuizError::InvalidRequest(format!("invalid timestamp '{value}': {e}")))
}
