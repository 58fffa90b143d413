use quiz_core::model::{CompletionSummary, LessonId, Mode, RunOutcome};
use sqlx::Row;

use crate::repository::{CompletionRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_completion_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CompletionRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let lesson_id = LessonId::new(row.try_get::<String, _>("lesson_id").map_err(ser)?);
    let mode: Mode = row
        .try_get::<String, _>("mode")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let outcome: RunOutcome = row
        .try_get::<String, _>("outcome")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let correct_count = u32_from_i64(
        "correct_count",
        row.try_get::<i64, _>("correct_count").map_err(ser)?,
    )?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let xp_earned = u64_from_i64(
        "xp_earned",
        row.try_get::<i64, _>("xp_earned").map_err(ser)?,
    )?;
    let bonus_xp = u64_from_i64("bonus_xp", row.try_get::<i64, _>("bonus_xp").map_err(ser)?)?;
    let lives_remaining = row
        .try_get::<Option<i64>, _>("lives_remaining")
        .map_err(ser)?
        .map(|v| u32_from_i64("lives_remaining", v))
        .transpose()?;
    let started_at = row.try_get("started_at").map_err(ser)?;
    let finished_at = row.try_get("finished_at").map_err(ser)?;

    let summary = CompletionSummary::from_persisted(
        lesson_id,
        mode,
        outcome,
        correct_count,
        total,
        xp_earned,
        bonus_xp,
        lives_remaining,
        started_at,
        finished_at,
    )
    .map_err(ser)?;

    Ok(CompletionRow::new(id, summary))
}
