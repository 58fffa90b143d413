use quiz_core::model::{CompletionSummary, LessonId};

use super::SqliteRepository;
use super::mapping::{map_completion_row, u64_to_i64};
use crate::repository::{CompletionLogRepository, CompletionRow, StorageError};

const SELECT_COLUMNS: &str = r"
    SELECT
        id, lesson_id, mode, outcome, correct_count, total,
        xp_earned, bonus_xp, lives_remaining, started_at, finished_at
    FROM completions
";

#[async_trait::async_trait]
impl CompletionLogRepository for SqliteRepository {
    async fn append_completion(&self, summary: &CompletionSummary) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO completions (
                    lesson_id, mode, outcome, correct_count, total,
                    xp_earned, bonus_xp, lives_remaining, started_at, finished_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(summary.lesson_id().as_str())
        .bind(summary.mode().as_str())
        .bind(summary.outcome().as_str())
        .bind(i64::from(summary.correct_count()))
        .bind(i64::from(summary.total()))
        .bind(u64_to_i64("xp_earned", summary.xp_earned())?)
        .bind(u64_to_i64("bonus_xp", summary.bonus_xp())?)
        .bind(summary.lives_remaining().map(i64::from))
        .bind(summary.started_at())
        .bind(summary.finished_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn get_completion(&self, id: i64) -> Result<CompletionSummary, StorageError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;

        Ok(map_completion_row(&row)?.summary)
    }

    async fn list_recent(
        &self,
        lesson_id: Option<&LessonId>,
        limit: u32,
    ) -> Result<Vec<CompletionRow>, StorageError> {
        let mut sql = String::from(SELECT_COLUMNS);
        if lesson_id.is_some() {
            sql.push_str(" WHERE lesson_id = ?1 ORDER BY finished_at DESC, id DESC LIMIT ?2");
        } else {
            sql.push_str(" ORDER BY finished_at DESC, id DESC LIMIT ?1");
        }

        let mut query = sqlx::query(&sql);
        if let Some(id) = lesson_id {
            query = query.bind(id.as_str());
        }
        query = query.bind(i64::from(limit));

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_completion_row(&row)?);
        }
        Ok(out)
    }
}
