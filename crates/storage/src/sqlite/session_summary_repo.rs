use quiz_core::model::SessionSummary;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, u32_from_i64};
use crate::repository::{SessionSummaryRepository, SessionSummaryRow, StorageError};

fn map_summary_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionSummary, StorageError> {
    let label: String = row.try_get("label").map_err(ser)?;
    let started_at = row.try_get("started_at").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;
    let count = |field: &'static str| -> Result<u32, StorageError> {
        u32_from_i64(field, row.try_get::<i64, _>(field).map_err(ser)?)
    };

    SessionSummary::from_persisted(
        label,
        started_at,
        completed_at,
        count("total")?,
        count("answered")?,
        count("correct")?,
        count("unknown")?,
    )
    .map_err(ser)
}

#[async_trait::async_trait]
impl SessionSummaryRepository for SqliteRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO session_summaries (
                    label, started_at, completed_at, total, answered, correct, unknown
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(summary.label())
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .bind(i64::from(summary.total()))
        .bind(i64::from(summary.answered()))
        .bind(i64::from(summary.correct()))
        .bind(i64::from(summary.unknown()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn replace_summary(
        &self,
        id: i64,
        summary: &SessionSummary,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
                UPDATE session_summaries
                SET label = ?2, started_at = ?3, completed_at = ?4,
                    total = ?5, answered = ?6, correct = ?7, unknown = ?8
                WHERE id = ?1
            ",
        )
        .bind(id)
        .bind(summary.label())
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .bind(i64::from(summary.total()))
        .bind(i64::from(summary.answered()))
        .bind(i64::from(summary.correct()))
        .bind(i64::from(summary.unknown()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let row = sqlx::query(
            r"
                SELECT label, started_at, completed_at, total, answered, correct, unknown
                FROM session_summaries
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_summary_row(&row)
    }

    async fn list_summary_rows(&self, limit: u32) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, label, started_at, completed_at, total, answered, correct, unknown
                FROM session_summaries
                ORDER BY completed_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id").map_err(ser)?;
            out.push(SessionSummaryRow::new(id, map_summary_row(&row)?));
        }
        Ok(out)
    }
}
