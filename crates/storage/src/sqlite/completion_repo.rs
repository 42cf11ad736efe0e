use chrono::Utc;
use pathway_core::model::{CompletionRecord, StudentId};

use super::SqliteRepository;
use super::mapping::map_completion_row;
use crate::repository::{CompletionRepository, StorageError};

impl SqliteRepository {
    /// Record that a student completed a level. A second completion of the
    /// same level replaces the awarded points.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the write fails.
    pub async fn record_completion(
        &self,
        student: &StudentId,
        record: CompletionRecord,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO pathway_level_completions (student_id, level_number, points, completed_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(student_id, level_number) DO UPDATE SET
                points = excluded.points,
                completed_at = excluded.completed_at
            ",
        )
        .bind(student.as_str())
        .bind(i64::from(record.level_id.value()))
        .bind(i64::from(record.points))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl CompletionRepository for SqliteRepository {
    async fn list_completions(
        &self,
        student: &StudentId,
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT level_number, points
            FROM pathway_level_completions
            WHERE student_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(student.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_completion_row).collect()
    }
}
