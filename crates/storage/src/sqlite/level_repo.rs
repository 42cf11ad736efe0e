use pathway_core::model::{LevelDefinition, LevelId};

use super::SqliteRepository;
use super::mapping::map_level_row;
use crate::repository::{LevelRepository, StorageError};

impl SqliteRepository {
    /// Insert or update a level definition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the write fails.
    pub async fn upsert_level(&self, level: &LevelDefinition) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO pathway_levels (level_number, title, description, week, points, is_locked)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(level_number) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                week = excluded.week,
                points = excluded.points,
                is_locked = excluded.is_locked
            ",
        )
        .bind(i64::from(level.id().value()))
        .bind(level.title())
        .bind(level.description())
        .bind(i64::from(level.week()))
        .bind(i64::from(level.base_points()))
        .bind(i64::from(level.admin_locked()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl LevelRepository for SqliteRepository {
    async fn list_levels(&self) -> Result<Vec<LevelDefinition>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT level_number, title, description, week, points, is_locked
            FROM pathway_levels
            ORDER BY level_number ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_level_row).collect()
    }

    async fn get_level(&self, id: LevelId) -> Result<Option<LevelDefinition>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT level_number, title, description, week, points, is_locked
            FROM pathway_levels
            WHERE level_number = ?1
            ",
        )
        .bind(i64::from(id.value()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_level_row).transpose()
    }
}
