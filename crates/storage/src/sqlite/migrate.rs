use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the consolidated migration for the current schema.
///
/// Creates pathway levels, per-student completions and the session key/value
/// table.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        tracing::info!(version = 1, "applying pathway schema migration");
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS pathway_levels (
                    level_number INTEGER PRIMARY KEY CHECK (level_number >= 0),
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    week INTEGER NOT NULL CHECK (week >= 1),
                    points INTEGER NOT NULL CHECK (points >= 0),
                    is_locked INTEGER NOT NULL DEFAULT 0 CHECK (is_locked IN (0, 1))
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // No foreign key on level_number: rows for unknown levels are ignored
        // when reconciling.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS pathway_level_completions (
                    id INTEGER PRIMARY KEY,
                    student_id TEXT NOT NULL,
                    level_number INTEGER NOT NULL,
                    points INTEGER NOT NULL CHECK (points >= 0),
                    completed_at TEXT NOT NULL,
                    UNIQUE (student_id, level_number)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS session_values (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_completions_student
                    ON pathway_level_completions (student_id, id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
