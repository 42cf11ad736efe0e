use pathway_core::model::{CompletionRecord, LevelDefinition, LevelId};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} out of range: {v}")))
}

pub(crate) fn level_id_from_i64(v: i64) -> Result<LevelId, StorageError> {
    Ok(LevelId::new(i64_to_u32("level_number", v)?))
}

pub(crate) fn map_level_row(row: &sqlx::sqlite::SqliteRow) -> Result<LevelDefinition, StorageError> {
    let is_locked: i64 = row.try_get("is_locked").map_err(ser)?;

    LevelDefinition::new(
        level_id_from_i64(row.try_get::<i64, _>("level_number").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        i64_to_u32("week", row.try_get::<i64, _>("week").map_err(ser)?)?,
        i64_to_u32("points", row.try_get::<i64, _>("points").map_err(ser)?)?,
        is_locked == 1,
    )
    .map_err(ser)
}

pub(crate) fn map_completion_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CompletionRecord, StorageError> {
    Ok(CompletionRecord::new(
        level_id_from_i64(row.try_get::<i64, _>("level_number").map_err(ser)?)?,
        i64_to_u32("points", row.try_get::<i64, _>("points").map_err(ser)?)?,
    ))
}
