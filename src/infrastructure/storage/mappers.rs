use super::rows::InteractionRecordRow;
use crate::domain::entities::{InteractionRecord, InteractionValue};
use crate::domain::value_objects::{InteractionKind, SyncStatus};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};

pub fn record_from_row(row: &InteractionRecordRow) -> Result<InteractionRecord, AppError> {
    let value: InteractionValue = serde_json::from_str(&row.value)?;
    let updated_at = DateTime::<Utc>::from_timestamp_millis(row.updated_at_ms)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp: {}", row.updated_at_ms)))?;
    Ok(InteractionRecord {
        value,
        status: SyncStatus::from(row.sync_status.as_str()),
        updated_at,
    })
}

pub fn kind_from_row(row: &InteractionRecordRow) -> Result<InteractionKind, AppError> {
    row.kind.parse::<InteractionKind>().map_err(AppError::Database)
}

pub fn value_to_json(record: &InteractionRecord) -> Result<String, AppError> {
    Ok(serde_json::to_string(&record.value)?)
}
