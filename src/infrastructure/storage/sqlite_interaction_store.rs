use super::mappers::{kind_from_row, record_from_row, value_to_json};
use super::rows::InteractionRecordRow;
use crate::application::ports::interaction_repository::InteractionRepository;
use crate::domain::entities::InteractionRecord;
use crate::domain::value_objects::{InteractionKind, Namespace, SyncStatus};
use crate::shared::config::DatabaseConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::time::Duration;
use tracing::debug;

/// Durable interaction cache over SQLite. One row per (namespace, kind,
/// entity); every write is a whole-row upsert, so last-write-wins falls out
/// of the primary key.
pub struct SqliteInteractionStore {
    pool: SqlitePool,
}

impl SqliteInteractionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database named by the config and
    /// ensures the schema exists.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;
        Self::init_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS interaction_records (
                namespace TEXT NOT NULL,
                kind TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                value TEXT NOT NULL,
                sync_status TEXT NOT NULL,
                updated_at_ms INTEGER NOT NULL,
                PRIMARY KEY (namespace, kind, entity_id)
            )
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl InteractionRepository for SqliteInteractionStore {
    async fn get(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
    ) -> Result<Option<InteractionRecord>, AppError> {
        let row: Option<InteractionRecordRow> = sqlx::query_as(
            r#"
            SELECT namespace, kind, entity_id, value, sync_status, updated_at_ms
            FROM interaction_records
            WHERE namespace = ?1 AND kind = ?2 AND entity_id = ?3
            "#,
        )
        .bind(namespace.storage_key())
        .bind(kind.as_str())
        .bind(entity_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn set(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
        record: &InteractionRecord,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO interaction_records (
                namespace, kind, entity_id, value, sync_status, updated_at_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(namespace, kind, entity_id) DO UPDATE SET
                value = excluded.value,
                sync_status = excluded.sync_status,
                updated_at_ms = excluded.updated_at_ms
            "#,
        )
        .bind(namespace.storage_key())
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(value_to_json(record)?)
        .bind(record.status.as_str())
        .bind(record.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        debug!("Stored {} record for {} in {}", kind, entity_id, namespace);
        Ok(())
    }

    async fn delete(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            DELETE FROM interaction_records
            WHERE namespace = ?1 AND kind = ?2 AND entity_id = ?3
            "#,
        )
        .bind(namespace.storage_key())
        .bind(kind.as_str())
        .bind(entity_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
    ) -> Result<Vec<(String, InteractionRecord)>, AppError> {
        let rows: Vec<InteractionRecordRow> = sqlx::query_as(
            r#"
            SELECT namespace, kind, entity_id, value, sync_status, updated_at_ms
            FROM interaction_records
            WHERE namespace = ?1 AND kind = ?2
            ORDER BY updated_at_ms DESC
            "#,
        )
        .bind(namespace.storage_key())
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok((row.entity_id.clone(), record_from_row(row)?)))
            .collect()
    }

    async fn mark_synced(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE interaction_records
            SET sync_status = ?4, updated_at_ms = ?5
            WHERE namespace = ?1 AND kind = ?2 AND entity_id = ?3
            "#,
        )
        .bind(namespace.storage_key())
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(SyncStatus::Synced.as_str())
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_pending(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<(InteractionKind, String, InteractionRecord)>, AppError> {
        let rows: Vec<InteractionRecordRow> = sqlx::query_as(
            r#"
            SELECT namespace, kind, entity_id, value, sync_status, updated_at_ms
            FROM interaction_records
            WHERE namespace = ?1 AND sync_status = ?2
            ORDER BY updated_at_ms ASC
            "#,
        )
        .bind(namespace.storage_key())
        .bind(SyncStatus::PendingSync.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok((
                    kind_from_row(row)?,
                    row.entity_id.clone(),
                    record_from_row(row)?,
                ))
            })
            .collect()
    }
}
