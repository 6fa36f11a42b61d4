use crate::domain::entities::InteractionRecord;
use crate::domain::value_objects::{InteractionKind, Namespace};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable, user-namespaced storage for interaction records. Pure storage:
/// implementations never perform network I/O or aggregation, and every write
/// is last-write-wins for its (namespace, kind, entity) key.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    async fn get(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
    ) -> Result<Option<InteractionRecord>, AppError>;

    async fn set(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
        record: &InteractionRecord,
    ) -> Result<(), AppError>;

    async fn delete(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
    ) -> Result<(), AppError>;

    async fn list(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
    ) -> Result<Vec<(String, InteractionRecord)>, AppError>;

    /// Flips an existing record to `Synced`. Missing records are a no-op;
    /// the confirmation may race a delete issued by a newer user action.
    async fn mark_synced(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
    ) -> Result<(), AppError>;

    /// Records still awaiting remote confirmation, for a future
    /// reconciliation pass.
    async fn list_pending(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<(InteractionKind, String, InteractionRecord)>, AppError>;
}
