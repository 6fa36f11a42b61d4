use crate::application::ports::interaction_repository::InteractionRepository;
use crate::domain::entities::InteractionRecord;
use crate::domain::value_objects::{InteractionKind, Namespace, SyncStatus};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Key = (String, InteractionKind, String);

/// Non-durable `InteractionRepository` for tests and ephemeral sessions.
/// Same last-write-wins semantics as the SQLite store, keyed identically.
#[derive(Clone, Default)]
pub struct MemoryInteractionStore {
    records: Arc<RwLock<HashMap<Key, InteractionRecord>>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(namespace: &Namespace, kind: InteractionKind, entity_id: &str) -> Key {
        (namespace.storage_key(), kind, entity_id.to_string())
    }
}

#[async_trait]
impl InteractionRepository for MemoryInteractionStore {
    async fn get(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
    ) -> Result<Option<InteractionRecord>, AppError> {
        let records = self.records.read().await;
        Ok(records.get(&Self::key(namespace, kind, entity_id)).cloned())
    }

    async fn set(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
        record: &InteractionRecord,
    ) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        records.insert(Self::key(namespace, kind, entity_id), record.clone());
        Ok(())
    }

    async fn delete(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
    ) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        records.remove(&Self::key(namespace, kind, entity_id));
        Ok(())
    }

    async fn list(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
    ) -> Result<Vec<(String, InteractionRecord)>, AppError> {
        let ns = namespace.storage_key();
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|((namespace, record_kind, _), _)| namespace == &ns && *record_kind == kind)
            .map(|((_, _, entity_id), record)| (entity_id.clone(), record.clone()))
            .collect())
    }

    async fn mark_synced(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
    ) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(&Self::key(namespace, kind, entity_id)) {
            record.mark_synced();
        }
        Ok(())
    }

    async fn list_pending(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<(InteractionKind, String, InteractionRecord)>, AppError> {
        let ns = namespace.storage_key();
        let records = self.records.read().await;
        let mut pending: Vec<(InteractionKind, String, InteractionRecord)> = records
            .iter()
            .filter(|((namespace, _, _), record)| {
                namespace == &ns && record.status == SyncStatus::PendingSync
            })
            .map(|((_, kind, entity_id), record)| (*kind, entity_id.clone(), record.clone()))
            .collect();
        pending.sort_by_key(|(_, _, record)| record.updated_at);
        Ok(pending)
    }
}
