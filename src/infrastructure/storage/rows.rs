use sqlx::FromRow;

/// Raw shape of one `interaction_records` row. The `value` column holds the
/// serialized `InteractionValue`; `sync_status` uses the `SyncStatus` string
/// forms.
#[derive(Debug, Clone, FromRow)]
pub struct InteractionRecordRow {
    pub namespace: String,
    pub kind: String,
    pub entity_id: String,
    pub value: String,
    pub sync_status: String,
    pub updated_at_ms: i64,
}
