use crate::domain::value_objects::{InteractionKind, OptionId, ReactionType, SyncStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The value half of a cached interaction record. One variant per
/// interaction kind; the variant tag doubles as the serialized
/// discriminator. The reaction emoji is derived from the type rather than
/// stored, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionValue {
    Bookmark { bookmarked: bool },
    Reaction { reaction: ReactionType },
    PollSelection { options: Vec<OptionId> },
    CommentLike { liked: bool, count: u32 },
}

impl InteractionValue {
    pub fn kind(&self) -> InteractionKind {
        match self {
            InteractionValue::Bookmark { .. } => InteractionKind::Bookmark,
            InteractionValue::Reaction { .. } => InteractionKind::Reaction,
            InteractionValue::PollSelection { .. } => InteractionKind::PollVote,
            InteractionValue::CommentLike { .. } => InteractionKind::CommentLike,
        }
    }
}

/// One durable record per (namespace, kind, entity). Overwritten whole on
/// every toggle; no TTL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub value: InteractionValue,
    pub status: SyncStatus,
    pub updated_at: DateTime<Utc>,
}

impl InteractionRecord {
    /// A freshly applied optimistic write, not yet confirmed remotely.
    pub fn pending(value: InteractionValue) -> Self {
        Self {
            value,
            status: SyncStatus::PendingSync,
            updated_at: Utc::now(),
        }
    }

    pub fn synced(value: InteractionValue) -> Self {
        Self {
            value,
            status: SyncStatus::Synced,
            updated_at: Utc::now(),
        }
    }

    pub fn mark_synced(&mut self) {
        self.status = SyncStatus::Synced;
        self.updated_at = Utc::now();
    }

    pub fn kind(&self) -> InteractionKind {
        self.value.kind()
    }
}
