use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Discriminator for the four user-scoped interaction families the cache
/// stores. Also used as the storage column value, so the string forms are
/// part of the persisted format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Reaction,
    Bookmark,
    PollVote,
    CommentLike,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Reaction => "reaction",
            InteractionKind::Bookmark => "bookmark",
            InteractionKind::PollVote => "poll_vote",
            InteractionKind::CommentLike => "comment_like",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reaction" => Ok(InteractionKind::Reaction),
            "bookmark" => Ok(InteractionKind::Bookmark),
            "poll_vote" => Ok(InteractionKind::PollVote),
            "comment_like" => Ok(InteractionKind::CommentLike),
            other => Err(format!("Unknown interaction kind: {}", other)),
        }
    }
}
