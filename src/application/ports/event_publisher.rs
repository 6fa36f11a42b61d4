use crate::domain::value_objects::{CommentId, OptionId, PostId, ReactionType};

/// Cross-component notification emitted after each applied interaction
/// mutation. Consumers (profile pages, badges) subscribe through the
/// publisher implementation instead of a global broadcast bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    ReactionChanged {
        post_id: PostId,
        reaction: Option<ReactionType>,
        like_count: u32,
    },
    BookmarkChanged {
        post_id: PostId,
        bookmarked: bool,
    },
    PollVoteChanged {
        post_id: PostId,
        selections: Vec<OptionId>,
    },
    CommentLikeChanged {
        comment_id: CommentId,
        liked: bool,
        like_count: u32,
    },
}

pub trait InteractionEvents: Send + Sync {
    /// Fire-and-forget; publishing to zero subscribers is not an error.
    fn publish(&self, event: InteractionEvent);
}
