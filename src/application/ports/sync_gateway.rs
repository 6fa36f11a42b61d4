use crate::domain::entities::Comment;
use crate::domain::value_objects::{CommentId, OptionId, PostId, ReactionType};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Explicit reaction mutation. The backend's wire protocol is
/// toggle-by-resend (sending the current type again removes it), which makes
/// intent ambiguous at call sites; gateways translate these commands into
/// the right wire calls so callers never reason about resend semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionCommand {
    Add(ReactionType),
    Remove(ReactionType),
    Replace {
        from: ReactionType,
        to: ReactionType,
    },
}

impl ReactionCommand {
    /// The reaction the user ends up with, if any.
    pub fn resulting(&self) -> Option<ReactionType> {
        match self {
            ReactionCommand::Add(reaction) => Some(*reaction),
            ReactionCommand::Remove(_) => None,
            ReactionCommand::Replace { to, .. } => Some(*to),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionAck {
    /// Server-recomputed count, when the backend supplies one.
    pub like_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkAck {
    pub bookmarked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentLikeAck {
    pub like_count: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RepliesPage {
    pub replies: Vec<Comment>,
    pub has_more: bool,
    pub remaining_count: u32,
}

/// Remote mutations and comment fetches. Implementations settle every call
/// into a `Result`; nothing panics or leaks transport errors across this
/// boundary.
#[async_trait]
pub trait SyncGateway: Send + Sync {
    async fn send_reaction(
        &self,
        post_id: &PostId,
        command: ReactionCommand,
    ) -> Result<ReactionAck, AppError>;

    async fn toggle_bookmark(&self, post_id: &PostId) -> Result<BookmarkAck, AppError>;

    async fn cast_poll_vote(&self, post_id: &PostId, option_id: OptionId) -> Result<(), AppError>;

    async fn withdraw_poll_vote(
        &self,
        post_id: &PostId,
        option_id: OptionId,
    ) -> Result<(), AppError>;

    async fn like_comment(&self, comment_id: &CommentId) -> Result<CommentLikeAck, AppError>;

    async fn unlike_comment(&self, comment_id: &CommentId) -> Result<CommentLikeAck, AppError>;

    async fn create_comment(&self, post_id: &PostId, content: &str) -> Result<Comment, AppError>;

    async fn reply_to_comment(
        &self,
        comment_id: &CommentId,
        content: &str,
    ) -> Result<Comment, AppError>;

    async fn fetch_comments(&self, post_id: &PostId) -> Result<Vec<Comment>, AppError>;

    async fn fetch_replies(
        &self,
        comment_id: &CommentId,
        offset: u32,
        limit: u32,
    ) -> Result<RepliesPage, AppError>;

    async fn track_view(&self, post_id: &PostId) -> Result<(), AppError>;
}
