use crate::domain::entities::{Comment, Post};
use crate::domain::value_objects::{CommentId, PostId};
use async_trait::async_trait;

/// In-memory view state shared by the feed and the interaction controller.
/// This is the render model: the feed replaces or extends it page by page,
/// and optimistic mutations write into it before any network dispatch.
#[async_trait]
pub trait ViewCache: Send + Sync {
    /// Replace the visible feed wholesale.
    async fn set_posts(&self, posts: Vec<Post>);

    /// Append posts at the end of the feed. Callers de-duplicate first.
    async fn append_posts(&self, posts: Vec<Post>);

    async fn posts(&self) -> Vec<Post>;

    async fn get_post(&self, id: &PostId) -> Option<Post>;

    /// Write back an updated post. A post that is no longer visible is a
    /// no-op; the durable cache write has already happened by then.
    async fn update_post(&self, post: Post);

    async fn set_comments(&self, post_id: &PostId, comments: Vec<Comment>);

    async fn comments(&self, post_id: &PostId) -> Vec<Comment>;

    async fn get_comment(&self, comment_id: &CommentId) -> Option<Comment>;

    /// Replace a comment in place, wherever it sits (top level or one reply
    /// deep). Unknown ids are a no-op.
    async fn update_comment(&self, comment: Comment);

    async fn add_comment(&self, post_id: &PostId, comment: Comment);

    async fn add_reply(&self, parent_id: &CommentId, reply: Comment);

    async fn append_replies(
        &self,
        comment_id: &CommentId,
        replies: Vec<Comment>,
        has_more: bool,
        remaining: u32,
    );
}
