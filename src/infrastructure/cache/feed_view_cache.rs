use crate::application::ports::view_cache::ViewCache;
use crate::domain::entities::{Comment, Post};
use crate::domain::value_objects::{CommentId, PostId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory render model: the ordered feed plus per-post comment threads.
/// Shared by the feed controller (page writes) and the interaction
/// controller (optimistic writes).
#[derive(Clone)]
pub struct FeedViewCache {
    posts: Arc<RwLock<Vec<Post>>>,
    comments: Arc<RwLock<HashMap<String, Vec<Comment>>>>,
}

impl FeedViewCache {
    pub fn new() -> Self {
        Self {
            posts: Arc::new(RwLock::new(Vec::new())),
            comments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        let posts = self.posts.read().await;
        posts.len()
    }

    pub async fn is_empty(&self) -> bool {
        let posts = self.posts.read().await;
        posts.is_empty()
    }
}

impl Default for FeedViewCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Replies nest exactly one level, so a thread is fully covered by the top
/// level plus each comment's replies.
fn locate<'a>(thread: &'a mut [Comment], id: &CommentId) -> Option<&'a mut Comment> {
    match thread.iter().position(|comment| &comment.id == id) {
        Some(index) => thread.get_mut(index),
        None => thread
            .iter_mut()
            .flat_map(|comment| comment.replies.iter_mut())
            .find(|reply| &reply.id == id),
    }
}

#[async_trait]
impl ViewCache for FeedViewCache {
    async fn set_posts(&self, posts: Vec<Post>) {
        let mut guard = self.posts.write().await;
        *guard = posts;
    }

    async fn append_posts(&self, posts: Vec<Post>) {
        let mut guard = self.posts.write().await;
        guard.extend(posts);
    }

    async fn posts(&self) -> Vec<Post> {
        let guard = self.posts.read().await;
        guard.clone()
    }

    async fn get_post(&self, id: &PostId) -> Option<Post> {
        let guard = self.posts.read().await;
        guard.iter().find(|post| &post.id == id).cloned()
    }

    async fn update_post(&self, post: Post) {
        let mut guard = self.posts.write().await;
        if let Some(slot) = guard.iter_mut().find(|existing| existing.id == post.id) {
            *slot = post;
        }
    }

    async fn set_comments(&self, post_id: &PostId, comments: Vec<Comment>) {
        let mut guard = self.comments.write().await;
        guard.insert(post_id.as_str().to_string(), comments);
    }

    async fn comments(&self, post_id: &PostId) -> Vec<Comment> {
        let guard = self.comments.read().await;
        guard.get(post_id.as_str()).cloned().unwrap_or_default()
    }

    async fn get_comment(&self, comment_id: &CommentId) -> Option<Comment> {
        let guard = self.comments.read().await;
        for thread in guard.values() {
            for comment in thread {
                if &comment.id == comment_id {
                    return Some(comment.clone());
                }
                if let Some(reply) = comment.replies.iter().find(|reply| &reply.id == comment_id) {
                    return Some(reply.clone());
                }
            }
        }
        None
    }

    async fn update_comment(&self, comment: Comment) {
        let mut guard = self.comments.write().await;
        for thread in guard.values_mut() {
            if let Some(slot) = locate(thread, &comment.id) {
                *slot = comment;
                return;
            }
        }
    }

    async fn add_comment(&self, post_id: &PostId, comment: Comment) {
        let mut guard = self.comments.write().await;
        guard
            .entry(post_id.as_str().to_string())
            .or_default()
            .push(comment);
    }

    async fn add_reply(&self, parent_id: &CommentId, reply: Comment) {
        let mut guard = self.comments.write().await;
        for thread in guard.values_mut() {
            if let Some(parent) = thread.iter_mut().find(|comment| &comment.id == parent_id) {
                parent.add_reply(reply);
                return;
            }
        }
    }

    async fn append_replies(
        &self,
        comment_id: &CommentId,
        replies: Vec<Comment>,
        has_more: bool,
        remaining: u32,
    ) {
        let mut guard = self.comments.write().await;
        for thread in guard.values_mut() {
            if let Some(parent) = thread.iter_mut().find(|comment| &comment.id == comment_id) {
                parent.append_replies(replies, has_more, remaining);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(id: &str) -> Post {
        Post::new(
            PostId::new(id.to_string()).expect("valid id"),
            format!("content of {id}"),
            Utc::now(),
        )
    }

    fn comment(id: &str) -> Comment {
        Comment::new(
            CommentId::new(id.to_string()).expect("valid id"),
            format!("comment {id}"),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn set_posts_replaces_wholesale() {
        let cache = FeedViewCache::new();
        cache.set_posts(vec![post("a"), post("b")]).await;
        assert_eq!(cache.len().await, 2);

        cache.set_posts(vec![post("c")]).await;
        let posts = cache.posts().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id.as_str(), "c");
    }

    #[tokio::test]
    async fn update_post_ignores_unknown_ids() {
        let cache = FeedViewCache::new();
        cache.set_posts(vec![post("a")]).await;

        let mut updated = post("a");
        updated.like_count = 7;
        cache.update_post(updated).await;
        cache.update_post(post("ghost")).await;

        let posts = cache.posts().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].like_count, 7);
    }

    #[tokio::test]
    async fn reply_updates_reach_one_level_deep() {
        let cache = FeedViewCache::new();
        let post_id = PostId::new("p1".to_string()).expect("valid id");
        let mut parent = comment("c1");
        parent.add_reply(comment("r1"));
        cache.set_comments(&post_id, vec![parent]).await;

        let mut reply = comment("r1");
        reply.like_count = 3;
        cache.update_comment(reply).await;

        let fetched = cache
            .get_comment(&CommentId::new("r1".to_string()).expect("valid id"))
            .await
            .expect("reply present");
        assert_eq!(fetched.like_count, 3);
    }

    #[tokio::test]
    async fn append_replies_advances_parent_state() {
        let cache = FeedViewCache::new();
        let post_id = PostId::new("p1".to_string()).expect("valid id");
        let parent_id = CommentId::new("c1".to_string()).expect("valid id");
        cache.set_comments(&post_id, vec![comment("c1")]).await;

        cache
            .append_replies(&parent_id, vec![comment("r1"), comment("r2")], true, 4)
            .await;

        let parent = cache.get_comment(&parent_id).await.expect("parent present");
        assert_eq!(parent.replies.len(), 2);
        assert!(parent.has_more_replies);
        assert_eq!(parent.remaining_replies, 4);
    }
}
