use crate::application::ports::sync_gateway::SyncGateway;
use crate::application::ports::view_cache::ViewCache;
use crate::domain::entities::Comment;
use crate::domain::value_objects::{CommentId, PostId};
use crate::shared::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Comment threads for a post. Submission is deliberately not optimistic:
/// the server assigns the id and timestamp, so a comment appears only once
/// the create call succeeds. Reply pagination is offset-based, with the
/// offset derived from the replies already held client-side.
pub struct CommentService {
    gateway: Arc<dyn SyncGateway>,
    view: Arc<dyn ViewCache>,
    reply_page_size: u32,
    loading_replies: Mutex<HashSet<String>>,
}

impl CommentService {
    pub fn new(gateway: Arc<dyn SyncGateway>, view: Arc<dyn ViewCache>, reply_page_size: u32) -> Self {
        Self {
            gateway,
            view,
            reply_page_size,
            loading_replies: Mutex::new(HashSet::new()),
        }
    }

    /// Fetches the comment thread for a post into the view cache. A fetch
    /// failure yields an empty thread, never stale comments from another
    /// post.
    pub async fn load_comments(&self, post_id: &PostId) -> Vec<Comment> {
        let comments = match self.gateway.fetch_comments(post_id).await {
            Ok(comments) => comments,
            Err(err) => {
                error!("Comment fetch failed for {post_id}: {err}");
                Vec::new()
            }
        };
        self.view.set_comments(post_id, comments.clone()).await;
        comments
    }

    /// Submits a new top-level comment and appends the server's copy to the
    /// thread. Blank content is rejected before any dispatch.
    pub async fn create_comment(
        &self,
        post_id: &PostId,
        content: &str,
    ) -> Result<Comment, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("Comment content cannot be empty"));
        }
        let comment = self.gateway.create_comment(post_id, content).await?;
        self.view.add_comment(post_id, comment.clone()).await;
        if let Some(mut post) = self.view.get_post(post_id).await {
            post.increment_comments();
            self.view.update_post(post).await;
        }
        Ok(comment)
    }

    /// Submits a reply under a top-level comment.
    pub async fn reply_to_comment(
        &self,
        comment_id: &CommentId,
        content: &str,
    ) -> Result<Comment, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("Reply content cannot be empty"));
        }
        let reply = self.gateway.reply_to_comment(comment_id, content).await?;
        self.view.add_reply(comment_id, reply.clone()).await;
        Ok(reply)
    }

    /// Fetches the next page of replies for a comment. The offset is the
    /// number of replies already held, so a reply posted locally in the
    /// meantime shifts the window instead of duplicating. Concurrent
    /// requests for the same comment collapse into one.
    pub async fn load_more_replies(&self, comment_id: &CommentId) -> Result<Vec<Comment>, AppError> {
        {
            let mut loading = self.loading_replies.lock().await;
            if !loading.insert(comment_id.as_str().to_string()) {
                debug!("Reply fetch for {comment_id} already in flight");
                return Ok(Vec::new());
            }
        }

        let offset = self
            .view
            .get_comment(comment_id)
            .await
            .map(|comment| comment.replies.len() as u32)
            .unwrap_or(0);

        let result = self
            .gateway
            .fetch_replies(comment_id, offset, self.reply_page_size)
            .await;

        let outcome = match result {
            Ok(page) => {
                self.view
                    .append_replies(
                        comment_id,
                        page.replies.clone(),
                        page.has_more,
                        page.remaining_count,
                    )
                    .await;
                Ok(page.replies)
            }
            Err(err) => Err(err),
        };

        self.loading_replies
            .lock()
            .await
            .remove(comment_id.as_str());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::sync_gateway::{
        BookmarkAck, CommentLikeAck, ReactionAck, ReactionCommand, RepliesPage,
    };
    use crate::domain::entities::Post;
    use crate::domain::value_objects::OptionId;
    use crate::infrastructure::cache::FeedViewCache;
    use async_trait::async_trait;
    use chrono::Utc;

    struct ReplyFetch {
        offset: u32,
        limit: u32,
    }

    #[derive(Default)]
    struct TestGateway {
        comments: tokio::sync::Mutex<Vec<Comment>>,
        reply_pages: tokio::sync::Mutex<Vec<RepliesPage>>,
        reply_fetches: tokio::sync::Mutex<Vec<ReplyFetch>>,
        fail_comments: bool,
        next_id: tokio::sync::Mutex<u32>,
    }

    impl TestGateway {
        async fn assign_id(&self) -> CommentId {
            let mut next = self.next_id.lock().await;
            *next += 1;
            CommentId::new(format!("server-c{}", next)).unwrap()
        }
    }

    #[async_trait]
    impl SyncGateway for TestGateway {
        async fn send_reaction(
            &self,
            _post_id: &PostId,
            _command: ReactionCommand,
        ) -> Result<ReactionAck, AppError> {
            Ok(ReactionAck::default())
        }

        async fn toggle_bookmark(&self, _post_id: &PostId) -> Result<BookmarkAck, AppError> {
            Ok(BookmarkAck::default())
        }

        async fn cast_poll_vote(
            &self,
            _post_id: &PostId,
            _option_id: OptionId,
        ) -> Result<(), AppError> {
            Ok(())
        }

        async fn withdraw_poll_vote(
            &self,
            _post_id: &PostId,
            _option_id: OptionId,
        ) -> Result<(), AppError> {
            Ok(())
        }

        async fn like_comment(&self, _comment_id: &CommentId) -> Result<CommentLikeAck, AppError> {
            Ok(CommentLikeAck::default())
        }

        async fn unlike_comment(
            &self,
            _comment_id: &CommentId,
        ) -> Result<CommentLikeAck, AppError> {
            Ok(CommentLikeAck::default())
        }

        async fn create_comment(
            &self,
            _post_id: &PostId,
            content: &str,
        ) -> Result<Comment, AppError> {
            Ok(Comment::new(
                self.assign_id().await,
                content.to_string(),
                Utc::now(),
            ))
        }

        async fn reply_to_comment(
            &self,
            _comment_id: &CommentId,
            content: &str,
        ) -> Result<Comment, AppError> {
            Ok(Comment::new(
                self.assign_id().await,
                content.to_string(),
                Utc::now(),
            ))
        }

        async fn fetch_comments(&self, _post_id: &PostId) -> Result<Vec<Comment>, AppError> {
            if self.fail_comments {
                return Err(AppError::network("simulated outage"));
            }
            Ok(self.comments.lock().await.clone())
        }

        async fn fetch_replies(
            &self,
            _comment_id: &CommentId,
            offset: u32,
            limit: u32,
        ) -> Result<RepliesPage, AppError> {
            self.reply_fetches
                .lock()
                .await
                .push(ReplyFetch { offset, limit });
            let mut pages = self.reply_pages.lock().await;
            if pages.is_empty() {
                return Ok(RepliesPage {
                    replies: Vec::new(),
                    has_more: false,
                    remaining_count: 0,
                });
            }
            Ok(pages.remove(0))
        }

        async fn track_view(&self, _post_id: &PostId) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn post_id(raw: &str) -> PostId {
        PostId::new(raw.to_string()).unwrap()
    }

    fn comment_id(raw: &str) -> CommentId {
        CommentId::new(raw.to_string()).unwrap()
    }

    fn comment(id: &str) -> Comment {
        Comment::new(comment_id(id), format!("comment {id}"), Utc::now())
    }

    struct Harness {
        service: CommentService,
        gateway: Arc<TestGateway>,
        view: Arc<FeedViewCache>,
    }

    fn harness(gateway: TestGateway) -> Harness {
        let gateway = Arc::new(gateway);
        let view = Arc::new(FeedViewCache::new());
        let service = CommentService::new(gateway.clone(), view.clone(), 3);
        Harness {
            service,
            gateway,
            view,
        }
    }

    #[tokio::test]
    async fn created_comment_uses_the_server_copy_and_bumps_the_count() {
        let h = harness(TestGateway::default());
        let pid = post_id("p1");
        h.view
            .set_posts(vec![Post::new(pid.clone(), "launch day".to_string(), Utc::now())])
            .await;
        h.view.set_comments(&pid, Vec::new()).await;

        let created = h.service.create_comment(&pid, "  congrats!  ").await.unwrap();
        assert_eq!(created.id.as_str(), "server-c1");
        assert_eq!(created.content, "congrats!");

        let thread = h.view.comments(&pid).await;
        assert_eq!(thread.len(), 1);
        assert_eq!(h.view.get_post(&pid).await.unwrap().comment_count, 1);
    }

    #[tokio::test]
    async fn blank_comments_are_rejected_without_dispatch() {
        let h = harness(TestGateway::default());
        let result = h.service.create_comment(&post_id("p1"), "   ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn failed_comment_fetch_yields_an_empty_thread() {
        let h = harness(TestGateway {
            fail_comments: true,
            ..TestGateway::default()
        });
        let pid = post_id("p1");
        let comments = h.service.load_comments(&pid).await;
        assert!(comments.is_empty());
        assert!(h.view.comments(&pid).await.is_empty());
    }

    #[tokio::test]
    async fn reply_pagination_offsets_by_replies_already_held() {
        let gateway = TestGateway::default();
        *gateway.reply_pages.lock().await = vec![
            RepliesPage {
                replies: vec![comment("r2"), comment("r3"), comment("r4")],
                has_more: true,
                remaining_count: 1,
            },
            RepliesPage {
                replies: vec![comment("r5")],
                has_more: false,
                remaining_count: 0,
            },
        ];
        let h = harness(gateway);
        let pid = post_id("p1");
        let mut parent = comment("c1");
        parent.replies = vec![comment("r1")];
        parent.has_more_replies = true;
        parent.remaining_replies = 4;
        h.view.set_comments(&pid, vec![parent]).await;

        let first = h.service.load_more_replies(&comment_id("c1")).await.unwrap();
        assert_eq!(first.len(), 3);
        let second = h.service.load_more_replies(&comment_id("c1")).await.unwrap();
        assert_eq!(second.len(), 1);

        let fetches = h.gateway.reply_fetches.lock().await;
        assert_eq!(fetches[0].offset, 1);
        assert_eq!(fetches[0].limit, 3);
        assert_eq!(fetches[1].offset, 4);

        let parent = h.view.get_comment(&comment_id("c1")).await.unwrap();
        assert_eq!(parent.replies.len(), 5);
        assert!(!parent.has_more_replies);
    }

    #[tokio::test]
    async fn local_reply_shifts_the_next_page_window() {
        let gateway = TestGateway::default();
        *gateway.reply_pages.lock().await = vec![RepliesPage {
            replies: vec![comment("r2")],
            has_more: false,
            remaining_count: 0,
        }];
        let h = harness(gateway);
        let pid = post_id("p1");
        let mut parent = comment("c1");
        parent.replies = vec![comment("r1")];
        h.view.set_comments(&pid, vec![parent]).await;

        h.service
            .reply_to_comment(&comment_id("c1"), "me too")
            .await
            .unwrap();
        h.service.load_more_replies(&comment_id("c1")).await.unwrap();

        let fetches = h.gateway.reply_fetches.lock().await;
        assert_eq!(fetches[0].offset, 2);
    }
}
