use crate::application::ports::feed_gateway::{
    FeedCursor, FeedFilters, FeedGateway, FeedStrategy,
};
use crate::application::ports::sync_gateway::SyncGateway;
use crate::application::ports::view_cache::ViewCache;
use crate::domain::entities::Post;
use crate::shared::config::FeedConfig;
use crate::shared::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Default)]
struct FeedState {
    strategy: FeedStrategy,
    filters: FeedFilters,
    cursor: Option<FeedCursor>,
    exhausted: bool,
}

/// Cursor-paginated feed loader. Loads replace the view cache wholesale;
/// `load_more` extends it, de-duplicating against posts already visible. A
/// single in-flight guard makes rapid scroll notifications cheap no-ops.
pub struct FeedService {
    gateway: Arc<dyn FeedGateway>,
    sync: Arc<dyn SyncGateway>,
    view: Arc<dyn ViewCache>,
    config: FeedConfig,
    state: RwLock<FeedState>,
    in_flight: AtomicBool,
    viewed: RwLock<HashSet<String>>,
}

impl FeedService {
    pub fn new(
        gateway: Arc<dyn FeedGateway>,
        sync: Arc<dyn SyncGateway>,
        view: Arc<dyn ViewCache>,
        config: FeedConfig,
    ) -> Self {
        Self {
            gateway,
            sync,
            view,
            config,
            state: RwLock::new(FeedState::default()),
            in_flight: AtomicBool::new(false),
            viewed: RwLock::new(HashSet::new()),
        }
    }

    /// Loads the first page for a strategy and filter set, replacing the
    /// visible feed. A fetch failure leaves an empty feed rather than stale
    /// posts from the previous strategy.
    pub async fn load(&self, strategy: FeedStrategy, filters: FeedFilters) -> Vec<Post> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("Feed load skipped, another request is in flight");
            return self.view.posts().await;
        }

        {
            let mut state = self.state.write().await;
            state.strategy = strategy;
            state.filters = filters.clone();
            state.cursor = None;
            state.exhausted = false;
        }

        let result = self
            .gateway
            .fetch_page(strategy, &filters, None, self.config.page_size)
            .await;
        let posts = match result {
            Ok(page) => {
                let mut state = self.state.write().await;
                state.exhausted = page.next_cursor.is_none();
                state.cursor = page.next_cursor;
                self.apply_topic_filter(page.posts, &filters)
            }
            Err(err) => {
                error!("Feed load failed for strategy {strategy}: {err}");
                let mut state = self.state.write().await;
                state.exhausted = true;
                Vec::new()
            }
        };

        self.view.set_posts(posts.clone()).await;
        self.in_flight.store(false, Ordering::SeqCst);
        posts
    }

    /// Fetches the next page and appends it, dropping any post already in
    /// the view. Returns the posts actually appended.
    pub async fn load_more(&self) -> Vec<Post> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("Feed load_more skipped, another request is in flight");
            return Vec::new();
        }

        let (strategy, filters, cursor, exhausted) = {
            let state = self.state.read().await;
            (
                state.strategy,
                state.filters.clone(),
                state.cursor.clone(),
                state.exhausted,
            )
        };
        if exhausted {
            self.in_flight.store(false, Ordering::SeqCst);
            return Vec::new();
        }

        let result = self
            .gateway
            .fetch_page(strategy, &filters, cursor.as_ref(), self.config.page_size)
            .await;
        let appended = match result {
            Ok(page) => {
                {
                    let mut state = self.state.write().await;
                    state.exhausted = page.next_cursor.is_none();
                    state.cursor = page.next_cursor;
                }
                let filtered = self.apply_topic_filter(page.posts, &filters);
                let seen: HashSet<String> = self
                    .view
                    .posts()
                    .await
                    .into_iter()
                    .map(|post| post.id.as_str().to_string())
                    .collect();
                let fresh: Vec<Post> = filtered
                    .into_iter()
                    .filter(|post| !seen.contains(post.id.as_str()))
                    .collect();
                self.view.append_posts(fresh.clone()).await;
                fresh
            }
            Err(err) => {
                // The current page stays visible; the next scroll retries.
                warn!("Feed load_more failed: {err}");
                Vec::new()
            }
        };

        self.in_flight.store(false, Ordering::SeqCst);
        appended
    }

    /// Scroll position update from the UI. Triggers `load_more` once the
    /// remaining scroll distance drops below the configured threshold.
    pub async fn notify_scroll(&self, remaining_px: f64) -> Vec<Post> {
        if remaining_px <= self.config.scroll_threshold {
            self.load_more().await
        } else {
            Vec::new()
        }
    }

    pub async fn has_more(&self) -> bool {
        !self.state.read().await.exhausted
    }

    /// Reports a post impression to the backend, at most once per session
    /// per post. Failures are logged and forgotten; view tracking is
    /// best-effort.
    pub async fn track_view(&self, post: &Post) -> Result<(), AppError> {
        {
            let mut viewed = self.viewed.write().await;
            if !viewed.insert(post.id.as_str().to_string()) {
                return Ok(());
            }
        }
        if let Err(err) = self.sync.track_view(&post.id).await {
            debug!("View tracking failed for {}: {err}", post.id);
        }
        if let Some(mut cached) = self.view.get_post(&post.id).await {
            cached.increment_views();
            self.view.update_post(cached).await;
        }
        Ok(())
    }

    /// Server results are trusted for topic scoping, but a post that clearly
    /// does not match the requested topic is dropped client-side. Applied
    /// only when a topic filter is set, so re-filtering is idempotent.
    fn apply_topic_filter(&self, posts: Vec<Post>, filters: &FeedFilters) -> Vec<Post> {
        match filters.topic.as_deref() {
            Some(topic) if !topic.trim().is_empty() => posts
                .into_iter()
                .filter(|post| post.matches_topic(topic))
                .collect(),
            _ => posts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::feed_gateway::FeedPage;
    use crate::application::ports::sync_gateway::{
        BookmarkAck, CommentLikeAck, ReactionAck, ReactionCommand, RepliesPage,
    };
    use crate::domain::entities::Comment;
    use crate::domain::value_objects::{CommentId, OptionId, PostId};
    use crate::infrastructure::cache::FeedViewCache;
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::{Mutex, Notify, oneshot};

    struct PageRequest {
        cursor: Option<String>,
    }

    struct TestFeedGateway {
        pages: Mutex<Vec<Result<FeedPage, AppError>>>,
        requests: Mutex<Vec<PageRequest>>,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        entered: Notify,
    }

    impl TestFeedGateway {
        fn new(pages: Vec<Result<FeedPage, AppError>>) -> Self {
            Self {
                pages: Mutex::new(pages),
                requests: Mutex::new(Vec::new()),
                gate: Mutex::new(None),
                entered: Notify::new(),
            }
        }

        async fn request_count(&self) -> usize {
            self.requests.lock().await.len()
        }
    }

    #[async_trait]
    impl FeedGateway for TestFeedGateway {
        async fn fetch_page(
            &self,
            _strategy: FeedStrategy,
            _filters: &FeedFilters,
            cursor: Option<&FeedCursor>,
            _limit: u32,
        ) -> Result<FeedPage, AppError> {
            self.requests.lock().await.push(PageRequest {
                cursor: cursor.map(|c| c.as_str().to_string()),
            });
            let gate = self.gate.lock().await.take();
            if let Some(gate) = gate {
                self.entered.notify_one();
                let _ = gate.await;
            }
            let mut pages = self.pages.lock().await;
            if pages.is_empty() {
                return Ok(FeedPage {
                    posts: Vec::new(),
                    next_cursor: None,
                    total: None,
                });
            }
            pages.remove(0)
        }
    }

    #[derive(Default)]
    struct TrackingSyncGateway {
        tracked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SyncGateway for TrackingSyncGateway {
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
            _content: &str,
        ) -> Result<Comment, AppError> {
            unimplemented!("not exercised by feed tests")
        }

        async fn reply_to_comment(
            &self,
            _comment_id: &CommentId,
            _content: &str,
        ) -> Result<Comment, AppError> {
            unimplemented!("not exercised by feed tests")
        }

        async fn fetch_comments(&self, _post_id: &PostId) -> Result<Vec<Comment>, AppError> {
            Ok(Vec::new())
        }

        async fn fetch_replies(
            &self,
            _comment_id: &CommentId,
            _offset: u32,
            _limit: u32,
        ) -> Result<RepliesPage, AppError> {
            Ok(RepliesPage {
                replies: Vec::new(),
                has_more: false,
                remaining_count: 0,
            })
        }

        async fn track_view(&self, post_id: &PostId) -> Result<(), AppError> {
            self.tracked.lock().await.push(post_id.as_str().to_string());
            Ok(())
        }
    }

    fn post(id: &str) -> Post {
        Post::new(
            PostId::new(id.to_string()).unwrap(),
            format!("content of {id}"),
            Utc::now(),
        )
    }

    fn page(ids: &[&str], next: Option<&str>) -> Result<FeedPage, AppError> {
        Ok(FeedPage {
            posts: ids.iter().map(|id| post(id)).collect(),
            next_cursor: next.and_then(FeedCursor::parse),
            total: None,
        })
    }

    fn config() -> FeedConfig {
        FeedConfig {
            page_size: 20,
            reply_page_size: 3,
            scroll_threshold: 200.0,
        }
    }

    struct Harness {
        service: Arc<FeedService>,
        gateway: Arc<TestFeedGateway>,
        sync: Arc<TrackingSyncGateway>,
        view: Arc<FeedViewCache>,
    }

    fn harness(pages: Vec<Result<FeedPage, AppError>>) -> Harness {
        let gateway = Arc::new(TestFeedGateway::new(pages));
        let sync = Arc::new(TrackingSyncGateway::default());
        let view = Arc::new(FeedViewCache::new());
        let service = Arc::new(FeedService::new(
            gateway.clone(),
            sync.clone(),
            view.clone(),
            config(),
        ));
        Harness {
            service,
            gateway,
            sync,
            view,
        }
    }

    #[tokio::test]
    async fn load_more_echoes_the_cursor_and_deduplicates() {
        let h = harness(vec![
            page(&["p1", "p2"], Some("c1")),
            // Overlapping page, as ranked feeds produce under churn.
            page(&["p2", "p3"], None),
        ]);

        let first = h
            .service
            .load(FeedStrategy::Latest, FeedFilters::default())
            .await;
        assert_eq!(first.len(), 2);

        let appended = h.service.load_more().await;
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].id.as_str(), "p3");

        let visible = h.view.posts().await;
        let ids: Vec<&str> = visible.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);

        let requests = h.gateway.requests.lock().await;
        assert_eq!(requests[0].cursor, None);
        assert_eq!(requests[1].cursor, Some("c1".to_string()));
    }

    #[tokio::test]
    async fn exhausted_feed_stops_requesting() {
        let h = harness(vec![page(&["p1"], None)]);
        h.service
            .load(FeedStrategy::Latest, FeedFilters::default())
            .await;
        assert!(!h.service.has_more().await);

        let appended = h.service.load_more().await;
        assert!(appended.is_empty());
        assert_eq!(h.gateway.request_count().await, 1);
    }

    #[tokio::test]
    async fn concurrent_load_more_is_a_single_request() {
        let h = harness(vec![
            page(&["p1"], Some("c1")),
            page(&["p2"], Some("c2")),
        ]);
        h.service
            .load(FeedStrategy::Latest, FeedFilters::default())
            .await;

        let (release, gate) = oneshot::channel();
        *h.gateway.gate.lock().await = Some(gate);

        let service = h.service.clone();
        let first = tokio::spawn(async move { service.load_more().await });
        h.gateway.entered.notified().await;

        // While the first request is parked, further notifications no-op.
        assert!(h.service.notify_scroll(50.0).await.is_empty());
        assert!(h.service.load_more().await.is_empty());

        release.send(()).unwrap();
        let appended = first.await.unwrap();
        assert_eq!(appended.len(), 1);
        assert_eq!(h.gateway.request_count().await, 2);
    }

    #[tokio::test]
    async fn load_failure_leaves_an_empty_feed() {
        let h = harness(vec![
            page(&["p1"], None),
            Err(AppError::network("simulated outage")),
        ]);
        h.service
            .load(FeedStrategy::Latest, FeedFilters::default())
            .await;
        assert_eq!(h.view.posts().await.len(), 1);

        let reloaded = h
            .service
            .load(FeedStrategy::Trending, FeedFilters::default())
            .await;
        assert!(reloaded.is_empty());
        assert!(h.view.posts().await.is_empty());
    }

    #[tokio::test]
    async fn topic_filter_drops_unrelated_posts() {
        let mut tagged = post("p1");
        tagged.topics = vec!["Fundraising".to_string()];
        let unrelated = post("p2");
        let h = harness(vec![Ok(FeedPage {
            posts: vec![tagged, unrelated],
            next_cursor: None,
            total: None,
        })]);

        let filters = FeedFilters {
            topic: Some("fundraising".to_string()),
            sort: None,
        };
        let posts = h.service.load(FeedStrategy::Latest, filters).await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id.as_str(), "p1");
    }

    #[tokio::test]
    async fn scroll_threshold_gates_pagination() {
        let h = harness(vec![
            page(&["p1"], Some("c1")),
            page(&["p2"], None),
        ]);
        h.service
            .load(FeedStrategy::Latest, FeedFilters::default())
            .await;

        assert!(h.service.notify_scroll(800.0).await.is_empty());
        assert_eq!(h.gateway.request_count().await, 1);

        let appended = h.service.notify_scroll(150.0).await;
        assert_eq!(appended.len(), 1);
    }

    #[tokio::test]
    async fn views_are_tracked_once_per_session() {
        let h = harness(vec![page(&["p1"], None)]);
        let posts = h
            .service
            .load(FeedStrategy::Latest, FeedFilters::default())
            .await;

        h.service.track_view(&posts[0]).await.unwrap();
        h.service.track_view(&posts[0]).await.unwrap();

        assert_eq!(*h.sync.tracked.lock().await, vec!["p1".to_string()]);
        assert_eq!(h.view.get_post(&posts[0].id).await.unwrap().view_count, 1);
    }
}
