pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::{CommentService, FeedService, InteractionService};
pub use application::ports::feed_gateway::{FeedCursor, FeedFilters, FeedStrategy};
pub use domain::entities::{Comment, Post};
pub use shared::config::AppConfig;
pub use shared::error::{AppError, Result};

use std::sync::Arc;

/// Fully wired engine: sqlite-backed interaction cache, HTTP gateway, and
/// the in-memory view cache shared by all three services.
pub struct Engine {
    pub interactions: Arc<InteractionService>,
    pub feed: Arc<FeedService>,
    pub comments: Arc<CommentService>,
    pub events: Arc<infrastructure::events::BroadcastEvents>,
}

impl Engine {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store = Arc::new(
            infrastructure::storage::SqliteInteractionStore::connect(&config.database).await?,
        );
        let gateway = Arc::new(infrastructure::remote::HttpGateway::new(&config.api)?);
        let view = Arc::new(infrastructure::cache::FeedViewCache::new());
        let events = Arc::new(infrastructure::events::BroadcastEvents::new());

        let interactions = Arc::new(InteractionService::new(
            store,
            gateway.clone(),
            view.clone(),
            events.clone(),
        ));
        let feed = Arc::new(FeedService::new(
            gateway.clone(),
            gateway.clone(),
            view.clone(),
            config.feed.clone(),
        ));
        let comments = Arc::new(CommentService::new(
            gateway,
            view,
            config.feed.reply_page_size,
        ));

        Ok(Self {
            interactions,
            feed,
            comments,
            events,
        })
    }
}

pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "connectfeed=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
