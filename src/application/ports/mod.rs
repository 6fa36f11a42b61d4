pub mod event_publisher;
pub mod feed_gateway;
pub mod interaction_repository;
pub mod sync_gateway;
pub mod view_cache;

pub use event_publisher::{InteractionEvent, InteractionEvents};
pub use feed_gateway::{FeedCursor, FeedFilters, FeedGateway, FeedPage, FeedStrategy};
pub use interaction_repository::InteractionRepository;
pub use sync_gateway::{
    BookmarkAck, CommentLikeAck, ReactionAck, ReactionCommand, RepliesPage, SyncGateway,
};
pub use view_cache::ViewCache;
