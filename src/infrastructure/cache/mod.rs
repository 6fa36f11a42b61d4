pub mod feed_view_cache;

pub use feed_view_cache::FeedViewCache;
