pub mod comment_service;
pub mod feed_service;
pub mod interaction_service;

pub use comment_service::CommentService;
pub use feed_service::FeedService;
pub use interaction_service::InteractionService;
