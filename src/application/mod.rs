pub mod ports;
pub mod services;

pub use services::{CommentService, FeedService, InteractionService};
