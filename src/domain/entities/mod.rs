pub mod comment;
pub mod interaction;
pub mod poll;
pub mod post;

pub use comment::Comment;
pub use interaction::{InteractionRecord, InteractionValue};
pub use poll::{Poll, PollOption, ReactionSummaryEntry};
pub use post::{Author, Post};
