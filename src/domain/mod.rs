pub mod aggregation;
pub mod entities;
pub mod value_objects;

pub use aggregation::{Tally, TallyDelta, percentage, recompute};
pub use entities::{Author, Comment, InteractionRecord, InteractionValue, Poll, PollOption, Post};
pub use value_objects::{
    CommentId, InteractionKind, Namespace, OptionId, PostId, ReactionType, SyncStatus, UserId,
};
