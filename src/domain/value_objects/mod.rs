pub mod comment_id;
pub mod interaction_kind;
pub mod namespace;
pub mod option_id;
pub mod post_id;
pub mod reaction_type;
pub mod sync_status;
pub mod user_id;

pub use comment_id::CommentId;
pub use interaction_kind::InteractionKind;
pub use namespace::Namespace;
pub use option_id::OptionId;
pub use post_id::PostId;
pub use reaction_type::ReactionType;
pub use sync_status::SyncStatus;
pub use user_id::UserId;
