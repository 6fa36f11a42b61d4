use super::post::Author;
use crate::domain::value_objects::CommentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: Option<Author>,
    pub content: String,
    pub like_count: u32,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    /// Replies nest exactly one level; a reply's own `replies` stays empty.
    pub replies: Vec<Comment>,
    pub has_more_replies: bool,
    pub remaining_replies: u32,
}

impl Comment {
    pub fn new(id: CommentId, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author: None,
            content,
            like_count: 0,
            is_liked: false,
            created_at,
            replies: Vec::new(),
            has_more_replies: false,
            remaining_replies: 0,
        }
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    pub fn increment_likes(&mut self) {
        self.like_count += 1;
    }

    pub fn decrement_likes(&mut self) {
        if self.like_count > 0 {
            self.like_count -= 1;
        }
    }

    pub fn set_like_count(&mut self, count: u32) {
        self.like_count = count;
    }

    pub fn add_reply(&mut self, reply: Comment) {
        self.replies.push(reply);
    }

    /// Appends a fetched page of replies and advances the pagination state.
    pub fn append_replies(&mut self, replies: Vec<Comment>, has_more: bool, remaining: u32) {
        self.replies.extend(replies);
        self.has_more_replies = has_more;
        self.remaining_replies = remaining;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_comment(id: &str) -> Comment {
        Comment::new(
            CommentId::new(id.to_string()).expect("valid id"),
            "nice launch".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn decrement_likes_clamps_at_zero() {
        let mut comment = sample_comment("c1");
        comment.decrement_likes();
        assert_eq!(comment.like_count, 0);
    }

    #[test]
    fn append_replies_advances_pagination_state() {
        let mut comment = sample_comment("c1");
        comment.has_more_replies = true;
        comment.remaining_replies = 12;

        comment.append_replies(vec![sample_comment("c2"), sample_comment("c3")], true, 10);
        assert_eq!(comment.replies.len(), 2);
        assert!(comment.has_more_replies);
        assert_eq!(comment.remaining_replies, 10);

        comment.append_replies(vec![sample_comment("c4")], false, 0);
        assert_eq!(comment.replies.len(), 3);
        assert!(!comment.has_more_replies);
    }
}
