use super::poll::{Poll, ReactionSummaryEntry};
use crate::domain::aggregation::Tally;
use crate::domain::value_objects::{PostId, ReactionType, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: Option<Author>,
    pub title: Option<String>,
    pub content: String,
    pub content_preview: Option<String>,
    pub image_url: Option<String>,
    pub topics: Vec<String>,
    pub poll: Option<Poll>,
    /// Server-supplied reaction summary baseline, superseded by the local
    /// tally once the user reacts.
    pub top_reactions: Vec<ReactionSummaryEntry>,
    /// Viewer-specific state as reported by the backend. The local cache
    /// record, when one exists, overrides both.
    pub user_reaction: Option<ReactionType>,
    pub is_bookmarked: bool,
    pub view_count: u32,
    pub like_count: u32,
    pub comment_count: u32,
    pub share_count: u32,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(id: PostId, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author: None,
            title: None,
            content,
            content_preview: None,
            image_url: None,
            topics: Vec::new(),
            poll: None,
            top_reactions: Vec::new(),
            user_reaction: None,
            is_bookmarked: false,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            share_count: 0,
            is_pinned: false,
            is_locked: false,
            is_anonymous: false,
            created_at,
        }
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_poll(mut self, poll: Poll) -> Self {
        self.poll = Some(poll);
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

    pub fn increment_comments(&mut self) {
        self.comment_count += 1;
    }

    pub fn increment_views(&mut self) {
        self.view_count += 1;
    }

    /// Baseline reaction tally seeded from the server-supplied summary.
    pub fn reaction_tally(&self) -> Tally<ReactionType> {
        let mut tally = Tally::new();
        for entry in &self.top_reactions {
            tally.set(entry.reaction, entry.count);
        }
        tally
    }

    pub fn apply_reaction_tally(&mut self, tally: &Tally<ReactionType>) {
        self.top_reactions = tally
            .summary()
            .into_iter()
            .map(|(reaction, count)| ReactionSummaryEntry { reaction, count })
            .collect();
    }

    /// Fallback topic filter applied on top of server results. Matches a
    /// topic tag case-insensitively, or the topic keyword occurring in the
    /// title, content, or preview text.
    pub fn matches_topic(&self, topic: &str) -> bool {
        let needle = topic.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        if self
            .topics
            .iter()
            .any(|tag| tag.to_lowercase() == needle)
        {
            return true;
        }
        let haystacks = [
            self.title.as_deref().unwrap_or(""),
            self.content.as_str(),
            self.content_preview.as_deref().unwrap_or(""),
        ];
        haystacks
            .iter()
            .any(|text| text.to_lowercase().contains(&needle))
    }
}
