//! Wire shapes for the backend's JSON API, mapped into domain types at this
//! boundary. Deserialization is deliberately lenient: optional counters
//! default to zero and unknown reaction types are dropped with a warning
//! rather than failing the whole payload.

use crate::domain::entities::{Author, Comment, Poll, PollOption, Post, ReactionSummaryEntry};
use crate::domain::value_objects::{CommentId, OptionId, PostId, ReactionType, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct ReactionBody<'a> {
    pub reaction_type: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CommentBody<'a> {
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ReactionResponse {
    pub like_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct BookmarkResponse {
    pub bookmarked: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CommentLikeResponse {
    pub like_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorDto {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentDto {
    pub id: String,
    #[serde(default)]
    pub author: Option<AuthorDto>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub replies: Vec<CommentDto>,
    #[serde(default)]
    pub has_more_replies: bool,
    #[serde(default)]
    pub remaining_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct RepliesResponse {
    #[serde(default)]
    pub replies: Vec<CommentDto>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub remaining_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct PollOptionDto {
    pub id: OptionId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub vote_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct PollDto {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<PollOptionDto>,
    #[serde(default)]
    pub multiple_choice: bool,
    #[serde(default)]
    pub max_selections: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub anonymous_voting: bool,
    #[serde(default)]
    pub total_votes: u32,
    #[serde(default)]
    pub user_votes: Vec<OptionId>,
}

#[derive(Debug, Deserialize)]
pub struct ReactionSummaryDto {
    #[serde(rename = "type")]
    pub reaction_type: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Deserialize)]
pub struct PostDto {
    pub id: String,
    #[serde(default)]
    pub author: Option<AuthorDto>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_preview: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub poll: Option<PollDto>,
    #[serde(default)]
    pub top_reactions: Vec<ReactionSummaryDto>,
    #[serde(default)]
    pub user_reaction: Option<String>,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub share_count: u32,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub results: Vec<PostDto>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

fn default_true() -> bool {
    true
}

fn author_from_dto(dto: AuthorDto) -> Option<Author> {
    let id = UserId::new(dto.id).ok()?;
    let display_name = dto.display_name.unwrap_or_else(|| "Member".to_string());
    Some(Author {
        id,
        display_name,
        avatar_url: dto.avatar_url,
    })
}

fn poll_from_dto(dto: PollDto) -> Poll {
    Poll {
        question: dto.question,
        options: dto
            .options
            .into_iter()
            .map(|option| PollOption {
                id: option.id,
                text: option.text,
                vote_count: option.vote_count,
            })
            .collect(),
        multiple_choice: dto.multiple_choice,
        max_selections: dto.max_selections,
        is_active: dto.is_active,
        anonymous_voting: dto.anonymous_voting,
        total_votes: dto.total_votes,
        user_votes: dto.user_votes,
    }
}

fn reaction_summary_from_dtos(dtos: Vec<ReactionSummaryDto>) -> Vec<ReactionSummaryEntry> {
    dtos.into_iter()
        .filter_map(|dto| match dto.reaction_type.parse::<ReactionType>() {
            Ok(reaction) => Some(ReactionSummaryEntry {
                reaction,
                count: dto.count,
            }),
            Err(_) => {
                warn!("Dropping unknown reaction type: {}", dto.reaction_type);
                None
            }
        })
        .collect()
}

pub fn post_from_dto(dto: PostDto) -> Result<Post, String> {
    let id = PostId::new(dto.id)?;
    let created_at = dto.created_at.unwrap_or_else(Utc::now);
    let mut post = Post::new(id, dto.content, created_at);
    post.author = dto.author.and_then(author_from_dto);
    post.title = dto.title;
    post.content_preview = dto.content_preview;
    post.image_url = dto.image_url;
    post.topics = dto.topics;
    post.poll = dto.poll.map(poll_from_dto);
    post.top_reactions = reaction_summary_from_dtos(dto.top_reactions);
    post.user_reaction = dto
        .user_reaction
        .and_then(|raw| raw.parse::<ReactionType>().ok());
    post.is_bookmarked = dto.is_bookmarked;
    post.view_count = dto.view_count;
    post.like_count = dto.like_count;
    post.comment_count = dto.comment_count;
    post.share_count = dto.share_count;
    post.is_pinned = dto.is_pinned;
    post.is_locked = dto.is_locked;
    post.is_anonymous = dto.is_anonymous;
    Ok(post)
}

pub fn comment_from_dto(dto: CommentDto) -> Result<Comment, String> {
    let id = CommentId::new(dto.id)?;
    let created_at = dto.created_at.unwrap_or_else(Utc::now);
    let mut comment = Comment::new(id, dto.content, created_at);
    comment.author = dto.author.and_then(author_from_dto);
    comment.like_count = dto.like_count;
    comment.is_liked = dto.is_liked;
    comment.has_more_replies = dto.has_more_replies;
    comment.remaining_replies = dto.remaining_count;
    comment.replies = dto
        .replies
        .into_iter()
        .filter_map(|reply| comment_from_dto(reply).ok())
        .collect();
    Ok(comment)
}
