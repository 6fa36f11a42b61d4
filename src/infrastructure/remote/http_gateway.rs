use super::wire::{
    BookmarkResponse, CommentBody, CommentDto, CommentLikeResponse, FeedResponse, ReactionBody,
    ReactionResponse, RepliesResponse, comment_from_dto, post_from_dto,
};
use crate::application::ports::feed_gateway::{
    FeedCursor, FeedFilters, FeedGateway, FeedPage, FeedStrategy,
};
use crate::application::ports::sync_gateway::{
    BookmarkAck, CommentLikeAck, ReactionAck, ReactionCommand, RepliesPage, SyncGateway,
};
use crate::domain::entities::Comment;
use crate::domain::value_objects::{CommentId, OptionId, PostId, ReactionType};
use crate::shared::config::ApiConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

/// HTTP adapter for the backend, carrying both the mutation surface
/// (`SyncGateway`) and the feed surface (`FeedGateway`). All transport and
/// status errors are normalized into `AppError` here; nothing beyond this
/// boundary sees reqwest types.
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

/// The wire type a `ReactionCommand` actually sends. The protocol is
/// toggle-by-resend, so `Remove` resends the current type and `Replace`
/// sends the new type exactly once (resending the old one would remove it).
pub(crate) fn reaction_wire_type(command: ReactionCommand) -> ReactionType {
    match command {
        ReactionCommand::Add(reaction) => reaction,
        ReactionCommand::Remove(reaction) => reaction,
        ReactionCommand::Replace { to, .. } => to,
    }
}

impl HttpGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn settle(&self, response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AppError::Unauthorized(format!("{status}: {detail}"))
            }
            StatusCode::NOT_FOUND => AppError::NotFound(detail),
            status if status.is_client_error() => {
                AppError::Validation(format!("{status}: {detail}"))
            }
            status => AppError::Network(format!("{status}: {detail}")),
        })
    }

    async fn post_empty(&self, path: &str) -> Result<Response, AppError> {
        let response = self.client.post(self.url(path)).send().await?;
        self.settle(response).await
    }
}

#[async_trait]
impl SyncGateway for HttpGateway {
    async fn send_reaction(
        &self,
        post_id: &PostId,
        command: ReactionCommand,
    ) -> Result<ReactionAck, AppError> {
        let body = ReactionBody {
            reaction_type: reaction_wire_type(command).as_str(),
        };
        let response = self
            .client
            .post(self.url(&format!("reactions/{}", post_id)))
            .json(&body)
            .send()
            .await?;
        let payload: ReactionResponse = self.settle(response).await?.json().await?;
        Ok(ReactionAck {
            like_count: payload.like_count,
        })
    }

    async fn toggle_bookmark(&self, post_id: &PostId) -> Result<BookmarkAck, AppError> {
        let response = self.post_empty(&format!("bookmarks/{}", post_id)).await?;
        let payload: BookmarkResponse = response.json().await?;
        Ok(BookmarkAck {
            bookmarked: payload.bookmarked,
        })
    }

    async fn cast_poll_vote(&self, post_id: &PostId, option_id: OptionId) -> Result<(), AppError> {
        self.post_empty(&format!("polls/{}/vote/{}", post_id, option_id))
            .await?;
        Ok(())
    }

    async fn withdraw_poll_vote(
        &self,
        post_id: &PostId,
        option_id: OptionId,
    ) -> Result<(), AppError> {
        self.post_empty(&format!("polls/{}/unvote/{}", post_id, option_id))
            .await?;
        Ok(())
    }

    async fn like_comment(&self, comment_id: &CommentId) -> Result<CommentLikeAck, AppError> {
        let response = self
            .post_empty(&format!("comments/{}/like", comment_id))
            .await?;
        let payload: CommentLikeResponse = response.json().await?;
        Ok(CommentLikeAck {
            like_count: payload.like_count,
        })
    }

    async fn unlike_comment(&self, comment_id: &CommentId) -> Result<CommentLikeAck, AppError> {
        let response = self
            .post_empty(&format!("comments/{}/unlike", comment_id))
            .await?;
        let payload: CommentLikeResponse = response.json().await?;
        Ok(CommentLikeAck {
            like_count: payload.like_count,
        })
    }

    async fn create_comment(&self, post_id: &PostId, content: &str) -> Result<Comment, AppError> {
        let response = self
            .client
            .post(self.url(&format!("posts/{}/comments", post_id)))
            .json(&CommentBody { content })
            .send()
            .await?;
        let dto: CommentDto = self.settle(response).await?.json().await?;
        comment_from_dto(dto).map_err(AppError::Serialization)
    }

    async fn reply_to_comment(
        &self,
        comment_id: &CommentId,
        content: &str,
    ) -> Result<Comment, AppError> {
        let response = self
            .client
            .post(self.url(&format!("comments/{}/reply", comment_id)))
            .json(&CommentBody { content })
            .send()
            .await?;
        let dto: CommentDto = self.settle(response).await?.json().await?;
        comment_from_dto(dto).map_err(AppError::Serialization)
    }

    async fn fetch_comments(&self, post_id: &PostId) -> Result<Vec<Comment>, AppError> {
        let response = self
            .client
            .get(self.url(&format!("posts/{}/comments", post_id)))
            .send()
            .await?;
        let dtos: Vec<CommentDto> = self.settle(response).await?.json().await?;
        Ok(dtos
            .into_iter()
            .filter_map(|dto| match comment_from_dto(dto) {
                Ok(comment) => Some(comment),
                Err(err) => {
                    warn!("Dropping malformed comment: {err}");
                    None
                }
            })
            .collect())
    }

    async fn fetch_replies(
        &self,
        comment_id: &CommentId,
        offset: u32,
        limit: u32,
    ) -> Result<RepliesPage, AppError> {
        let response = self
            .client
            .get(self.url(&format!("comments/{}/replies", comment_id)))
            .query(&[("offset", offset), ("limit", limit)])
            .send()
            .await?;
        let payload: RepliesResponse = self.settle(response).await?.json().await?;
        Ok(RepliesPage {
            replies: payload
                .replies
                .into_iter()
                .filter_map(|dto| comment_from_dto(dto).ok())
                .collect(),
            has_more: payload.has_more,
            remaining_count: payload.remaining_count,
        })
    }

    async fn track_view(&self, post_id: &PostId) -> Result<(), AppError> {
        self.post_empty(&format!("posts/{}/view", post_id)).await?;
        Ok(())
    }
}

#[async_trait]
impl FeedGateway for HttpGateway {
    async fn fetch_page(
        &self,
        strategy: FeedStrategy,
        filters: &FeedFilters,
        cursor: Option<&FeedCursor>,
        limit: u32,
    ) -> Result<FeedPage, AppError> {
        let mut query: Vec<(&str, String)> = vec![
            ("strategy", strategy.as_str().to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(topic) = filters.topic.as_deref() {
            query.push(("topic", topic.to_string()));
        }
        if let Some(sort) = filters.sort.as_deref() {
            query.push(("sort", sort.to_string()));
        }
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.as_str().to_string()));
        }

        let response = self
            .client
            .get(self.url("feed"))
            .query(&query)
            .send()
            .await?;
        let payload: FeedResponse = self.settle(response).await?.json().await?;

        let posts = payload
            .results
            .into_iter()
            .filter_map(|dto| match post_from_dto(dto) {
                Ok(post) => Some(post),
                Err(err) => {
                    warn!("Dropping malformed post: {err}");
                    None
                }
            })
            .collect();
        Ok(FeedPage {
            posts,
            next_cursor: payload.next.as_deref().and_then(FeedCursor::parse),
            total: payload.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_sends_the_new_type_never_the_old() {
        let command = ReactionCommand::Replace {
            from: ReactionType::Like,
            to: ReactionType::Love,
        };
        assert_eq!(reaction_wire_type(command), ReactionType::Love);
    }

    #[test]
    fn remove_resends_the_current_type() {
        assert_eq!(
            reaction_wire_type(ReactionCommand::Remove(ReactionType::Celebrate)),
            ReactionType::Celebrate
        );
    }

    #[test]
    fn urls_join_without_duplicate_slashes() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            request_timeout: 5,
        };
        let gateway = HttpGateway::new(&config).expect("client builds");
        assert_eq!(
            gateway.url("/reactions/post-1"),
            "http://localhost:8000/api/reactions/post-1"
        );
    }
}
