use crate::domain::entities::Post;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// Feed selection strategies. `as_str` yields the wire parameter the backend
/// expects; the ranked strategy is historically named "intelligent" there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStrategy {
    #[default]
    Latest,
    Following,
    Ranked,
    Trending,
    Smart,
}

impl FeedStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedStrategy::Latest => "latest",
            FeedStrategy::Following => "following",
            FeedStrategy::Ranked => "intelligent",
            FeedStrategy::Trending => "trending",
            FeedStrategy::Smart => "smart",
        }
    }
}

impl fmt::Display for FeedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeedStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(FeedStrategy::Latest),
            "following" => Ok(FeedStrategy::Following),
            "intelligent" | "ranked" => Ok(FeedStrategy::Ranked),
            "trending" => Ok(FeedStrategy::Trending),
            "smart" => Ok(FeedStrategy::Smart),
            other => Err(format!("Unknown feed strategy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilters {
    pub topic: Option<String>,
    pub sort: Option<String>,
}

/// Opaque pagination token handed back by the backend. Never inspected
/// client-side, only echoed on the next page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCursor(String);

impl FeedCursor {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub next_cursor: Option<FeedCursor>,
    pub total: Option<u32>,
}

#[async_trait]
pub trait FeedGateway: Send + Sync {
    async fn fetch_page(
        &self,
        strategy: FeedStrategy,
        filters: &FeedFilters,
        cursor: Option<&FeedCursor>,
        limit: u32,
    ) -> Result<FeedPage, AppError>;
}
