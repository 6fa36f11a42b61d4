use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub page_size: u32,
    pub reply_page_size: u32,
    /// Remaining scroll distance (px) below which the next page is requested.
    pub scroll_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/connectfeed.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                request_timeout: 30,
            },
            feed: FeedConfig {
                page_size: 20,
                reply_page_size: 10,
                scroll_threshold: 200.0,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("CONNECTFEED_DATABASE_URL")
            && !v.trim().is_empty()
        {
            cfg.database.url = v;
        }
        if let Ok(v) = std::env::var("CONNECTFEED_API_BASE_URL")
            && !v.trim().is_empty()
        {
            cfg.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = std::env::var("CONNECTFEED_API_TIMEOUT")
            && let Some(value) = parse_u64(&v)
        {
            cfg.api.request_timeout = value.max(1);
        }
        if let Ok(v) = std::env::var("CONNECTFEED_FEED_PAGE_SIZE")
            && let Some(value) = parse_u32(&v)
        {
            cfg.feed.page_size = value.clamp(1, 100);
        }
        if let Ok(v) = std::env::var("CONNECTFEED_REPLY_PAGE_SIZE")
            && let Some(value) = parse_u32(&v)
        {
            cfg.feed.reply_page_size = value.clamp(1, 100);
        }
        if let Ok(v) = std::env::var("CONNECTFEED_SCROLL_THRESHOLD")
            && let Some(value) = parse_f64(&v)
        {
            cfg.feed.scroll_threshold = value.max(0.0);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.api.base_url.trim().is_empty() {
            return Err("Api base_url must not be empty".to_string());
        }
        if self.feed.page_size == 0 {
            return Err("Feed page_size must be greater than 0".to_string());
        }
        if self.feed.reply_page_size == 0 {
            return Err("Feed reply_page_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}
