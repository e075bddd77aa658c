use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("access token rejected: {0}")]
    InvalidToken(String),

    #[error("post not found: {0}")]
    NotFound(String),

    #[error("rate limited (retry after {retry_after_secs}s): {message}")]
    RateLimited {
        message: String,
        retry_after_secs: u64,
    },

    #[error("Graph API error (code {code}): {message}")]
    Api { code: i64, message: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("pagination limit reached for post {post_id}: exceeded {max_pages} pages")]
    PaginationLimit { post_id: String, max_pages: usize },

    #[error("invalid Graph API URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
