//! HTTP client for the Facebook Graph API comments edge.
//!
//! Wraps `reqwest` with Graph-specific error handling, access-token
//! management, and typed response deserialization. Non-2xx responses are
//! parsed as the Graph error envelope and classified into [`GraphError`]
//! variants so callers can distinguish a bad token from a missing post.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::GraphError;
use crate::retry::retry_with_backoff;
use crate::types::{CommentsPage, GraphApiError, GraphFailure};

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/";

/// Comment fields requested on every page.
///
/// The trailing `comments` expansion pulls each comment's replies inline so a
/// single listing pass covers the whole thread.
const COMMENT_FIELDS: &str = "id,created_time,from,message,like_count,parent,comments";

/// Client for the Facebook Graph API.
///
/// Manages the HTTP client, access token, API version, and base URL. Use
/// [`GraphClient::new`] for production or [`GraphClient::with_base_url`] to
/// point at a mock server in tests.
pub struct GraphClient {
    client: Client,
    access_token: String,
    api_version: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GraphClient {
    /// Creates a new client pointed at the production Graph API.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        access_token: &str,
        api_version: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, GraphError> {
        Self::with_base_url(
            access_token,
            api_version,
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GraphError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        access_token: &str,
        api_version: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join appends the version path rather than replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| GraphError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            api_version: api_version.to_owned(),
            base_url: parsed,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches one page of comments on `post_id`.
    ///
    /// The first page is built from the client's base URL; follow-up pages
    /// pass the `paging.next` URL from the previous page, which the Graph API
    /// pre-builds with cursor and token included, and it is requested verbatim.
    ///
    /// Transient failures are retried with exponential back-off up to the
    /// client's `max_retries`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidToken`] / [`GraphError::NotFound`] /
    ///   [`GraphError::RateLimited`] / [`GraphError::Api`] for classified
    ///   Graph error envelopes.
    /// - [`GraphError::Http`] on network failure.
    /// - [`GraphError::Deserialize`] if a 2xx body does not match the
    ///   expected page shape.
    pub async fn fetch_comments_page(
        &self,
        post_id: &str,
        page_size: u32,
        next_url: Option<&str>,
    ) -> Result<CommentsPage, GraphError> {
        let url = match next_url {
            Some(next) => next.to_owned(),
            None => self.comments_url(post_id, page_size)?.to_string(),
        };
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_page(url.clone())
        })
        .await
    }

    /// Builds the first-page URL with properly percent-encoded query parameters.
    ///
    /// `filter=stream` flattens the listing to include replies and
    /// `summary=true` asks for the total comment count alongside the first
    /// page.
    fn comments_url(&self, post_id: &str, page_size: u32) -> Result<Url, GraphError> {
        let path = format!("{}/{post_id}/comments", self.api_version);
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| GraphError::InvalidUrl {
                url: path,
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("access_token", &self.access_token);
            pairs.append_pair("summary", "true");
            pairs.append_pair("filter", "stream");
            pairs.append_pair("limit", &page_size.to_string());
            pairs.append_pair("fields", COMMENT_FIELDS);
        }
        Ok(url)
    }

    /// Sends one GET request and parses the response.
    ///
    /// 2xx bodies are decoded as a [`CommentsPage`]. Non-2xx bodies are
    /// decoded as the Graph error envelope and classified; bodies that are
    /// not even an envelope fall back to status-based errors.
    async fn request_page(&self, url: String) -> Result<CommentsPage, GraphError> {
        // reqwest errors carry the request URL; drop it so the token in the
        // query string stays out of transport error text.
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GraphError::Http(e.without_url()))?;
        let status = response.status();
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response
            .text()
            .await
            .map_err(|e| GraphError::Http(e.without_url()))?;

        // The access token rides in the query string; strip it before the
        // URL can reach an error message or a log line.
        let display_url = redact_url(&url);

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| GraphError::Deserialize {
                context: format!("comments page from {display_url}"),
                source: e,
            });
        }

        if let Ok(failure) = serde_json::from_str::<GraphFailure>(&body) {
            return Err(classify_failure(&failure.error, status, retry_after_secs));
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(GraphError::RateLimited {
                message: format!("HTTP 429 from {display_url}"),
                retry_after_secs: retry_after_secs.unwrap_or(60),
            }),
            StatusCode::NOT_FOUND => Err(GraphError::NotFound(display_url)),
            _ => Err(GraphError::UnexpectedStatus {
                status: status.as_u16(),
                url: display_url,
            }),
        }
    }
}

/// Maps a Graph error envelope to a [`GraphError`] variant.
///
/// Ordering matters: the missing-post signals (code 100 subcode 33, code 803,
/// `GraphMethodException`) are checked before the token signals because the
/// Graph API reports an unreadable post as an `OAuthException` too, and "post
/// not found" is the more actionable message.
///
/// The HTTP status doubles as a fallback signal for envelopes whose code and
/// type are unrecognized: 429 throttling, 404 missing post, 401-403 rejected
/// token.
fn classify_failure(
    error: &GraphApiError,
    status: StatusCode,
    retry_after_secs: Option<u64>,
) -> GraphError {
    let code = error.code.unwrap_or_default();
    let subcode = error.error_subcode.unwrap_or_default();
    let kind = error.kind.as_deref().unwrap_or_default();

    if matches!(code, 4 | 17 | 32 | 613) || status == StatusCode::TOO_MANY_REQUESTS {
        return GraphError::RateLimited {
            message: error.message.clone(),
            retry_after_secs: retry_after_secs.unwrap_or(60),
        };
    }
    if (code == 100 && subcode == 33)
        || code == 803
        || kind == "GraphMethodException"
        || status == StatusCode::NOT_FOUND
    {
        return GraphError::NotFound(error.message.clone());
    }
    if matches!(code, 190 | 102)
        || kind == "OAuthException"
        || matches!(status.as_u16(), 401..=403)
    {
        return GraphError::InvalidToken(error.message.clone());
    }
    GraphError::Api {
        code,
        message: error.message.clone(),
    }
}

/// Drops the query string, which carries the access token.
fn redact_url(url: &str) -> String {
    url.split_once('?').map_or(url, |(head, _)| head).to_owned()
}
