//! Graph API response types.
//!
//! All types model the JSON structures returned by the Facebook Graph API
//! `/{post-id}/comments` edge. Successful responses carry a `data` array plus
//! optional `paging` and `summary` objects; failures carry an `error` object
//! captured by [`GraphFailure`].

use serde::Deserialize;

// ---------------------------------------------------------------------------
// /{post-id}/comments
// ---------------------------------------------------------------------------

/// One page of a comments listing.
#[derive(Debug, Deserialize)]
pub struct CommentsPage {
    #[serde(default)]
    pub data: Vec<RawComment>,
    #[serde(default)]
    pub paging: Option<Paging>,
    /// Present only when the request asked for `summary=true`, which the
    /// Graph API honors on the first page of a listing.
    #[serde(default)]
    pub summary: Option<CommentSummary>,
}

/// A single comment as the Graph API returns it.
///
/// Only `id` is guaranteed; every other field can be withheld depending on
/// the token's permissions and the commenter's privacy settings.
#[derive(Debug, Deserialize)]
pub struct RawComment {
    pub id: String,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub from: Option<CommentAuthor>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub parent: Option<ParentRef>,
    /// Replies embedded by the `comments` field expansion. The nesting is
    /// recursive: a reply page has the same shape as a top-level page.
    #[serde(default)]
    pub comments: Option<CommentsPage>,
}

/// The `from` object naming a comment's author.
#[derive(Debug, Deserialize)]
pub struct CommentAuthor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Reference to the comment a reply is attached to.
#[derive(Debug, Deserialize)]
pub struct ParentRef {
    pub id: String,
}

/// Cursor-based paging block.
///
/// `next` is a complete pre-built URL (token included) that fetches the
/// following page; it is absent on the last page.
#[derive(Debug, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
}

/// Opaque paging cursors.
#[derive(Debug, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

/// Aggregate counts returned alongside the first page.
#[derive(Debug, Deserialize)]
pub struct CommentSummary {
    #[serde(default)]
    pub total_count: Option<i64>,
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// Body shape of a non-2xx Graph API response: `{ "error": { ... } }`.
#[derive(Debug, Deserialize)]
pub struct GraphFailure {
    pub error: GraphApiError,
}

/// The `error` object inside a [`GraphFailure`].
#[derive(Debug, Deserialize)]
pub struct GraphApiError {
    #[serde(default)]
    pub message: String,
    /// Error class such as `OAuthException` or `GraphMethodException`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error_subcode: Option<i64>,
}
