//! Multi-page comment collection for `GraphClient`.

use std::collections::HashSet;
use std::time::Duration;

use fbc_core::Comment;

use crate::client::GraphClient;
use crate::error::GraphError;
use crate::types::RawComment;

/// Everything collected from one post.
#[derive(Debug, Clone)]
pub struct CommentCollection {
    /// Flattened comments in the order the API returned them, replies
    /// directly after the comment they answer.
    pub comments: Vec<Comment>,
    /// `summary.total_count` from the first page, when the API sent one.
    pub summary_total: Option<i64>,
    pub pages_fetched: usize,
}

impl GraphClient {
    /// Collects every comment on `post_id` by iterating through all pages.
    ///
    /// Starts with the first page (no cursor) and follows `paging.next` URLs
    /// until none is present. Replies embedded under each comment are
    /// flattened into the same list with `parent_id` pointing back at the
    /// comment they answer, and ids already seen are skipped so a comment
    /// that shows up both at top level and as an embedded reply lands in the
    /// output once.
    ///
    /// `inter_request_delay_ms` is the delay in milliseconds between page
    /// requests (applied after every page except the first).
    ///
    /// **All-or-nothing semantics**: on any page failure (network error, rate
    /// limit, pagination limit), already-fetched comments from earlier pages
    /// are discarded and the error is returned, so an exported CSV never
    /// silently holds a partial thread.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`GraphClient::fetch_comments_page`].
    /// Returns [`GraphError::PaginationLimit`] if the number of pages exceeds
    /// `max_pages`.
    pub async fn collect_post_comments(
        &self,
        post_id: &str,
        page_size: u32,
        max_pages: usize,
        inter_request_delay_ms: u64,
    ) -> Result<CommentCollection, GraphError> {
        let mut comments: Vec<Comment> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut summary_total: Option<i64> = None;
        let mut next_url: Option<String> = None;
        let mut is_first_page = true;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > max_pages {
                return Err(GraphError::PaginationLimit {
                    post_id: post_id.to_owned(),
                    max_pages,
                });
            }

            if !is_first_page && inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
            }
            is_first_page = false;

            let page = self
                .fetch_comments_page(post_id, page_size, next_url.as_deref())
                .await?;

            if summary_total.is_none() {
                summary_total = page.summary.and_then(|s| s.total_count);
            }
            for raw in page.data {
                flatten_into(raw, None, &mut comments, &mut seen_ids);
            }
            tracing::debug!(
                post_id,
                page = page_count,
                total = comments.len(),
                "collected comments page"
            );

            next_url = page.paging.and_then(|p| p.next);
            if next_url.is_none() {
                break;
            }
        }

        Ok(CommentCollection {
            comments,
            summary_total,
            pages_fetched: page_count,
        })
    }
}

/// Appends `raw` and its embedded replies to `out`, depth first.
///
/// `inherited_parent` carries the enclosing comment's id so replies keep a
/// `parent_id` even when the API omits their `parent` object; an explicit
/// `parent` wins over the inherited one. Ids already present in `seen_ids`
/// are skipped, but their replies are still walked in case an earlier
/// sighting carried no reply expansion.
fn flatten_into(
    raw: RawComment,
    inherited_parent: Option<&str>,
    out: &mut Vec<Comment>,
    seen_ids: &mut HashSet<String>,
) {
    let parent_id = raw
        .parent
        .map(|p| p.id)
        .or_else(|| inherited_parent.map(str::to_owned));
    let own_id = raw.id.clone();

    if seen_ids.insert(raw.id) {
        let (author_id, author_name) = match raw.from {
            Some(author) => (Some(author.id), author.name),
            None => (None, None),
        };
        out.push(Comment {
            comment_id: own_id.clone(),
            created_time: raw.created_time,
            author_id,
            author_name,
            message: raw.message,
            parent_id,
            like_count: raw.like_count,
        });
    }

    if let Some(replies) = raw.comments {
        for reply in replies.data {
            flatten_into(reply, Some(&own_id), out, seen_ids);
        }
    }
}
