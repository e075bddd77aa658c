//! Post-URL to Graph post id extraction.
//!
//! Facebook exposes the same post under several URL shapes; [`extract_post_id`]
//! recognizes the common ones and otherwise tells the caller to supply the id
//! explicitly.

use regex::Regex;
use thiserror::Error;
use url::form_urlencoded;
use url::Url;

#[derive(Debug, Error)]
pub enum PostUrlError {
    #[error("unable to derive a post id from \"{url}\"; provide the post id explicitly")]
    Unrecognized { url: String },
}

/// Attempt to derive a Graph API post id from a URL.
///
/// Recognized shapes, tried in order:
/// - `story.php?story_fbid=<post>&id=<page>` → `<page>_<post>`
/// - an explicit `<page>_<post>` token anywhere in the URL → the token itself
/// - `/<page>/posts/<post>` → `<page>_<post>`; a bare `/posts/<post>` already
///   carries the full post id and is returned as-is
/// - a single numeric path component → the post id itself (raw ids therefore
///   pass straight through)
///
/// # Errors
///
/// Returns [`PostUrlError::Unrecognized`] when none of the shapes match.
pub fn extract_post_id(post_url: &str) -> Result<String, PostUrlError> {
    let (path, query) = split_url(post_url);

    let mut story_fbid: Option<String> = None;
    let mut page_id: Option<String> = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "story_fbid" if story_fbid.is_none() => story_fbid = Some(value.into_owned()),
            "id" if page_id.is_none() => page_id = Some(value.into_owned()),
            _ => {}
        }
    }
    if let (Some(post), Some(page)) = (story_fbid, page_id) {
        return Ok(format!("{page}_{post}"));
    }

    let pattern = Regex::new(r"\d+_+\d+").expect("valid post id pattern");
    if let Some(token) = pattern.find(post_url) {
        return Ok(token.as_str().to_owned());
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if let Some(idx) = segments.iter().position(|s| *s == "posts") {
        if let Some(post) = segments.get(idx + 1) {
            if idx == 0 {
                return Ok((*post).to_owned());
            }
            return Ok(format!("{}_{post}", segments[0]));
        }
    }

    if segments.len() == 1 && segments[0].chars().all(|c| c.is_ascii_digit()) {
        return Ok(segments[0].to_owned());
    }

    Err(PostUrlError::Unrecognized {
        url: post_url.to_owned(),
    })
}

/// Splits an input into `(path, query)`.
///
/// Absolute URLs go through [`Url`]; bare ids and scheme-less fragments are
/// not parseable as absolute URLs, so the query and fragment are peeled off
/// by hand for those.
fn split_url(input: &str) -> (String, String) {
    if let Ok(url) = Url::parse(input) {
        return (
            url.path().to_owned(),
            url.query().unwrap_or_default().to_owned(),
        );
    }

    let without_fragment = match input.split_once('#') {
        Some((head, _)) => head,
        None => input,
    };
    match without_fragment.split_once('?') {
        Some((path, query)) => (path.to_owned(), query.to_owned()),
        None => (without_fragment.to_owned(), String::new()),
    }
}
