//! Server-rendered HTML for the collection form and its results.

use fbc_core::Comment;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Submitted values re-rendered into the form so a failed attempt keeps its
/// input. The access token is included: losing a 200-character token to a
/// typo in the URL field would make the form useless.
#[derive(Debug, Default)]
pub struct FormValues {
    pub post_url: String,
    pub access_token: String,
    pub post_id: String,
    pub api_version: String,
    pub csv_name: String,
}

/// Data for the results section shown after a successful collection.
#[derive(Debug)]
pub struct Results {
    pub preview: Vec<Comment>,
    pub comment_count: usize,
    pub summary_total: Option<i64>,
    pub csv_name: String,
    pub csv_content: String,
}

/// Render the collection form page.
///
/// `error` becomes a banner above the form; `results` appends the preview and
/// download section after a successful collection.
pub fn render_form(error: Option<&str>, values: &FormValues, results: Option<&Results>) -> String {
    let banner = match error {
        Some(message) => format!(r#"<div class="error-banner">{}</div>"#, html_escape(message)),
        None => String::new(),
    };

    let form = format!(
        r#"<form method="post" action="/">
    <label for="post_url">Post URL</label>
    <input type="text" id="post_url" name="post_url" value="{post_url}" placeholder="https://www.facebook.com/page/posts/1020304050">
    <label for="access_token">Access token</label>
    <input type="password" id="access_token" name="access_token" value="{access_token}">
    <label for="post_id">Post id (optional, skips URL parsing)</label>
    <input type="text" id="post_id" name="post_id" value="{post_id}">
    <label for="api_version">API version (optional)</label>
    <input type="text" id="api_version" name="api_version" value="{api_version}" placeholder="v23.0">
    <label for="csv_name">CSV file name (optional)</label>
    <input type="text" id="csv_name" name="csv_name" value="{csv_name}" placeholder="comments.csv">
    <button type="submit">Collect comments</button>
</form>"#,
        post_url = html_escape(&values.post_url),
        access_token = html_escape(&values.access_token),
        post_id = html_escape(&values.post_id),
        api_version = html_escape(&values.api_version),
        csv_name = html_escape(&values.csv_name),
    );

    let results_html = match results {
        Some(results) => render_results(results),
        None => String::new(),
    };

    let content = format!(
        r#"<div class="container">
<h2>Collect the comments on a Facebook post</h2>
{banner}
{form}
{results_html}
</div>"#
    );

    build_page("Comments", &content)
}

fn render_results(results: &Results) -> String {
    let items: String = results
        .preview
        .iter()
        .map(|comment| {
            let author = comment.author_name.as_deref().unwrap_or("Unknown author");
            format!(
                "<li><strong>{}</strong>: {}</li>",
                html_escape(author),
                html_escape(&comment.message)
            )
        })
        .collect();

    let total_note = match results.summary_total {
        Some(total) => format!(" (Graph reports {total} in total)"),
        None => String::new(),
    };

    format!(
        r#"<div class="results">
    <h3>{count} comments collected{total_note}</h3>
    <ul class="preview">{items}</ul>
    <a class="download-btn" href="{href}" download="{name}">Download {name}</a>
</div>"#,
        count = results.comment_count,
        href = csv_data_url(&results.csv_content),
        name = html_escape(&results.csv_name),
    )
}

/// Builds a `data:` URI so the CSV downloads straight from the rendered page
/// and no file is stored server side.
fn csv_data_url(csv_content: &str) -> String {
    format!(
        "data:text/csv;charset=utf-8,{}",
        utf8_percent_encode(csv_content, NON_ALPHANUMERIC)
    )
}

// --- Helpers ---

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - Comment Collector</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.header{{background:#1a1a1a;color:#fff;padding:12px 24px;}}
.header h1{{font-size:18px;font-weight:600;}}
.container{{max-width:720px;margin:0 auto;padding:24px;}}
h2{{margin-bottom:16px;}}
form{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:16px;margin-bottom:16px;}}
label{{display:block;font-size:13px;color:#555;margin-bottom:4px;}}
input{{width:100%;padding:8px;margin-bottom:12px;border:1px solid #ccc;border-radius:4px;font-size:14px;}}
button{{padding:8px 20px;background:#0066cc;color:#fff;border:none;border-radius:4px;font-size:14px;cursor:pointer;}}
button:hover{{background:#004499;}}
.error-banner{{background:#fce4ec;border:1px solid #f8bbd0;padding:8px 12px;border-radius:4px;font-size:13px;color:#c62828;margin-bottom:12px;}}
.results{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:16px;}}
.results h3{{font-size:16px;margin-bottom:8px;}}
.preview{{list-style:none;margin-bottom:12px;}}
.preview li{{font-size:13px;color:#555;padding:2px 0;border-bottom:1px solid #f0f0f0;}}
.download-btn{{display:inline-block;padding:6px 16px;background:#0066cc;color:#fff;border-radius:4px;text-decoration:none;font-size:13px;font-weight:500;}}
.download-btn:hover{{background:#004499;}}
</style>
</head>
<body>
<div class="header">
    <h1>Comment Collector</h1>
</div>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
