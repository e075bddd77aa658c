use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use fbc_core::export::save_comments_csv;
use fbc_core::post_url::extract_post_id;
use fbc_core::Comment;
use fbc_graph::GraphClient;


#[derive(Debug, Parser)]
#[command(name = "fbc-cli")]
#[command(about = "Collects every comment on a Facebook post and saves them to CSV")]
struct Cli {
    /// Facebook post URL, or a raw post id.
    post_url: String,

    /// Graph API access token with permission to read the post.
    #[arg(env = "FB_ACCESS_TOKEN")]
    access_token: String,

    /// Skip URL parsing and use this post id directly.
    #[arg(long)]
    post_id: Option<String>,

    /// Output CSV path.
    #[arg(long, default_value = "comments.csv")]
    csv: PathBuf,

    /// Graph API version, e.g. "v23.0". Defaults to the configured version.
    #[arg(long)]
    api_version: Option<String>,

    /// Comments requested per page. Defaults to the configured page size.
    #[arg(long)]
    page_size: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = fbc_core::load_app_config_from_env()?;

    let post_id = match cli.post_id {
        Some(id) => id,
        None => extract_post_id(&cli.post_url).context("use --post-id to pass the id directly")?,
    };
    tracing::debug!(post_id, "resolved post id");

    let api_version = cli
        .api_version
        .as_deref()
        .unwrap_or(&config.graph_api_version);
    let page_size = cli.page_size.unwrap_or(config.page_size);

    let client = GraphClient::new(
        &cli.access_token,
        api_version,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_ms,
    )?;

    let collection = client
        .collect_post_comments(
            &post_id,
            page_size,
            config.max_pages,
            config.inter_request_delay_ms,
        )
        .await
        .context("failed to fetch comments")?;

    save_comments_csv(&collection.comments, &cli.csv)
        .with_context(|| format!("failed to write {}", cli.csv.display()))?;

    println!(
        "Fetched {} comments. Saved to {}.",
        collection.comments.len(),
        cli.csv.display()
    );
    println!("First 10 comments:");
    for line in preview_lines(&collection.comments, 10) {
        println!("{line}");
    }

    Ok(())
}

/// Renders up to `limit` preview lines in `- author: message` form.
fn preview_lines(comments: &[Comment], limit: usize) -> Vec<String> {
    comments
        .iter()
        .take(limit)
        .map(|comment| {
            let author = comment.author_name.as_deref().unwrap_or("Unknown author");
            format!("- {author}: {}", comment.message)
        })
        .collect()
}
