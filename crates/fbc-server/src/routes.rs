//! HTTP routes for the collection form.
//!
//! Every form submission responds with a full HTML page (status 200): errors
//! become a banner above the re-filled form, successes append a preview and a
//! `data:` download link. The access token travels only in the form body and
//! is never logged or persisted.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Html,
    routing::get,
    Extension, Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use fbc_core::export::comments_csv_string;
use fbc_core::post_url::extract_post_id;
use fbc_core::AppConfig;
use fbc_graph::{CommentCollection, GraphClient, GraphError};

use crate::middleware::{request_id, RequestId};
use crate::templates::{self, FormValues, Results};

const DEFAULT_CSV_NAME: &str = "comments.csv";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

/// Form fields exactly as the browser posts them; an empty string means the
/// field was left blank.
#[derive(Debug, Deserialize)]
pub struct CollectForm {
    #[serde(default)]
    pub post_url: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub csv_name: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    request_id: String,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(collect))
        .route("/healthz", get(healthz))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(
                    // Method and path only: the query string of proxied Graph
                    // URLs and anything token-shaped must stay out of spans.
                    |request: &axum::extract::Request| {
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %request.uri().path(),
                        )
                    },
                ))
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn show_form() -> Html<String> {
    Html(templates::render_form(None, &FormValues::default(), None))
}

async fn healthz(Extension(req_id): Extension<RequestId>) -> Json<HealthData> {
    Json(HealthData {
        status: "ok",
        request_id: req_id.0,
    })
}

async fn collect(State(state): State<AppState>, Form(form): Form<CollectForm>) -> Html<String> {
    let config = &state.config;
    let values = FormValues {
        post_url: form.post_url.trim().to_owned(),
        access_token: form.access_token.trim().to_owned(),
        post_id: form.post_id.trim().to_owned(),
        api_version: form.api_version.trim().to_owned(),
        csv_name: form.csv_name.trim().to_owned(),
    };

    if values.post_url.is_empty() || values.access_token.is_empty() {
        return Html(templates::render_form(
            Some("The post URL and the access token are required."),
            &values,
            None,
        ));
    }

    let post_id = if values.post_id.is_empty() {
        match extract_post_id(&values.post_url) {
            Ok(id) => id,
            Err(err) => {
                return Html(templates::render_form(
                    Some(&format!(
                        "{err}. Fill in the post id field to skip URL parsing."
                    )),
                    &values,
                    None,
                ));
            }
        }
    } else {
        values.post_id.clone()
    };

    let api_version = if values.api_version.is_empty() {
        config.graph_api_version.clone()
    } else {
        values.api_version.clone()
    };
    let csv_name = if values.csv_name.is_empty() {
        DEFAULT_CSV_NAME.to_owned()
    } else {
        values.csv_name.clone()
    };

    let collection =
        match fetch_collection(config, &values.access_token, &api_version, &post_id).await {
            Ok(collection) => collection,
            Err(err) => {
                tracing::warn!(post_id, error = %err, "comment collection failed");
                return Html(templates::render_form(
                    Some(&format!("Could not fetch the comments: {err}")),
                    &values,
                    None,
                ));
            }
        };

    let csv_content = match comments_csv_string(&collection.comments) {
        Ok(csv) => csv,
        Err(err) => {
            tracing::error!(error = %err, "CSV serialization failed");
            return Html(templates::render_form(
                Some(&format!("Could not serialize the comments: {err}")),
                &values,
                None,
            ));
        }
    };

    tracing::info!(
        post_id,
        comments = collection.comments.len(),
        pages = collection.pages_fetched,
        "collection finished"
    );

    let results = Results {
        preview: collection.comments.iter().take(10).cloned().collect(),
        comment_count: collection.comments.len(),
        summary_total: collection.summary_total,
        csv_name,
        csv_content,
    };

    Html(templates::render_form(None, &values, Some(&results)))
}

async fn fetch_collection(
    config: &AppConfig,
    access_token: &str,
    api_version: &str,
    post_id: &str,
) -> Result<CommentCollection, GraphError> {
    let client = GraphClient::with_base_url(
        access_token,
        api_version,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_ms,
        &config.graph_base_url,
    )?;
    client
        .collect_post_comments(
            post_id,
            config.page_size,
            config.max_pages,
            config.inter_request_delay_ms,
        )
        .await
}
