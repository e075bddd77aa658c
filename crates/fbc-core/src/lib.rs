pub mod app_config;
pub mod config;
pub mod export;
pub mod post_url;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};

/// A single comment collected from a post.
///
/// Field values are kept exactly as the API delivered them; in particular
/// `created_time` is the verbatim timestamp string, never reparsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique within one collection run.
    pub comment_id: String,
    pub created_time: String,
    /// Absent when the API withholds author information.
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub message: String,
    /// Present only for replies; back-reference to another comment in the
    /// same collection.
    pub parent_id: Option<String>,
    /// `0` when the API omits the field.
    pub like_count: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
