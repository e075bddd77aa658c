use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime configuration shared by the CLI and web binaries.
///
/// Holds no secrets: access tokens arrive per invocation or per form
/// submission and are never part of the configuration, so `Debug` can be
/// derived.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub graph_base_url: String,
    pub graph_api_version: String,
    /// Comments requested per page.
    pub page_size: u32,
    /// Upper bound on the cursor chain before a collection run fails.
    pub max_pages: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub inter_request_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}
