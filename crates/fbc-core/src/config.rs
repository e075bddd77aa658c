use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, which suits
/// tests and callers that manage env setup themselves.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup instead of `set_var`/
/// `remove_var`. Every key has a default; nothing is required.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("FBC_ENV", "development"));

    let bind_addr = parse("FBC_BIND_ADDR", "0.0.0.0:8060")?;
    let log_level = or_default("FBC_LOG_LEVEL", "info");

    let graph_base_url = or_default("FBC_GRAPH_BASE_URL", "https://graph.facebook.com");
    let graph_api_version = or_default("FBC_GRAPH_API_VERSION", "v23.0");
    let page_size = parse_u32("FBC_PAGE_SIZE", "100")?;
    let max_pages = parse_usize("FBC_MAX_PAGES", "200")?;

    let request_timeout_secs = parse_u64("FBC_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("FBC_USER_AGENT", "fbc/0.1 (comment-export)");
    let inter_request_delay_ms = parse_u64("FBC_INTER_REQUEST_DELAY_MS", "0")?;
    let max_retries = parse_u32("FBC_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("FBC_RETRY_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        graph_base_url,
        graph_api_version,
        page_size,
        max_pages,
        request_timeout_secs,
        user_agent,
        inter_request_delay_ms,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
