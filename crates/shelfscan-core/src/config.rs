use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation live here, decoupled from the real environment so
/// tests can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("SHELFSCAN_ENV", "development"))?;
    let log_level = or_default("SHELFSCAN_LOG_LEVEL", "info");

    let catalog_origin = or_default("SHELFSCAN_CATALOG_ORIGIN", "https://www.daraz.pk");
    let catalog_origin = validate_origin(&catalog_origin)
        .map_err(|reason| invalid("SHELFSCAN_CATALOG_ORIGIN", reason))?;

    let request_timeout_secs = parse_u64("SHELFSCAN_REQUEST_TIMEOUT_SECS", "15")?;
    let max_retries = parse_u32("SHELFSCAN_MAX_RETRIES", "1")?;
    let retry_backoff_base_secs = parse_u64("SHELFSCAN_RETRY_BACKOFF_BASE_SECS", "2")?;

    let webdriver_url = optional("SHELFSCAN_WEBDRIVER_URL");
    let render_timeout_secs = parse_u64("SHELFSCAN_RENDER_TIMEOUT_SECS", "30")?;
    let render_settle_ms = parse_u64("SHELFSCAN_RENDER_SETTLE_MS", "10000")?;
    let max_items_per_page = parse_usize("SHELFSCAN_MAX_ITEMS_PER_PAGE", "20")?;

    let cache_ttl_secs = parse_u64("SHELFSCAN_CACHE_TTL_SECS", "10800")?;
    let page_limit = parse_u32("SHELFSCAN_PAGE_LIMIT", "5")?;
    let max_results = parse_usize("SHELFSCAN_MAX_RESULTS", "10")?;
    let delay_min_ms = parse_u64("SHELFSCAN_DELAY_MIN_MS", "1000")?;
    let delay_max_ms = parse_u64("SHELFSCAN_DELAY_MAX_MS", "2000")?;

    let database_url = optional("DATABASE_URL");
    let db_max_connections = parse_u32("SHELFSCAN_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("SHELFSCAN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SHELFSCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if page_limit == 0 {
        return Err(invalid("SHELFSCAN_PAGE_LIMIT", "must be at least 1".into()));
    }
    if max_results == 0 {
        return Err(invalid("SHELFSCAN_MAX_RESULTS", "must be at least 1".into()));
    }
    if max_items_per_page == 0 {
        return Err(invalid(
            "SHELFSCAN_MAX_ITEMS_PER_PAGE",
            "must be at least 1".into(),
        ));
    }
    if delay_min_ms > delay_max_ms {
        return Err(invalid(
            "SHELFSCAN_DELAY_MIN_MS",
            format!("{delay_min_ms} exceeds SHELFSCAN_DELAY_MAX_MS ({delay_max_ms})"),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        catalog_origin,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_secs,
        webdriver_url,
        render_timeout_secs,
        render_settle_ms,
        max_items_per_page,
        cache_ttl_secs,
        page_limit,
        max_results,
        delay_min_ms,
        delay_max_ms,
        database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHELFSCAN_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Checks that `raw` is an `http(s)://host` origin and strips any trailing
/// slash.
fn validate_origin(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| format!("\"{raw}\" must start with http:// or https://"))?;
    if rest.is_empty() || rest.contains('/') {
        return Err(format!("\"{raw}\" must be a bare scheme and host"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
