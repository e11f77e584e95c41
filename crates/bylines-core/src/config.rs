use chrono::NaiveDate;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, for tests
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup; no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let parse_date = |var: &str, default: &str| -> Result<NaiveDate, ConfigError> {
        NaiveDate::parse_from_str(&or_default(var, default), "%Y-%m-%d")
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("BYLINES_ENV", "development"))?;
    let log_level = or_default("BYLINES_LOG_LEVEL", "info");

    // Only `discover` needs the key; the command enforces its presence.
    let capi_api_key = lookup("CAPI_API_KEY").ok().filter(|k| !k.is_empty());
    let search_url = or_default(
        "BYLINES_SEARCH_URL",
        "https://content.guardianapis.com/search",
    );

    let from_date = parse_date("BYLINES_FROM_DATE", "2013-10-01")?;
    let to_date = parse_date("BYLINES_TO_DATE", "2018-12-31")?;
    if from_date > to_date {
        return Err(invalid(
            "BYLINES_TO_DATE",
            format!("{to_date} is before BYLINES_FROM_DATE ({from_date})"),
        ));
    }

    let page_size = parse_u32("BYLINES_PAGE_SIZE", "50")?;
    if page_size == 0 {
        return Err(invalid("BYLINES_PAGE_SIZE", "must be at least 1".to_string()));
    }

    let discovery_concurrency = parse_usize("BYLINES_DISCOVERY_CONCURRENCY", "5")?;
    let image_concurrency = parse_usize("BYLINES_IMAGE_CONCURRENCY", "3")?;
    let image_dir = PathBuf::from(or_default("BYLINES_IMAGE_DIR", "./journalist-images"));

    let db_max_connections = parse_u32("BYLINES_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BYLINES_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "BYLINES_DB_MIN_CONNECTIONS",
            format!(
                "{db_min_connections} exceeds BYLINES_DB_MAX_CONNECTIONS ({db_max_connections})"
            ),
        ));
    }
    let db_acquire_timeout_secs = parse_u64("BYLINES_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("BYLINES_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "BYLINES_SCRAPER_USER_AGENT",
        "bylines/0.1 (journalist-research)",
    );
    let scraper_max_retries = parse_u32("BYLINES_SCRAPER_MAX_RETRIES", "8")?;
    let scraper_retry_backoff_base_ms = parse_u64("BYLINES_SCRAPER_RETRY_BACKOFF_BASE_MS", "100")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        capi_api_key,
        search_url,
        from_date,
        to_date,
        page_size,
        discovery_concurrency,
        image_concurrency,
        image_dir,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BYLINES_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
