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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_coord = |var: &str, default: &str, limit: f64| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value.abs() > limit {
            return Err(invalid(
                var,
                format!("{value} is outside the range -{limit}..={limit}"),
            ));
        }
        Ok(value)
    };

    let api_base_url = require("LUGAR_API_BASE_URL")?;
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "LUGAR_API_BASE_URL",
            "must start with http:// or https://".to_string(),
        ));
    }
    let api_token = lookup("LUGAR_API_TOKEN").ok().filter(|t| !t.is_empty());

    let env = parse_environment(&or_default("LUGAR_ENV", "development"))?;
    let log_level = or_default("LUGAR_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("LUGAR_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("LUGAR_USER_AGENT", "lugar/0.1 (business-discovery)");
    let search_debounce_ms = parse_u64("LUGAR_SEARCH_DEBOUNCE_MS", "300")?;

    let default_lat = parse_coord("LUGAR_DEFAULT_LAT", "37.3891", 90.0)?;
    let default_lng = parse_coord("LUGAR_DEFAULT_LNG", "-5.9845", 180.0)?;

    let categories_path = lookup("LUGAR_CATEGORIES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        api_token,
        request_timeout_secs,
        user_agent,
        search_debounce_ms,
        default_lat,
        default_lng,
        categories_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LUGAR_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
