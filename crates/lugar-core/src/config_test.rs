use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("LUGAR_API_BASE_URL", "https://api.example.com/api");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "LUGAR_ENV"));
}

#[test]
fn build_app_config_fails_without_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "LUGAR_API_BASE_URL"),
        "expected MissingEnvVar(LUGAR_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_base_url_as_missing() {
    let mut map = HashMap::new();
    map.insert("LUGAR_API_BASE_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_rejects_base_url_without_scheme() {
    let mut map = HashMap::new();
    map.insert("LUGAR_API_BASE_URL", "api.example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LUGAR_API_BASE_URL"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.api_base_url, "https://api.example.com/api");
    assert!(cfg.api_token.is_none());
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 15);
    assert_eq!(cfg.user_agent, "lugar/0.1 (business-discovery)");
    assert_eq!(cfg.search_debounce_ms, 300);
    assert!((cfg.default_lat - 37.3891).abs() < f64::EPSILON);
    assert!((cfg.default_lng - (-5.9845)).abs() < f64::EPSILON);
    assert!(cfg.categories_path.is_none());
}

#[test]
fn api_token_is_redacted_in_debug_output() {
    let mut map = full_env();
    map.insert("LUGAR_API_TOKEN", "super-secret-token");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_token.as_deref(), Some("super-secret-token"));
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret-token"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn search_debounce_ms_override() {
    let mut map = full_env();
    map.insert("LUGAR_SEARCH_DEBOUNCE_MS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search_debounce_ms, 0);
}

#[test]
fn search_debounce_ms_invalid() {
    let mut map = full_env();
    map.insert("LUGAR_SEARCH_DEBOUNCE_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LUGAR_SEARCH_DEBOUNCE_MS"),
        "got: {result:?}"
    );
}

#[test]
fn request_timeout_secs_invalid() {
    let mut map = full_env();
    map.insert("LUGAR_REQUEST_TIMEOUT_SECS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LUGAR_REQUEST_TIMEOUT_SECS")
    );
}

#[test]
fn default_lat_out_of_range() {
    let mut map = full_env();
    map.insert("LUGAR_DEFAULT_LAT", "91.5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LUGAR_DEFAULT_LAT"),
        "got: {result:?}"
    );
}

#[test]
fn default_lng_not_a_number() {
    let mut map = full_env();
    map.insert("LUGAR_DEFAULT_LNG", "west");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LUGAR_DEFAULT_LNG")
    );
}

#[test]
fn categories_path_is_read_when_set() {
    let mut map = full_env();
    map.insert("LUGAR_CATEGORIES_PATH", "./config/categories.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.categories_path.as_deref(),
        Some(std::path::Path::new("./config/categories.yaml"))
    );
}
