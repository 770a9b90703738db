use std::path::PathBuf;

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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Root of the business API, e.g. `https://api.example.com/api`.
    pub api_base_url: String,
    /// Bearer token issued by the auth layer. Never logged.
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Trailing debounce applied to server-side search triggers. `0` disables it.
    pub search_debounce_ms: u64,
    /// City center used as the distance origin when geolocation is unavailable.
    pub default_lat: f64,
    pub default_lng: f64,
    /// Optional YAML file overriding the built-in category style table.
    pub categories_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("default_lat", &self.default_lat)
            .field("default_lng", &self.default_lng)
            .field("categories_path", &self.categories_path)
            .finish()
    }
}
