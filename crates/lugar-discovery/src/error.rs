use thiserror::Error;

/// Failures of a business data-source call.
///
/// Cancellation is deliberately absent: a superseded cycle is dropped, never
/// reported.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// Failure reported by a non-HTTP source implementation.
    #[error("data source error: {0}")]
    Source(String),
}

impl DiscoveryError {
    /// Message shown to the user in `FetchState::error`.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DiscoveryError::Http(e) if e.is_timeout() => {
                "The business service took too long to respond.".to_string()
            }
            DiscoveryError::Http(_) => "Could not reach the business service.".to_string(),
            DiscoveryError::NotFound { .. } => "The business service is unavailable.".to_string(),
            DiscoveryError::UnexpectedStatus { status, .. } => {
                format!("The business service returned an error (HTTP {status}).")
            }
            DiscoveryError::Deserialize { .. } => {
                "The business service sent an unreadable response.".to_string()
            }
            DiscoveryError::InvalidBaseUrl { .. } => {
                "The business service address is misconfigured.".to_string()
            }
            DiscoveryError::Source(message) => message.clone(),
        }
    }
}
