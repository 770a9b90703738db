//! HTTP client for the backend's business listing endpoint.

use std::time::Duration;

use async_trait::async_trait;
use lugar_core::RawBusinessRecord;
use reqwest::Client;
use serde_json::Value;

use super::{BusinessSource, CycleToken, SourceQuery};
use crate::error::DiscoveryError;

/// Path of the listing endpoint, relative to the API base URL.
const BUSINESSES_PATH: &str = "businesses/";

/// Business source backed by `GET {base}/businesses/`.
///
/// Accepts either a bare JSON array or a paginated `{"results": [...]}`
/// envelope. Individual records that fail to deserialize are skipped with a
/// warning instead of failing the whole response.
///
/// Failures are never retried here; the caller decides when to refetch.
pub struct HttpBusinessSource {
    client: Client,
    base_url: reqwest::Url,
    api_token: Option<String>,
}

impl HttpBusinessSource {
    /// Creates a source with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::InvalidBaseUrl`] if `base_url` is not an absolute URL.
    /// - [`DiscoveryError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, DiscoveryError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_token,
        })
    }

    /// Builds the listing URL for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidBaseUrl`] if the endpoint path cannot
    /// be joined onto the base URL.
    fn businesses_url(&self, query: &SourceQuery) -> Result<reqwest::Url, DiscoveryError> {
        let mut url =
            self.base_url
                .join(BUSINESSES_PATH)
                .map_err(|e| DiscoveryError::InvalidBaseUrl {
                    base_url: self.base_url.to_string(),
                    reason: e.to_string(),
                })?;

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            url.query_pairs_mut().append_pair("search", search);
        }
        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            url.query_pairs_mut().append_pair("category", category);
        }

        Ok(url)
    }
}

/// Parses the base URL and guarantees a trailing slash so `join` appends
/// instead of replacing the last path segment.
fn parse_base_url(base_url: &str) -> Result<reqwest::Url, DiscoveryError> {
    let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
    let url = reqwest::Url::parse(&normalized).map_err(|e| DiscoveryError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(DiscoveryError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: "expected an http(s) URL".to_owned(),
        });
    }
    Ok(url)
}

/// Extracts business records from a listing response body.
///
/// # Errors
///
/// Returns [`DiscoveryError::Deserialize`] if the body is not JSON or has
/// neither a top-level array nor a `results` / `businesses` array.
pub(crate) fn parse_business_list(
    body: &str,
    context: &str,
) -> Result<Vec<RawBusinessRecord>, DiscoveryError> {
    let deserialize_err = |source| DiscoveryError::Deserialize {
        context: context.to_owned(),
        source,
    };

    let value: Value = serde_json::from_str(body).map_err(deserialize_err)?;
    let items = match value {
        Value::Object(mut envelope) => {
            let list = envelope
                .remove("results")
                .or_else(|| envelope.remove("businesses"))
                .unwrap_or(Value::Object(envelope));
            serde_json::from_value::<Vec<Value>>(list).map_err(deserialize_err)?
        }
        other => serde_json::from_value::<Vec<Value>>(other).map_err(deserialize_err)?,
    };

    let total = items.len();
    let records: Vec<RawBusinessRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(context, index, error = %e, "skipping malformed business record");
                None
            }
        })
        .collect();

    tracing::debug!(context, total, parsed = records.len(), "parsed business list");
    Ok(records)
}

#[async_trait]
impl BusinessSource for HttpBusinessSource {
    async fn fetch(
        &self,
        query: &SourceQuery,
        token: &CycleToken,
    ) -> Result<Vec<RawBusinessRecord>, DiscoveryError> {
        let url = self.businesses_url(query)?;

        let mut request = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(api_token) = &self.api_token {
            request = request.bearer_auth(api_token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DiscoveryError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(DiscoveryError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        tracing::debug!(
            generation = token.generation(),
            superseded = token.is_cancelled(),
            "received business list"
        );
        parse_business_list(&body, url.as_str())
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
