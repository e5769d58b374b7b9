//! Content source (Sanity) query client.
//!
//! # Architecture
//!
//! - Plain `reqwest` GET requests against the GROQ query endpoint
//! - The content source is the only product catalog - no local copy
//! - In-memory caching via `moka` for query responses (configurable TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use trendcart_storefront::sanity::SanityClient;
//!
//! let client = SanityClient::new(&config.sanity);
//! let products = client.trending_products().await?;
//! ```

pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use trendcart_core::ProductSummary;

use crate::config::SanityConfig;
use types::{QueryResponse, TrendingRecord, convert_trending};

/// Trending products, newest first.
pub const TRENDING_QUERY: &str = r#"*[_type == 'trendingProduct']|order(_createdAt desc){
  name,
  code,
  price,
  image,
  "currentSlug": slug.current
}"#;

/// Errors that can occur when querying the content source.
#[derive(Debug, Error)]
pub enum SanityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    /// Non-success status from the query API.
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Rate limited by the query API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// SanityClient
// =============================================================================

/// Client for the content query API.
///
/// Query results are cached for the configured TTL.
#[derive(Clone)]
pub struct SanityClient {
    inner: Arc<SanityClientInner>,
}

struct SanityClientInner {
    client: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
    cache: Cache<String, Arc<[ProductSummary]>>,
}

impl SanityClient {
    /// Create a new query client.
    #[must_use]
    pub fn new(config: &SanityConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(SanityClientInner {
                client: reqwest::Client::new(),
                endpoint: config.query_endpoint(),
                token: config.token.clone(),
                cache,
            }),
        }
    }

    /// Run a GROQ query and decode its `result`.
    async fn query<T: DeserializeOwned>(&self, groq: &str) -> Result<T, SanityError> {
        let url = url::Url::parse_with_params(&self.inner.endpoint, &[("query", groq)])?;

        let mut request = self.inner.client.get(url);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SanityError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "content API returned non-success status"
            );
            return Err(SanityError::Status {
                status,
                body: response_text.chars().take(200).collect(),
            });
        }

        let response: QueryResponse<T> = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "failed to parse content API response"
            );
            SanityError::Parse(e)
        })?;

        tracing::debug!(server_ms = ?response.ms, "content query completed");
        Ok(response.result)
    }

    /// Fetch the trending products in source order.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn trending_products(&self) -> Result<Arc<[ProductSummary]>, SanityError> {
        let cache_key = TRENDING_QUERY.to_string();
        if let Some(cached) = self.inner.cache.get(&cache_key).await {
            tracing::debug!("trending products served from cache");
            return Ok(cached);
        }

        let records: Vec<TrendingRecord> = self.query(TRENDING_QUERY).await?;
        let products: Arc<[ProductSummary]> = convert_trending(records).into();

        self.inner.cache.insert(cache_key, Arc::clone(&products)).await;
        Ok(products)
    }
}
