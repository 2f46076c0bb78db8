//! Scopus API client.
//!
//! Async HTTP client for the two operations the pipeline needs: the
//! paginated publication search and the full abstract retrieval. Built with
//! connection pooling, explicit timeouts and bounded retry middleware for
//! transient transport failures.

use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{AbstractsDocument, SearchResults};

/// The search and fetch operations the pipeline depends on.
///
/// `ScopusClient` is the single production implementation; tests substitute
/// in-memory fakes.
#[async_trait::async_trait]
pub trait ScopusApi {
    /// One page of a publication search, offset/limit pagination.
    async fn search(&self, query: &str, start: usize, count: usize) -> ClientResult<SearchResults>;

    /// The full abstract-retrieval document for one publication.
    async fn retrieve_abstract(&self, scopus_id: &str) -> ClientResult<AbstractsDocument>;
}

/// HTTP client for the Elsevier Scopus content API.
#[derive(Clone)]
pub struct ScopusClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// API key (optional).
    api_key: Option<String>,

    /// Content API base URL.
    base_url: String,
}

impl ScopusClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers
            .insert(reqwest::header::ACCEPT, "application/json".parse().expect("valid header"));

        if let Some(ref key) = config.api_key {
            headers.insert("X-ELS-APIKey", key.parse()?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(3);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, api_key: config.api_key, base_url: config.base_url })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Make a GET request and deserialize the JSON response.
    async fn get<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.get(url).query(params).send().await?;
        let response = self.handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;
        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            401 | 403 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::unauthorized(text))
            }
            429 => Err(ClientError::RateLimited),
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

#[async_trait::async_trait]
impl ScopusApi for ScopusClient {
    async fn search(&self, query: &str, start: usize, count: usize) -> ClientResult<SearchResults> {
        let url = format!("{}/search/scopus", self.base_url);

        let params = vec![
            ("query".to_string(), query.to_string()),
            ("start".to_string(), start.to_string()),
            ("count".to_string(), count.to_string()),
            ("view".to_string(), "STANDARD".to_string()),
        ];

        self.get(&url, &params).await
    }

    async fn retrieve_abstract(&self, scopus_id: &str) -> ClientResult<AbstractsDocument> {
        let url = format!("{}/abstract/scopus_id/{}", self.base_url, scopus_id);
        let params: Vec<(String, String)> = vec![];

        self.get(&url, &params).await
    }
}

impl std::fmt::Debug for ScopusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopusClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.has_api_key())
            .finish()
    }
}
