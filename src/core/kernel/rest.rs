use crate::core::errors::AnyPayError;
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{instrument, trace};

/// Transport used by the API client
///
/// Implementations issue the HTTP request and hand back the decoded JSON body.
/// Every failure below the provider protocol (connect, TLS, timeout, body that
/// is not JSON) is reported as `AnyPayError::TransportError`.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Make a GET request
    ///
    /// # Arguments
    /// * `url` - Absolute request URL
    /// * `query_params` - Form-encoded query parameters, signature included
    ///
    /// # Returns
    /// The response body as a JSON value, regardless of HTTP status
    async fn get(&self, url: &str, query_params: &[(String, String)])
        -> Result<Value, AnyPayError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// How long an idle keep-alive connection stays in the pool
    pub pool_idle_timeout: Duration,
    /// TCP keep-alive probe interval
    pub tcp_keepalive: Duration,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            pool_idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Duration::from_millis(1000),
            user_agent: format!("anypay-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RestClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
#[derive(Default)]
pub struct RestClientBuilder {
    config: RestClientConfig,
    client: Option<Client>,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Reuse an existing `reqwest::Client` and its connection pool
    ///
    /// Timeout and pool settings from the config are ignored in that case; they
    /// belong to whoever built the client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the REST client
    pub fn build(self) -> Result<ReqwestRest, AnyPayError> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(Duration::from_secs(self.config.timeout_seconds))
                .pool_idle_timeout(self.config.pool_idle_timeout)
                .tcp_keepalive(self.config.tcp_keepalive)
                .user_agent(&self.config.user_agent)
                .build()
                .map_err(|e| {
                    AnyPayError::TransportError(format!("Failed to build HTTP client: {}", e))
                })?,
        };

        Ok(ReqwestRest {
            client,
            config: self.config,
        })
    }
}

/// Implementation of `RestClient` using reqwest
///
/// `reqwest::Client` keeps an internally synchronized keep-alive pool, so one
/// instance (or its clones) can serve concurrent calls.
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    /// Create a `ReqwestRest` with default transport settings
    pub fn new() -> Result<Self, AnyPayError> {
        RestClientBuilder::new(RestClientConfig::default()).build()
    }

    #[instrument(skip(self, response), fields(status = %response.status()))]
    async fn handle_response(&self, response: Response) -> Result<Value, AnyPayError> {
        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            AnyPayError::TransportError(format!("Failed to read response body: {}", e))
        })?;

        trace!("Response body: {}", response_text);

        // The provider reports application errors inside a JSON body, sometimes with
        // a non-2xx status, so the status only matters when the body is not JSON.
        serde_json::from_str(&response_text).map_err(|e| {
            AnyPayError::TransportError(format!(
                "Response with status {} is not JSON: {}",
                status, e
            ))
        })
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, query_params), fields(url = %url, param_count = query_params.len()))]
    async fn get(
        &self,
        url: &str,
        query_params: &[(String, String)],
    ) -> Result<Value, AnyPayError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .query(query_params)
            .send()
            .await
            .map_err(|e| AnyPayError::TransportError(format!("Request failed: {}", e)))?;

        self.handle_response(response).await
    }
}
