use crate::api::client::AnyPayClient;
use crate::core::config::AnyPayConfig;
use crate::core::errors::AnyPayError;
use crate::core::kernel::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
use std::time::Duration;

/// Builder for `AnyPayClient`
///
/// Configuration is validated before the transport is created, so a missing
/// credential never results in a half-built client.
pub struct AnyPayBuilder {
    config: AnyPayConfig,
    rest_config: RestClientConfig,
    http_client: Option<reqwest::Client>,
}

impl AnyPayBuilder {
    pub fn new(config: AnyPayConfig) -> Self {
        Self {
            config,
            rest_config: RestClientConfig::default(),
            http_client: None,
        }
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.rest_config = self.rest_config.with_timeout(timeout_seconds);
        self
    }

    /// Set how long idle keep-alive connections are kept
    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.rest_config = self.rest_config.with_pool_idle_timeout(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.rest_config = self.rest_config.with_user_agent(user_agent);
        self
    }

    /// Share an existing `reqwest::Client` (and its connection pool)
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build a client using the reqwest transport
    pub fn build(self) -> Result<AnyPayClient<ReqwestRest>, AnyPayError> {
        self.config.validate()?;

        let mut rest_builder = RestClientBuilder::new(self.rest_config);
        if let Some(client) = self.http_client {
            rest_builder = rest_builder.with_client(client);
        }

        AnyPayClient::new(self.config, rest_builder.build()?)
    }

    /// Build a client over a caller-provided transport
    pub fn build_with_rest<R: RestClient>(self, rest: R) -> Result<AnyPayClient<R>, AnyPayError> {
        AnyPayClient::new(self.config, rest)
    }
}
