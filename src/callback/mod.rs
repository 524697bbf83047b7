//! Endpoint receiving asynchronous notifications from the provider.
//!
//! Independent of `AnyPayClient`: it only needs a path, the HTTP methods to
//! accept and a handler. Pair `allowed_ips` with
//! [`AnyPayClient::get_service_ip`](crate::api::AnyPayClient::get_service_ip)
//! to drop notifications that do not come from the provider.

pub mod server;

use crate::core::config::ConfigError;
use async_trait::async_trait;
use axum::http::StatusCode;
use std::collections::HashMap;
use std::future::Future;
use std::net::IpAddr;

pub use server::CallbackServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackMethod {
    Get,
    Post,
}

impl CallbackMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallbackConfig {
    pub path: String,
    pub methods: Vec<CallbackMethod>,
    pub port: u16,
    /// Log an event once the listener is bound
    pub logging: bool,
    /// Empty means every source address is accepted
    pub allowed_ips: Vec<IpAddr>,
}

impl CallbackConfig {
    /// POST-only endpoint on `path`
    pub fn new(path: impl Into<String>, port: u16) -> Self {
        Self {
            path: path.into(),
            methods: vec![CallbackMethod::Post],
            port,
            logging: true,
            allowed_ips: Vec::new(),
        }
    }

    pub fn with_methods(mut self, methods: Vec<CallbackMethod>) -> Self {
        self.methods = methods;
        self
    }

    pub const fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    pub fn with_allowed_ips(mut self, allowed_ips: Vec<IpAddr>) -> Self {
        self.allowed_ips = allowed_ips;
        self
    }

    /// Path with exactly one leading `/`
    pub fn normalized_path(&self) -> String {
        format!("/{}", self.path.trim_start_matches('/'))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.methods.is_empty() {
            return Err(ConfigError::InvalidConfiguration(
                "Specify at least one HTTP method for the callback handler".to_string(),
            ));
        }
        Ok(())
    }
}

/// A notification as received from the provider
#[derive(Debug, Clone)]
pub struct CallbackRequest {
    pub method: CallbackMethod,
    pub remote_addr: Option<IpAddr>,
    /// Form fields from the query string (GET) or urlencoded body (POST)
    pub fields: HashMap<String, String>,
}

impl CallbackRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackReply {
    pub status: StatusCode,
    pub body: String,
}

impl CallbackReply {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `200 OK`, the acknowledgement the provider expects
    pub fn ok() -> Self {
        Self::new(StatusCode::OK, "OK")
    }
}

#[async_trait]
pub trait CallbackHandler: Send + Sync + 'static {
    async fn handle(&self, request: CallbackRequest) -> CallbackReply;
}

#[async_trait]
impl<F, Fut> CallbackHandler for F
where
    F: Fn(CallbackRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallbackReply> + Send + 'static,
{
    async fn handle(&self, request: CallbackRequest) -> CallbackReply {
        (self)(request).await
    }
}
