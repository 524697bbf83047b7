use crate::callback::{
    CallbackConfig, CallbackHandler, CallbackMethod, CallbackReply, CallbackRequest,
};
use crate::core::errors::AnyPayError;
use axum::{
    extract::{ConnectInfo, FromRequest, Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Form, Router,
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

#[derive(Clone)]
struct CallbackState {
    handler: Arc<dyn CallbackHandler>,
    allowed_ips: Arc<[IpAddr]>,
}

/// HTTP listener for provider notifications
pub struct CallbackServer {
    config: CallbackConfig,
    handler: Arc<dyn CallbackHandler>,
}

impl CallbackServer {
    /// Fails when the configuration lists no HTTP method
    pub fn new(config: CallbackConfig, handler: impl CallbackHandler) -> Result<Self, AnyPayError> {
        config.validate()?;
        Ok(Self {
            config,
            handler: Arc::new(handler),
        })
    }

    pub fn config(&self) -> &CallbackConfig {
        &self.config
    }

    /// Router with the single callback route
    pub fn router(&self) -> Router {
        let filter = self
            .config
            .methods
            .iter()
            .map(|method| match method {
                CallbackMethod::Get => MethodFilter::GET,
                CallbackMethod::Post => MethodFilter::POST,
            })
            .reduce(MethodFilter::or)
            .unwrap_or(MethodFilter::POST);

        let state = CallbackState {
            handler: Arc::clone(&self.handler),
            allowed_ips: self.config.allowed_ips.clone().into(),
        };

        Router::new()
            .route(&self.config.normalized_path(), on(filter, dispatch))
            .with_state(state)
    }

    /// Bind on all interfaces at the configured port and serve until the task is dropped
    pub async fn serve(self) -> Result<(), AnyPayError> {
        let started = Instant::now();
        let router = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            AnyPayError::ServerError(format!("Failed to bind {}: {}", addr, e))
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AnyPayError::ServerError(format!("Failed to read bound address: {}", e)))?;

        if self.config.logging {
            let methods: Vec<&str> = self.config.methods.iter().map(|m| m.as_str()).collect();
            info!(
                url = %format!("http://{}{}", local_addr, self.config.normalized_path()),
                methods = %methods.join(","),
                startup_ms = started.elapsed().as_millis() as u64,
                "Callback endpoint started"
            );
        }

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| AnyPayError::ServerError(format!("Callback server failed: {}", e)))
    }
}

async fn dispatch(State(state): State<CallbackState>, request: Request) -> Response {
    let method = if request.method() == Method::GET {
        CallbackMethod::Get
    } else {
        CallbackMethod::Post
    };
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if !state.allowed_ips.is_empty()
        && !remote_addr.is_some_and(|ip| state.allowed_ips.contains(&ip))
    {
        warn!(remote = ?remote_addr, "Rejected callback from address outside the allow-list");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    let fields = match Form::<HashMap<String, String>>::from_request(request, &()).await {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected malformed callback");
            return rejection.into_response();
        }
    };

    debug!(method = method.as_str(), field_count = fields.len(), "Dispatching callback");
    let CallbackReply { status, body } = state
        .handler
        .handle(CallbackRequest {
            method,
            remote_addr,
            fields,
        })
        .await;

    (status, body).into_response()
}
