//! Assistant gateway abstraction
//!
//! One request/response round trip to the remote qualification assistant.
//! The gateway never retries and exposes a single failure type; recovery is
//! the conversation engine's business.

mod http;

pub use http::HttpGateway;

use crate::session::Profile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Request body sent to the assistant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub session_id: String,
    #[serde(rename = "user")]
    pub profile: Profile,
    pub message: String,
}

/// Successful assistant response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    #[serde(rename = "response")]
    pub reply: String,
    pub qualified: bool,
}

impl AssistantReply {
    pub fn new(reply: impl Into<String>, qualified: bool) -> Self {
        Self {
            reply: reply.into(),
            qualified,
        }
    }
}

/// Any transport, status or decoding failure during an exchange
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(format!("Request timeout: {err}"))
        } else if err.is_connect() {
            Self::new(format!("Connection failed: {err}"))
        } else {
            Self::new(format!("Request failed: {err}"))
        }
    }

    pub fn status(status: reqwest::StatusCode, body: &str) -> Self {
        Self::new(format!("HTTP {status}: {body}"))
    }

    pub fn decode(err: &serde_json::Error, body: &str) -> Self {
        Self::new(format!("Failed to parse response: {err} - body: {body}"))
    }
}

/// Client side of the assistant protocol
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Send one user message and wait for the assistant's reply
    async fn exchange(&self, request: &ExchangeRequest) -> Result<AssistantReply, GatewayError>;
}

#[async_trait]
impl<T: AssistantGateway + ?Sized> AssistantGateway for Arc<T> {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<AssistantReply, GatewayError> {
        (**self).exchange(request).await
    }
}

/// Logging wrapper for gateways
pub struct LoggingGateway<G> {
    inner: G,
}

impl<G: AssistantGateway> LoggingGateway<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: AssistantGateway> AssistantGateway for LoggingGateway<G> {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<AssistantReply, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.exchange(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    session_id = %request.session_id,
                    duration_ms = %duration.as_millis(),
                    qualified = reply.qualified,
                    "Assistant exchange completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    session_id = %request.session_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    "Assistant exchange failed"
                );
            }
        }

        result
    }
}
