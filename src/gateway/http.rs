//! HTTP implementation of the assistant gateway

use super::{AssistantGateway, AssistantReply, ExchangeRequest, GatewayError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

/// Talks JSON over HTTP to the assistant backend.
///
/// Uses reqwest's default timeouts (none) and never retries.
pub struct HttpGateway {
    client: Client,
    endpoint: Url,
    health_url: Url,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

impl HttpGateway {
    /// `endpoint` is the full chat URL, e.g. `http://localhost:8000/chat`.
    /// The health check lives next to it (`/health` in the same directory).
    pub fn new(endpoint: &str) -> Result<Self, GatewayError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| GatewayError::new(format!("Invalid assistant URL {endpoint}: {e}")))?;
        let health_url = endpoint
            .join("health")
            .map_err(|e| GatewayError::new(format!("Invalid health URL: {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("lead-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::new(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            health_url,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the backend whether it is up
    pub async fn health(&self) -> Result<(), GatewayError> {
        let response = self
            .client
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(|e| GatewayError::transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::transport(&e))?;
        if !status.is_success() {
            return Err(GatewayError::status(status, &body));
        }

        let health: HealthResponse =
            serde_json::from_str(&body).map_err(|e| GatewayError::decode(&e, &body))?;
        if health.status == "healthy" {
            Ok(())
        } else {
            Err(GatewayError::new(format!(
                "Assistant reports status {}",
                health.status
            )))
        }
    }
}

#[async_trait]
impl AssistantGateway for HttpGateway {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<AssistantReply, GatewayError> {
        tracing::debug!(
            session_id = %request.session_id,
            endpoint = %self.endpoint,
            "Sending message to assistant"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::new(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(GatewayError::status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::decode(&e, &body))
    }
}
