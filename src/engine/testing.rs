//! Mock gateways for testing
//!
//! These mocks enable engine and session tests without a network.

use crate::gateway::{AssistantGateway, AssistantReply, ExchangeRequest, GatewayError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Gateway
// ============================================================================

/// Mock gateway that returns queued outcomes
#[derive(Default)]
pub struct MockGateway {
    responses: Mutex<VecDeque<Result<AssistantReply, GatewayError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<ExchangeRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: AssistantReply) {
        self.responses.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: GatewayError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<ExchangeRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: &ExchangeRequest) -> Result<AssistantReply, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::new("No mock response queued")))
    }
}

#[async_trait]
impl AssistantGateway for MockGateway {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<AssistantReply, GatewayError> {
        self.next(request)
    }
}

// ============================================================================
// Delayed Mock Gateway (for in-flight testing)
// ============================================================================

/// Mock gateway that holds every exchange open for a while
pub struct DelayedMockGateway {
    inner: MockGateway,
    delay: Duration,
    /// Signalled once per request after it is recorded
    pub request_started: Arc<Notify>,
}

impl DelayedMockGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockGateway::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, reply: AssistantReply) {
        self.inner.queue_reply(reply);
    }

    pub fn recorded_requests(&self) -> Vec<ExchangeRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl AssistantGateway for DelayedMockGateway {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<AssistantReply, GatewayError> {
        let result = self.inner.next(request);
        // notify_one keeps a permit if the test is not waiting yet
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Profile;

    fn request() -> ExchangeRequest {
        ExchangeRequest {
            session_id: "sess-1".to_string(),
            profile: Profile::new("Ana", "a@x.com", "555"),
            message: "hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_gateway() {
        let mock = MockGateway::new();
        mock.queue_reply(AssistantReply::new("Hello", false));

        let reply = mock.exchange(&request()).await.unwrap();
        assert_eq!(reply.reply, "Hello");

        // Second call should fail (no more responses)
        assert!(mock.exchange(&request()).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }
}
