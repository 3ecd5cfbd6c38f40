//! Outbound request dispatch.
//!
//! Two dispatch modes with different blocking contracts: conversions are
//! awaited so the event handler observes the outcome, clicks are handed
//! to a background task whose outcome only reaches the audit log.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use url::Url;

use crate::metrics_defs;

/// Transport failures, kept apart from remote rejections so operators
/// can tell a dead network from a misconfigured account.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("endpoint rejected request with status {0}")]
    Rejected(u16),
}

/// Minimal outbound transport: issue a GET and report how it settled.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<(), TransportError>;
}

/// reqwest-backed transport used outside of tests.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<(), TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

/// Issues outbound tracking requests.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Await-completion dispatch. The caller decides what a failure means.
    pub async fn send(&self, url: &Url) -> Result<(), TransportError> {
        self.transport.get(url).await
    }

    /// Fire-and-forget dispatch.
    ///
    /// The request moves onto a background task and the handler keeps
    /// going; the outcome is only ever visible in the audit log. The
    /// returned handle is not needed for correctness.
    pub fn send_detached(&self, url: Url) -> JoinHandle<()> {
        let transport = self.transport.clone();
        tokio::spawn(async move {
            match transport.get(&url).await {
                Ok(()) => tracing::debug!(url = %url, "detached dispatch settled"),
                Err(e) => {
                    metrics::counter!(metrics_defs::DISPATCH_FAILURES.name).increment(1);
                    tracing::error!(url = %url, error = %e, "detached dispatch failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::MockTransport;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_send_records_request() {
        let transport = MockTransport::new();
        let dispatcher = Dispatcher::new(transport.clone());

        dispatcher.send(&url("https://t.example/pixel/v1?track=1")).await.unwrap();

        assert_eq!(transport.requests(), vec![url("https://t.example/pixel/v1?track=1")]);
    }

    #[tokio::test]
    async fn test_send_surfaces_transport_failure() {
        let transport = MockTransport::failing();
        let dispatcher = Dispatcher::new(transport.clone());

        let result = dispatcher.send(&url("https://t.example/pixel/v1")).await;

        assert!(matches!(result.unwrap_err(), TransportError::Network(_)));
        // The attempt was still made
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_send_detached_completes_off_the_handler_path() {
        let transport = MockTransport::new();
        let dispatcher = Dispatcher::new(transport.clone());

        let handle = dispatcher.send_detached(url("https://t.example/trk/v1?a=1"));
        handle.await.unwrap();

        assert_eq!(transport.requests(), vec![url("https://t.example/trk/v1?a=1")]);
    }

    #[tokio::test]
    async fn test_send_detached_swallows_failure() {
        let transport = MockTransport::failing();
        let dispatcher = Dispatcher::new(transport.clone());

        // The task logs the failure and finishes cleanly
        let handle = dispatcher.send_detached(url("https://t.example/trk/v1"));
        handle.await.unwrap();
    }
}
