//! Webhook dispatcher — best-effort sweep over validated results.
//!
//! Each eligible result is POSTed once as JSON; there are no retries and
//! no rollback. Ineligible results (error tag or missing label) are counted
//! as errors without touching the network.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::DispatchError;
use crate::pipeline::types::{DispatchOutcome, FileResult, WebhookPayload};

/// Transport seam for webhook delivery.
///
/// One call per payload; a 2xx response is `Ok`, anything else is an error.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post(&self, url: &str, payload: &WebhookPayload) -> Result<(), DispatchError>;
}

/// HTTP transport over reqwest. POSTs JSON with `Content-Type: application/json`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post(&self, url: &str, payload: &WebhookPayload) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Dispatches a result list to a webhook endpoint, counting per-item
/// success and failure.
pub struct WebhookDispatcher {
    transport: Arc<dyn WebhookTransport>,
}

impl WebhookDispatcher {
    /// Create a dispatcher over the given transport.
    pub fn new(transport: Arc<dyn WebhookTransport>) -> Self {
        Self { transport }
    }

    /// Create a dispatcher over a plain HTTP transport.
    pub fn over_http(timeout: std::time::Duration) -> Self {
        Self::new(Arc::new(HttpTransport::new(timeout)))
    }

    /// Sweep the result list in order, POSTing eligible entries.
    ///
    /// Every result increments exactly one counter; a mid-batch failure
    /// never blocks subsequent items.
    pub async fn dispatch(&self, results: &[FileResult], url: &str) -> DispatchOutcome {
        info!(count = results.len(), "Dispatching results to webhook");
        let mut outcome = DispatchOutcome::default();

        for result in results {
            let Some(payload) = WebhookPayload::from_result(result) else {
                debug!(file = %result.file_name, "Skipping ineligible result");
                outcome.error_count += 1;
                continue;
            };

            match self.transport.post(url, &payload).await {
                Ok(()) => {
                    debug!(file = %result.file_name, "Webhook accepted payload");
                    outcome.success_count += 1;
                }
                Err(e) => {
                    warn!(file = %result.file_name, error = %e, "Webhook delivery failed");
                    outcome.error_count += 1;
                }
            }
        }

        info!(
            success = outcome.success_count,
            errors = outcome.error_count,
            "Dispatch sweep complete"
        );
        outcome
    }
}
