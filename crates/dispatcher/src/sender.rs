//! Webhook delivery of notification messages.

use delivery::{CallScope, HttpMethod, HttpRequest, RetriedResponse, RetryingClient};
use tracing::debug;

use crate::{ChannelError, SlackMessage};

/// Posts messages to webhook URLs through a [`RetryingClient`].
#[derive(Debug, Clone)]
pub struct WebhookSender {
    client: RetryingClient,
}

impl WebhookSender {
    /// Wraps `client`. With `widen_post`, `POST` joins the client's
    /// retry-eligible methods.
    pub fn new(client: RetryingClient, widen_post: bool) -> Self {
        let client = if widen_post {
            let config = client.config().clone().with_retry_method(HttpMethod::Post);
            client.with_config(config)
        } else {
            client
        };
        Self { client }
    }

    /// Delivers `message` to `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`] when the retries are exhausted, the scope
    /// ends, or the final response is not `2xx`.
    pub async fn send(
        &self,
        url: &str,
        message: &SlackMessage,
        scope: &CallScope,
    ) -> Result<RetriedResponse, ChannelError> {
        let request = HttpRequest::post_json(url, message)?;
        let result = self.client.fetch_with_retry(&request, scope).await?;
        if !result.is_success() {
            return Err(ChannelError::Rejected {
                status: result.response.status,
                attempt: result.attempt,
            });
        }
        debug!(url, attempt = result.attempt, "Webhook delivered");
        Ok(result)
    }
}
