use async_trait::async_trait;
use jobup_engine::notify::{Notifier, NotifyError};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Ships the run log to a messaging webhook as a Slack-compatible
/// `{"text": ...}` payload.
pub struct WebhookNotifier {
    url: String,
    http: Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotifyError(e.to_string()))?;
        Ok(Self { url, http })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn publish(&self, body: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "text": body }))
            .send()
            .await
            .map_err(|e| NotifyError(e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| NotifyError(e.to_string()))?;
        Ok(())
    }
}
