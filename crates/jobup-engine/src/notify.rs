use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers the rendered run log through an external messaging channel at run
/// end. Delivery failure is the caller's to log; the orchestrator never
/// retries.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, body: &str) -> Result<(), NotifyError>;
}

/// Used when no delivery channel is configured.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn publish(&self, _body: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
