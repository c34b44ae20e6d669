use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error("failed to enqueue email: {0}")]
pub struct EmailError(pub String);

/// Boundary to the notification queue. Dispatch is best-effort and happens
/// after the user row has committed; a failure here must never surface to
/// the registering client.
#[async_trait]
pub trait EmailSink: Send + Sync {
    async fn send_registration_email(
        &self,
        email: &str,
        username: &str,
    ) -> Result<(), EmailError>;
}

/// Stand-in sink that logs instead of talking to an external queue.
pub struct LogEmailSink;

#[async_trait]
impl EmailSink for LogEmailSink {
    async fn send_registration_email(
        &self,
        email: &str,
        username: &str,
    ) -> Result<(), EmailError> {
        tracing::info!("Queued registration email to {} for user {}", email, username);
        Ok(())
    }
}

/// Fire-and-forget dispatch of the registration notification.
pub fn spawn_registration_email(
    sink: std::sync::Arc<dyn EmailSink>,
    email: String,
    username: String,
) {
    tokio::spawn(async move {
        if let Err(e) = sink.send_registration_email(&email, &username).await {
            tracing::warn!("Registration email for {} not sent: {}", username, e);
        }
    });
}
