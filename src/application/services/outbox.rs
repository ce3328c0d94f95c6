use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    models::{OutboxMessage, SmsPayload},
    repositories::OutboxRepository,
};

pub const SMS_MESSAGE_TYPE: &str = "sms";

/// Producer side of the outbox: side effects are recorded as rows and carried
/// out later by the dispatcher.
#[derive(Clone)]
pub struct OutboxService {
    repo: Arc<dyn OutboxRepository>,
}

impl OutboxService {
    pub fn new(repo: Arc<dyn OutboxRepository>) -> Self {
        Self { repo }
    }

    pub async fn enqueue<T: Serialize>(&self, message_type: &str, payload: &T) -> anyhow::Result<Uuid> {
        let payload = serde_json::to_string(payload)
            .with_context(|| format!("failed to serialize {message_type} payload"))?;
        let message = OutboxMessage::new(message_type, payload);
        self.repo.insert(&message).await?;

        tracing::debug!(id = %message.id, message_type, "outbox message enqueued");
        Ok(message.id)
    }

    /// The code travels inside the payload so every retry resends the same OTP.
    pub async fn enqueue_sms_otp(
        &self,
        to: &str,
        code: &str,
        template: Option<&str>,
    ) -> anyhow::Result<Uuid> {
        let payload = SmsPayload {
            to: Some(to.to_string()),
            template: template.map(str::to_string),
            code: Some(code.to_string()),
        };
        self.enqueue(SMS_MESSAGE_TYPE, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemoryOutboxRepository;

    #[tokio::test]
    async fn enqueued_sms_keeps_the_code_in_the_payload() {
        let repo = Arc::new(InMemoryOutboxRepository::new());
        let service = OutboxService::new(repo.clone());

        let id = service
            .enqueue_sms_otp("923001234567", "482913", Some("login"))
            .await
            .unwrap();

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.message_type, "sms");
        assert!(!stored.processed);
        assert_eq!(stored.retry_count, 0);
        let payload: SmsPayload = serde_json::from_str(&stored.payload).unwrap();
        assert_eq!(payload.code.as_deref(), Some("482913"));
        assert_eq!(payload.template.as_deref(), Some("login"));
    }
}
