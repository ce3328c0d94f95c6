use std::{sync::Arc, time::Duration};

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    application::services::sms::SmsSender,
    domain::{
        models::{
            Notification, NotificationPayload, NotificationTemplate, OutboxMessage,
            OutboxMessageKind, SmsPayload,
        },
        repositories::{NotificationRepository, OutboxRepository},
    },
};

const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct OutboxDispatcherConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub batch_size: usize,
    /// Failed messages older than this are closed without another attempt.
    pub stale_after: chrono::Duration,
    pub max_sms_retries: u32,
}

impl Default for OutboxDispatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(5),
            batch_size: 25,
            stale_after: chrono::Duration::minutes(5),
            max_sms_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub fetched: usize,
    pub dispatched: usize,
    pub failed: usize,
    pub abandoned: usize,
    pub skipped: usize,
}

enum Outcome {
    Dispatched,
    Failed,
    Abandoned,
    Skipped,
}

/// Polls the outbox and carries out pending side effects: OTP SMS through the
/// configured gateway and in-app notifications through the repository.
///
/// There is no claiming lease. Two dispatchers sharing a table can both pick
/// up the same row.
pub struct OutboxDispatcher {
    outbox_repo: Arc<dyn OutboxRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    sms_sender: Arc<dyn SmsSender>,
    config: OutboxDispatcherConfig,
}

impl OutboxDispatcher {
    pub fn new(
        outbox_repo: Arc<dyn OutboxRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        sms_sender: Arc<dyn SmsSender>,
        config: OutboxDispatcherConfig,
    ) -> Self {
        Self {
            outbox_repo,
            notification_repo,
            sms_sender,
            config,
        }
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    pub async fn run(&self, cancel: CancellationToken) {
        let interval = self.config.interval.max(MIN_INTERVAL);
        tracing::info!(
            enabled = self.config.enabled,
            interval_secs = interval.as_secs(),
            batch_size = self.config.batch_size,
            sms_sender = self.sms_sender.name(),
            "outbox dispatcher started"
        );

        loop {
            if self.config.enabled {
                match self.dispatch_once(Utc::now()).await {
                    Ok(report) if report.fetched > 0 => {
                        tracing::info!(?report, "outbox batch processed");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::error!(error = ?err, "outbox dispatch cycle failed"),
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancel.cancelled() => break,
            }
        }

        tracing::info!("outbox dispatcher stopped");
    }

    /// Processes one batch and persists every message it touched.
    pub async fn dispatch_once(&self, now: DateTime<Utc>) -> anyhow::Result<DispatchReport> {
        let mut messages = self
            .outbox_repo
            .fetch_pending(self.config.batch_size)
            .await
            .context("failed to fetch pending outbox messages")?;

        let mut report = DispatchReport {
            fetched: messages.len(),
            ..Default::default()
        };
        if messages.is_empty() {
            return Ok(report);
        }

        for message in messages.iter_mut() {
            match self.process(message, now).await {
                Outcome::Dispatched => report.dispatched += 1,
                Outcome::Failed => report.failed += 1,
                Outcome::Abandoned => report.abandoned += 1,
                Outcome::Skipped => report.skipped += 1,
            }
        }

        self.outbox_repo
            .save(&messages)
            .await
            .context("failed to save outbox batch")?;

        Ok(report)
    }

    async fn process(&self, message: &mut OutboxMessage, now: DateTime<Utc>) -> Outcome {
        if message.is_stale(now, self.config.stale_after) {
            tracing::warn!(
                id = %message.id,
                message_type = %message.message_type,
                error = message.error.as_deref().unwrap_or_default(),
                "abandoning stale outbox message"
            );
            message.abandon(now);
            return Outcome::Abandoned;
        }

        if message.retries_exhausted(self.config.max_sms_retries) {
            tracing::warn!(
                id = %message.id,
                retries = message.retry_count,
                "sms retry budget exhausted"
            );
            message.abandon_after_retries(now);
            return Outcome::Abandoned;
        }

        let result = match message.kind() {
            OutboxMessageKind::Sms => self.send_sms(message).await,
            OutboxMessageKind::Notification(template) => {
                self.create_notification(message, template).await
            }
            OutboxMessageKind::Unsupported => {
                tracing::debug!(
                    id = %message.id,
                    message_type = %message.message_type,
                    "skipping unsupported outbox message"
                );
                message.mark_skipped(now);
                return Outcome::Skipped;
            }
        };

        match result {
            Ok(()) => {
                message.mark_processed(now);
                Outcome::Dispatched
            }
            Err(err) => {
                tracing::warn!(
                    id = %message.id,
                    message_type = %message.message_type,
                    attempt = message.retry_count + 1,
                    error = %format!("{err:#}"),
                    "outbox message dispatch failed"
                );
                message.record_failure(format!("{err:#}"));
                Outcome::Failed
            }
        }
    }

    async fn send_sms(&self, message: &OutboxMessage) -> anyhow::Result<()> {
        let payload: SmsPayload =
            serde_json::from_str(&message.payload).context("invalid SMS payload")?;

        let code = payload
            .code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| anyhow::anyhow!("SMS payload missing required OTP code"))?;
        let to = payload.to.as_deref().unwrap_or_default();

        self.sms_sender
            .send_otp(to, code, payload.template.as_deref())
            .await
    }

    async fn create_notification(
        &self,
        message: &OutboxMessage,
        template: NotificationTemplate,
    ) -> anyhow::Result<()> {
        let payload: NotificationPayload = serde_json::from_str(&message.payload)
            .with_context(|| format!("invalid {} payload", message.message_type))?;
        let user_id = payload
            .user_id
            .ok_or_else(|| anyhow::anyhow!("{} payload missing user id", message.message_type))?;

        let rendered = template.render(&payload);
        let notification = Notification::unread(
            user_id,
            rendered.notification_type,
            rendered.title,
            rendered.message,
            Some(message.payload.clone()),
        );

        self.notification_repo.insert(&notification).await?;
        tracing::debug!(
            id = %message.id,
            notification_id = %notification.id,
            %user_id,
            "notification created from outbox"
        );
        Ok(())
    }
}
