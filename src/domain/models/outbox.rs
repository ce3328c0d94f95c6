use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SKIPPED_UNSUPPORTED: &str = "Skipped: unsupported type";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub message_type: String,
    pub payload: String,
    pub occurred_on: DateTime<Utc>,
    pub processed: bool,
    pub processed_on: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub retry_count: u32,
}

impl OutboxMessage {
    pub fn new(message_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_type: message_type.into(),
            payload: payload.into(),
            occurred_on: Utc::now(),
            processed: false,
            processed_on: None,
            error: None,
            retry_count: 0,
        }
    }

    pub fn kind(&self) -> OutboxMessageKind {
        OutboxMessageKind::from_tag(&self.message_type)
    }

    /// A message that already failed at least once and is older than `max_age`.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty()) && self.occurred_on < now - max_age
    }

    /// Only SMS messages carry a retry budget.
    pub fn retries_exhausted(&self, max_retries: u32) -> bool {
        matches!(self.kind(), OutboxMessageKind::Sms) && self.retry_count >= max_retries
    }

    pub fn mark_processed(&mut self, now: DateTime<Utc>) {
        self.processed = true;
        self.processed_on = Some(now);
        self.error = None;
    }

    pub fn mark_skipped(&mut self, now: DateTime<Utc>) {
        self.processed = true;
        self.processed_on = Some(now);
        self.error = Some(SKIPPED_UNSUPPORTED.to_string());
    }

    /// Terminal without dispatch; the last error is kept as-is.
    pub fn abandon(&mut self, now: DateTime<Utc>) {
        self.processed = true;
        self.processed_on = Some(now);
    }

    pub fn abandon_after_retries(&mut self, now: DateTime<Utc>) {
        let previous = self.error.clone().unwrap_or_default();
        self.processed = true;
        self.processed_on = Some(now);
        self.error = Some(format!(
            "Failed after {} retries: {}",
            self.retry_count, previous
        ));
    }

    pub fn record_failure(&mut self, reason: impl Into<String>) {
        self.retry_count += 1;
        self.error = Some(reason.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxMessageKind {
    Sms,
    Notification(NotificationTemplate),
    Unsupported,
}

impl OutboxMessageKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "sms" => OutboxMessageKind::Sms,
            "withdrawalinitiated" => {
                OutboxMessageKind::Notification(NotificationTemplate::WithdrawalInitiated)
            }
            "withdrawalpendingapproval" => {
                OutboxMessageKind::Notification(NotificationTemplate::WithdrawalPendingApproval)
            }
            "withdrawalsettled" => {
                OutboxMessageKind::Notification(NotificationTemplate::WithdrawalSettled)
            }
            "withdrawalreversed" | "withdrawalfailed" => {
                OutboxMessageKind::Notification(NotificationTemplate::WithdrawalFailed)
            }
            "topupconfirmed" => OutboxMessageKind::Notification(NotificationTemplate::TopupConfirmed),
            _ => OutboxMessageKind::Unsupported,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationTemplate {
    WithdrawalInitiated,
    WithdrawalPendingApproval,
    WithdrawalSettled,
    WithdrawalFailed,
    TopupConfirmed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmsPayload {
    #[serde(default, alias = "To")]
    pub to: Option<String>,
    #[serde(default, alias = "Template")]
    pub template: Option<String>,
    #[serde(default, alias = "Code")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(default, alias = "UserId", alias = "user_id")]
    pub user_id: Option<Uuid>,
    #[serde(default, alias = "WithdrawalId", alias = "withdrawal_id")]
    pub withdrawal_id: Option<Uuid>,
    #[serde(default, alias = "RequesterName", alias = "requester_name")]
    pub requester_name: Option<String>,
    #[serde(default, alias = "Amount")]
    pub amount: f64,
    #[serde(default, alias = "Currency")]
    pub currency: Option<String>,
    #[serde(default, alias = "Channel")]
    pub channel: Option<String>,
    #[serde(default, alias = "RequestedAt", alias = "requested_at")]
    pub requested_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "Notes")]
    pub notes: Option<String>,
}
