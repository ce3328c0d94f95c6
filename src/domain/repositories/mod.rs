use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::{
    ApiRateLimit, Category, Notification, NotificationFilter, NotificationPriority,
    NotificationType, OutboxMessage, SmsRateLimit,
};

#[async_trait]
pub trait OutboxRepository: Send + Sync {
    async fn insert(&self, message: &OutboxMessage) -> anyhow::Result<()>;

    /// Unprocessed messages, oldest first, at most `batch_size`.
    async fn fetch_pending(&self, batch_size: usize) -> anyhow::Result<Vec<OutboxMessage>>;

    /// Persists the dispatcher-owned columns of every message.
    async fn save(&self, messages: &[OutboxMessage]) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct NotificationStats {
    pub total: u32,
    pub unread: u32,
    pub by_type: Vec<(NotificationType, u32)>,
    pub by_priority: Vec<(NotificationPriority, u32)>,
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()>;

    /// Newest first. `page` starts at 1. Returns the page and the filtered total.
    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: NotificationFilter,
        page: u32,
        limit: u32,
    ) -> anyhow::Result<(Vec<Notification>, u32)>;

    async fn stats(&self, user_id: Uuid) -> anyhow::Result<NotificationStats>;

    async fn mark_read(
        &self,
        user_id: Uuid,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> anyhow::Result<u32>;

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> anyhow::Result<u32>;
}

#[async_trait]
pub trait ApiRateLimitRepository: Send + Sync {
    async fn find(&self, identifier: &str, endpoint: &str) -> anyhow::Result<Option<ApiRateLimit>>;
    async fn upsert(&self, record: &ApiRateLimit) -> anyhow::Result<()>;

    /// Drops never-blocked rows for `endpoint` created before `cutoff`.
    async fn delete_stale(&self, endpoint: &str, cutoff: DateTime<Utc>) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait SmsRateLimitRepository: Send + Sync {
    async fn find(&self, device_identifier: &str) -> anyhow::Result<Option<SmsRateLimit>>;
    async fn upsert(&self, record: &SmsRateLimit) -> anyhow::Result<()>;
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn count(&self) -> anyhow::Result<u64>;
    async fn insert_many(&self, categories: &[Category]) -> anyhow::Result<()>;
    async fn list_active(&self) -> anyhow::Result<Vec<Category>>;
}
