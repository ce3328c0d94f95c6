use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    models::{
        ApiRateLimit, Category, Notification, NotificationFilter, NotificationPriority,
        NotificationStatus, NotificationType, OutboxMessage, SmsRateLimit,
    },
    repositories::{
        ApiRateLimitRepository, CategoryRepository, NotificationRepository, NotificationStats,
        OutboxRepository, SmsRateLimitRepository,
    },
};

#[derive(Default)]
pub struct InMemoryOutboxRepository {
    messages: Arc<RwLock<HashMap<Uuid, OutboxMessage>>>,
}

impl InMemoryOutboxRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn get(&self, id: Uuid) -> anyhow::Result<Option<OutboxMessage>> {
        Ok(self.messages.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl OutboxRepository for InMemoryOutboxRepository {
    async fn insert(&self, message: &OutboxMessage) -> anyhow::Result<()> {
        let mut messages = self.messages.write().await;
        messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn fetch_pending(&self, batch_size: usize) -> anyhow::Result<Vec<OutboxMessage>> {
        let messages = self.messages.read().await;
        let mut pending: Vec<OutboxMessage> =
            messages.values().filter(|m| !m.processed).cloned().collect();
        pending.sort_by_key(|m| m.occurred_on);
        pending.truncate(batch_size);
        Ok(pending)
    }

    async fn save(&self, batch: &[OutboxMessage]) -> anyhow::Result<()> {
        let mut messages = self.messages.write().await;
        for message in batch {
            if let Some(existing) = messages.get_mut(&message.id) {
                existing.processed = message.processed;
                existing.processed_on = message.processed_on;
                existing.error = message.error.clone();
                existing.retry_count = message.retry_count;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: Arc<RwLock<HashMap<Uuid, Notification>>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        let mut notifications = self.notifications.write().await;
        notifications.insert(notification.id, notification.clone());
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: NotificationFilter,
        page: u32,
        limit: u32,
    ) -> anyhow::Result<(Vec<Notification>, u32)> {
        let notifications = self.notifications.read().await;
        let mut matching: Vec<&Notification> = notifications
            .values()
            .filter(|n| n.user_id == user_id && filter.matches(n))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u32;
        let skip = (page.max(1) - 1) as usize * limit as usize;
        let items = matching
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn stats(&self, user_id: Uuid) -> anyhow::Result<NotificationStats> {
        let notifications = self.notifications.read().await;
        let owned: Vec<&Notification> = notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .collect();

        let by_type = NotificationType::ALL
            .into_iter()
            .map(|t| (t, owned.iter().filter(|n| n.notification_type == t).count() as u32))
            .filter(|(_, count)| *count > 0)
            .collect();
        let by_priority = [
            NotificationPriority::Low,
            NotificationPriority::Medium,
            NotificationPriority::High,
            NotificationPriority::Critical,
        ]
        .into_iter()
        .map(|p| (p, owned.iter().filter(|n| n.priority == p).count() as u32))
        .filter(|(_, count)| *count > 0)
        .collect();

        Ok(NotificationStats {
            total: owned.len() as u32,
            unread: owned
                .iter()
                .filter(|n| n.status == NotificationStatus::Unread)
                .count() as u32,
            by_type,
            by_priority,
        })
    }

    async fn mark_read(
        &self,
        user_id: Uuid,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> anyhow::Result<u32> {
        let mut notifications = self.notifications.write().await;
        let mut updated = 0;
        for id in ids {
            if let Some(notification) = notifications.get_mut(id) {
                if notification.user_id == user_id && notification.mark_read(now) {
                    updated += 1;
                }
            }
        }
        Ok(updated)
    }

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> anyhow::Result<u32> {
        let mut notifications = self.notifications.write().await;
        let mut updated = 0;
        for notification in notifications.values_mut() {
            if notification.user_id == user_id && notification.mark_read(now) {
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[derive(Default)]
pub struct InMemoryApiRateLimitRepository {
    records: Arc<RwLock<HashMap<(String, String), ApiRateLimit>>>,
}

impl InMemoryApiRateLimitRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiRateLimitRepository for InMemoryApiRateLimitRepository {
    async fn find(&self, identifier: &str, endpoint: &str) -> anyhow::Result<Option<ApiRateLimit>> {
        let records = self.records.read().await;
        Ok(records
            .get(&(identifier.to_string(), endpoint.to_string()))
            .cloned())
    }

    async fn upsert(&self, record: &ApiRateLimit) -> anyhow::Result<()> {
        let mut records = self.records.write().await;
        records.insert(
            (record.identifier.clone(), record.endpoint.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn delete_stale(&self, endpoint: &str, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| {
            !(r.endpoint == endpoint && r.created_at < cutoff && r.blocked_until.is_none())
        });
        Ok((before - records.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemorySmsRateLimitRepository {
    records: Arc<RwLock<HashMap<String, SmsRateLimit>>>,
}

impl InMemorySmsRateLimitRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SmsRateLimitRepository for InMemorySmsRateLimitRepository {
    async fn find(&self, device_identifier: &str) -> anyhow::Result<Option<SmsRateLimit>> {
        let records = self.records.read().await;
        Ok(records.get(device_identifier).cloned())
    }

    async fn upsert(&self, record: &SmsRateLimit) -> anyhow::Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.device_identifier.clone(), record.clone());
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.created_at >= cutoff);
        Ok((before - records.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<Vec<Category>>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.categories.read().await.len() as u64)
    }

    async fn insert_many(&self, categories: &[Category]) -> anyhow::Result<()> {
        let mut stored = self.categories.write().await;
        stored.extend_from_slice(categories);
        Ok(())
    }

    async fn list_active(&self) -> anyhow::Result<Vec<Category>> {
        let categories = self.categories.read().await;
        let mut active: Vec<Category> = categories.iter().filter(|c| c.is_active).cloned().collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }
}
