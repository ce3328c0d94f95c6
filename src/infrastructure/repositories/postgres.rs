use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
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

pub type PgPool = Pool<Postgres>;

#[derive(Clone)]
pub struct PostgresOutboxRepository {
    pool: PgPool,
}

impl PostgresOutboxRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl OutboxRepository for PostgresOutboxRepository {
    async fn insert(&self, message: &OutboxMessage) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO outbox_messages (
                id, message_type, payload, occurred_on, processed, processed_on, error, retry_count
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id)
        .bind(&message.message_type)
        .bind(&message.payload)
        .bind(message.occurred_on)
        .bind(message.processed)
        .bind(message.processed_on)
        .bind(&message.error)
        .bind(message.retry_count as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_pending(&self, batch_size: usize) -> anyhow::Result<Vec<OutboxMessage>> {
        let rows = sqlx::query_as::<_, OutboxRecord>(
            r#"
            SELECT id, message_type, payload, occurred_on, processed, processed_on, error, retry_count
            FROM outbox_messages
            WHERE processed = FALSE
            ORDER BY occurred_on ASC
            LIMIT $1
            "#,
        )
        .bind(batch_size as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(OutboxMessage::from).collect())
    }

    async fn save(&self, messages: &[OutboxMessage]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for message in messages {
            sqlx::query(
                r#"
                UPDATE outbox_messages
                SET processed = $2,
                    processed_on = $3,
                    error = $4,
                    retry_count = $5
                WHERE id = $1
                "#,
            )
            .bind(message.id)
            .bind(message.processed)
            .bind(message.processed_on)
            .bind(&message.error)
            .bind(message.retry_count as i32)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, type, title, message, priority, status, metadata,
                read_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.notification_type.as_i32())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.priority.as_i32())
        .bind(notification.status.as_i32())
        .bind(&notification.metadata)
        .bind(notification.read_at)
        .bind(notification.created_at)
        .bind(notification.updated_at)
        .execute(&self.pool)
        .await
        .context("failed to insert notification")?;
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: NotificationFilter,
        page: u32,
        limit: u32,
    ) -> anyhow::Result<(Vec<Notification>, u32)> {
        let notification_type = filter.notification_type.map(|t| t.as_i32());
        let status = filter.status.map(|s| s.as_i32());
        let offset = (page.max(1) - 1) as i64 * limit as i64;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE user_id = $1
              AND ($2::INT IS NULL OR type = $2)
              AND ($3::INT IS NULL OR status = $3)
            "#,
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, NotificationRecord>(
            r#"
            SELECT id, user_id, type, title, message, priority, status, metadata,
                   read_at, created_at, updated_at
            FROM notifications
            WHERE user_id = $1
              AND ($2::INT IS NULL OR type = $2)
              AND ($3::INT IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(status)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Notification::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok((items, total as u32))
    }

    async fn stats(&self, user_id: Uuid) -> anyhow::Result<NotificationStats> {
        let (total, unread): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE status = $2)
            FROM notifications
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(NotificationStatus::Unread.as_i32())
        .fetch_one(&self.pool)
        .await?;

        let by_type: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT type, COUNT(*)
            FROM notifications
            WHERE user_id = $1
            GROUP BY type
            ORDER BY type
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let by_priority: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT priority, COUNT(*)
            FROM notifications
            WHERE user_id = $1
            GROUP BY priority
            ORDER BY priority
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(NotificationStats {
            total: total as u32,
            unread: unread as u32,
            by_type: by_type
                .into_iter()
                .filter_map(|(value, count)| {
                    NotificationType::from_i32(value).map(|t| (t, count as u32))
                })
                .collect(),
            by_priority: by_priority
                .into_iter()
                .filter_map(|(value, count)| {
                    NotificationPriority::from_i32(value).map(|p| (p, count as u32))
                })
                .collect(),
        })
    }

    async fn mark_read(
        &self,
        user_id: Uuid,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> anyhow::Result<u32> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET status = $3, read_at = $4, updated_at = $4
            WHERE user_id = $1
              AND id = ANY($2)
              AND status = $5
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .bind(NotificationStatus::Read.as_i32())
        .bind(now)
        .bind(NotificationStatus::Unread.as_i32())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() as u32)
    }

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> anyhow::Result<u32> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET status = $2, read_at = $3, updated_at = $3
            WHERE user_id = $1
              AND status = $4
            "#,
        )
        .bind(user_id)
        .bind(NotificationStatus::Read.as_i32())
        .bind(now)
        .bind(NotificationStatus::Unread.as_i32())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() as u32)
    }
}

#[derive(Clone)]
pub struct PostgresApiRateLimitRepository {
    pool: PgPool,
}

impl PostgresApiRateLimitRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl ApiRateLimitRepository for PostgresApiRateLimitRepository {
    async fn find(&self, identifier: &str, endpoint: &str) -> anyhow::Result<Option<ApiRateLimit>> {
        let record = sqlx::query_as::<_, ApiRateLimitRecord>(
            r#"
            SELECT id, identifier, endpoint, request_count, window_start, blocked_until,
                   created_at, updated_at
            FROM api_rate_limits
            WHERE identifier = $1 AND endpoint = $2
            "#,
        )
        .bind(identifier)
        .bind(endpoint)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(ApiRateLimit::from))
    }

    async fn upsert(&self, record: &ApiRateLimit) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO api_rate_limits (
                id, identifier, endpoint, request_count, window_start, blocked_until,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (identifier, endpoint) DO UPDATE
            SET request_count = EXCLUDED.request_count,
                window_start = EXCLUDED.window_start,
                blocked_until = EXCLUDED.blocked_until,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.id)
        .bind(&record.identifier)
        .bind(&record.endpoint)
        .bind(record.request_count as i32)
        .bind(record.window_start)
        .bind(record.blocked_until)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_stale(&self, endpoint: &str, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM api_rate_limits
            WHERE endpoint = $1
              AND created_at < $2
              AND blocked_until IS NULL
            "#,
        )
        .bind(endpoint)
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Clone)]
pub struct PostgresSmsRateLimitRepository {
    pool: PgPool,
}

impl PostgresSmsRateLimitRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl SmsRateLimitRepository for PostgresSmsRateLimitRepository {
    async fn find(&self, device_identifier: &str) -> anyhow::Result<Option<SmsRateLimit>> {
        let record = sqlx::query_as::<_, SmsRateLimitRecord>(
            r#"
            SELECT id, device_identifier, phone_number, attempt_count, first_attempt_at,
                   blocked_until, created_at, updated_at
            FROM sms_rate_limits
            WHERE device_identifier = $1
            "#,
        )
        .bind(device_identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(SmsRateLimit::from))
    }

    async fn upsert(&self, record: &SmsRateLimit) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sms_rate_limits (
                id, device_identifier, phone_number, attempt_count, first_attempt_at,
                blocked_until, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (device_identifier) DO UPDATE
            SET phone_number = EXCLUDED.phone_number,
                attempt_count = EXCLUDED.attempt_count,
                first_attempt_at = EXCLUDED.first_attempt_at,
                blocked_until = EXCLUDED.blocked_until,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.id)
        .bind(&record.device_identifier)
        .bind(&record.phone_number)
        .bind(record.attempt_count as i32)
        .bind(record.first_attempt_at)
        .bind(record.blocked_until)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM sms_rate_limits WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Clone)]
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn count(&self) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn insert_many(&self, categories: &[Category]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for category in categories {
            sqlx::query(
                r#"
                INSERT INTO categories (id, name, description, parent_id, is_active, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.parent_id)
            .bind(category.is_active)
            .bind(category.created_at)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert category {}", category.name))?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_active(&self) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT id, name, description, parent_id, is_active, created_at
            FROM categories
            WHERE is_active = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}

#[derive(FromRow)]
struct OutboxRecord {
    id: Uuid,
    message_type: String,
    payload: String,
    occurred_on: DateTime<Utc>,
    processed: bool,
    processed_on: Option<DateTime<Utc>>,
    error: Option<String>,
    retry_count: i32,
}

impl From<OutboxRecord> for OutboxMessage {
    fn from(value: OutboxRecord) -> Self {
        Self {
            id: value.id,
            message_type: value.message_type,
            payload: value.payload,
            occurred_on: value.occurred_on,
            processed: value.processed,
            processed_on: value.processed_on,
            error: value.error,
            retry_count: value.retry_count.max(0) as u32,
        }
    }
}

#[derive(FromRow)]
struct NotificationRecord {
    id: Uuid,
    user_id: Uuid,
    #[sqlx(rename = "type")]
    notification_type: i32,
    title: String,
    message: String,
    priority: i32,
    status: i32,
    metadata: Option<String>,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<NotificationRecord> for Notification {
    type Error = anyhow::Error;

    fn try_from(value: NotificationRecord) -> Result<Self, Self::Error> {
        let notification_type = NotificationType::from_i32(value.notification_type)
            .ok_or_else(|| anyhow::anyhow!("unknown notification type {}", value.notification_type))?;
        let priority = NotificationPriority::from_i32(value.priority)
            .ok_or_else(|| anyhow::anyhow!("unknown notification priority {}", value.priority))?;
        let status = NotificationStatus::from_i32(value.status)
            .ok_or_else(|| anyhow::anyhow!("unknown notification status {}", value.status))?;

        Ok(Self {
            id: value.id,
            user_id: value.user_id,
            notification_type,
            title: value.title,
            message: value.message,
            priority,
            status,
            metadata: value.metadata,
            read_at: value.read_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ApiRateLimitRecord {
    id: Uuid,
    identifier: String,
    endpoint: String,
    request_count: i32,
    window_start: DateTime<Utc>,
    blocked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ApiRateLimitRecord> for ApiRateLimit {
    fn from(value: ApiRateLimitRecord) -> Self {
        Self {
            id: value.id,
            identifier: value.identifier,
            endpoint: value.endpoint,
            request_count: value.request_count.max(0) as u32,
            window_start: value.window_start,
            blocked_until: value.blocked_until,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(FromRow)]
struct SmsRateLimitRecord {
    id: Uuid,
    device_identifier: String,
    phone_number: String,
    attempt_count: i32,
    first_attempt_at: DateTime<Utc>,
    blocked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SmsRateLimitRecord> for SmsRateLimit {
    fn from(value: SmsRateLimitRecord) -> Self {
        Self {
            id: value.id,
            device_identifier: value.device_identifier,
            phone_number: value.phone_number,
            attempt_count: value.attempt_count.max(0) as u32,
            first_attempt_at: value.first_attempt_at,
            blocked_until: value.blocked_until,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CategoryRecord {
    id: Uuid,
    name: String,
    description: String,
    parent_id: Option<Uuid>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<CategoryRecord> for Category {
    fn from(value: CategoryRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            parent_id: value.parent_id,
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}
