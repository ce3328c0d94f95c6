use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    models::{Notification, NotificationFilter},
    repositories::{NotificationRepository, NotificationStats},
};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

pub struct ListNotificationsUseCase {
    repo: Arc<dyn NotificationRepository>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    fn new(page: u32, limit: u32, total: u32) -> Self {
        let total_pages = total.div_ceil(limit);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

pub struct ListNotificationsResponse {
    pub notifications: Vec<Notification>,
    pub stats: NotificationStats,
    pub pagination: Pagination,
}

impl ListNotificationsUseCase {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        user_id: Uuid,
        filter: NotificationFilter,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> anyhow::Result<ListNotificationsResponse> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let (notifications, total) = self.repo.list_by_user(user_id, filter, page, limit).await?;
        let stats = self.repo.stats(user_id).await?;

        Ok(ListNotificationsResponse {
            notifications,
            stats,
            pagination: Pagination::new(page, limit, total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::models::{NotificationStatus, NotificationType},
        infrastructure::repositories::in_memory::InMemoryNotificationRepository,
    };

    async fn seeded(user_id: Uuid) -> Arc<InMemoryNotificationRepository> {
        let repo = Arc::new(InMemoryNotificationRepository::new());
        for i in 0..5 {
            let kind = if i % 2 == 0 {
                NotificationType::Wallet
            } else {
                NotificationType::System
            };
            let mut notification =
                Notification::unread(user_id, kind, format!("t{i}"), "m".into(), None);
            notification.created_at += chrono::Duration::seconds(i);
            repo.insert(&notification).await.unwrap();
        }
        repo.insert(&Notification::unread(
            Uuid::new_v4(),
            NotificationType::Wallet,
            "other".into(),
            "m".into(),
            None,
        ))
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn pages_newest_first_with_stats() {
        let user_id = Uuid::new_v4();
        let usecase = ListNotificationsUseCase::new(seeded(user_id).await);

        let response = usecase
            .execute(user_id, NotificationFilter::default(), Some(1), Some(2))
            .await
            .unwrap();

        let titles: Vec<&str> = response.notifications.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["t4", "t3"]);
        assert_eq!(
            response.pagination,
            Pagination {
                page: 1,
                limit: 2,
                total: 5,
                total_pages: 3,
                has_next: true,
                has_prev: false,
            }
        );
        assert_eq!(response.stats.total, 5);
        assert_eq!(response.stats.unread, 5);
        assert_eq!(
            response.stats.by_type,
            vec![(NotificationType::System, 2), (NotificationType::Wallet, 3)]
        );
    }

    #[tokio::test]
    async fn filters_by_type_and_status() {
        let user_id = Uuid::new_v4();
        let usecase = ListNotificationsUseCase::new(seeded(user_id).await);

        let filter = NotificationFilter {
            notification_type: Some(NotificationType::Wallet),
            status: Some(NotificationStatus::Unread),
        };
        let response = usecase.execute(user_id, filter, None, None).await.unwrap();

        assert_eq!(response.notifications.len(), 3);
        assert_eq!(response.pagination.limit, DEFAULT_LIMIT);
        assert!(!response.pagination.has_next);
    }
}
