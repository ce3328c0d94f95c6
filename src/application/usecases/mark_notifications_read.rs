use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{errors::DomainError, repositories::NotificationRepository};

pub struct MarkNotificationsReadUseCase {
    repo: Arc<dyn NotificationRepository>,
}

impl MarkNotificationsReadUseCase {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    /// Marks the caller's own unread notifications among `ids`. Returns how
    /// many changed.
    pub async fn execute(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u32, DomainError> {
        if ids.is_empty() {
            return Err(DomainError::Validation(
                "at least one notification id is required".into(),
            ));
        }
        Ok(self.repo.mark_read(user_id, ids, Utc::now()).await?)
    }

    pub async fn execute_all(&self, user_id: Uuid) -> Result<u32, DomainError> {
        Ok(self.repo.mark_all_read(user_id, Utc::now()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::models::{Notification, NotificationType},
        infrastructure::repositories::in_memory::InMemoryNotificationRepository,
    };

    async fn insert(repo: &InMemoryNotificationRepository, user_id: Uuid) -> Uuid {
        let notification =
            Notification::unread(user_id, NotificationType::Wallet, "t".into(), "m".into(), None);
        repo.insert(&notification).await.unwrap();
        notification.id
    }

    #[tokio::test]
    async fn only_the_owner_can_mark_read() {
        let repo = Arc::new(InMemoryNotificationRepository::new());
        let owner = Uuid::new_v4();
        let mine = insert(&repo, owner).await;
        let theirs = insert(&repo, Uuid::new_v4()).await;
        let usecase = MarkNotificationsReadUseCase::new(repo);

        assert_eq!(usecase.execute(owner, &[mine, theirs]).await.unwrap(), 1);
        assert_eq!(usecase.execute(owner, &[mine]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_all_counts_unread_only() {
        let repo = Arc::new(InMemoryNotificationRepository::new());
        let owner = Uuid::new_v4();
        let first = insert(&repo, owner).await;
        insert(&repo, owner).await;
        insert(&repo, owner).await;
        let usecase = MarkNotificationsReadUseCase::new(repo);

        usecase.execute(owner, &[first]).await.unwrap();
        assert_eq!(usecase.execute_all(owner).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn empty_id_list_is_rejected() {
        let usecase =
            MarkNotificationsReadUseCase::new(Arc::new(InMemoryNotificationRepository::new()));
        let err = usecase.execute(Uuid::new_v4(), &[]).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
