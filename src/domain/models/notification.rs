use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Order,
    Payment,
    Kyc,
    System,
    Security,
    Promotion,
    Wallet,
    Seller,
}

impl NotificationType {
    pub const ALL: [NotificationType; 8] = [
        NotificationType::Order,
        NotificationType::Payment,
        NotificationType::Kyc,
        NotificationType::System,
        NotificationType::Security,
        NotificationType::Promotion,
        NotificationType::Wallet,
        NotificationType::Seller,
    ];

    pub fn as_i32(&self) -> i32 {
        match self {
            NotificationType::Order => 1,
            NotificationType::Payment => 2,
            NotificationType::Kyc => 3,
            NotificationType::System => 4,
            NotificationType::Security => 5,
            NotificationType::Promotion => 6,
            NotificationType::Wallet => 7,
            NotificationType::Seller => 8,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_i32() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Order => "order",
            NotificationType::Payment => "payment",
            NotificationType::Kyc => "kyc",
            NotificationType::System => "system",
            NotificationType::Security => "security",
            NotificationType::Promotion => "promotion",
            NotificationType::Wallet => "wallet",
            NotificationType::Seller => "seller",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl NotificationPriority {
    pub fn as_i32(&self) -> i32 {
        match self {
            NotificationPriority::Low => 1,
            NotificationPriority::Medium => 2,
            NotificationPriority::High => 3,
            NotificationPriority::Critical => 4,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(NotificationPriority::Low),
            2 => Some(NotificationPriority::Medium),
            3 => Some(NotificationPriority::High),
            4 => Some(NotificationPriority::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Medium => "medium",
            NotificationPriority::High => "high",
            NotificationPriority::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Unread,
    Read,
    Archived,
}

impl NotificationStatus {
    pub fn as_i32(&self) -> i32 {
        match self {
            NotificationStatus::Unread => 1,
            NotificationStatus::Read => 2,
            NotificationStatus::Archived => 3,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(NotificationStatus::Unread),
            2 => Some(NotificationStatus::Read),
            3 => Some(NotificationStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub status: NotificationStatus,
    pub metadata: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    pub fn unread(
        user_id: Uuid,
        notification_type: NotificationType,
        title: String,
        message: String,
        metadata: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            notification_type,
            title,
            message,
            priority: NotificationPriority::Medium,
            status: NotificationStatus::Unread,
            metadata,
            read_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns false when the notification was not unread.
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != NotificationStatus::Unread {
            return false;
        }
        self.status = NotificationStatus::Read;
        self.read_at = Some(now);
        self.updated_at = now;
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationFilter {
    pub notification_type: Option<NotificationType>,
    pub status: Option<NotificationStatus>,
}

impl NotificationFilter {
    pub fn matches(&self, notification: &Notification) -> bool {
        self.notification_type
            .is_none_or(|t| t == notification.notification_type)
            && self.status.is_none_or(|s| s == notification.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_mapping_matches_stored_values() {
        assert_eq!(NotificationType::Wallet.as_i32(), 7);
        assert_eq!(NotificationType::System.as_i32(), 4);
        assert_eq!(NotificationType::from_i32(8), Some(NotificationType::Seller));
        assert_eq!(NotificationType::from_i32(0), None);
        assert_eq!(NotificationPriority::from_i32(2), Some(NotificationPriority::Medium));
        assert_eq!(NotificationStatus::Unread.as_i32(), 1);
    }

    #[test]
    fn mark_read_only_transitions_unread() {
        let mut notification = Notification::unread(
            Uuid::new_v4(),
            NotificationType::Wallet,
            "t".into(),
            "m".into(),
            None,
        );
        let now = Utc::now();
        assert!(notification.mark_read(now));
        assert_eq!(notification.read_at, Some(now));
        assert!(!notification.mark_read(Utc::now()));
        assert_eq!(notification.read_at, Some(now));
    }
}
