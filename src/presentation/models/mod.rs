use poem_openapi::Enum;

use crate::domain::models::{NotificationPriority, NotificationStatus, NotificationType};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[oai(rename_all = "lowercase")]
pub enum NotificationKind {
    Order,
    Payment,
    Kyc,
    System,
    Security,
    Promotion,
    Wallet,
    Seller,
}

impl From<NotificationKind> for NotificationType {
    fn from(value: NotificationKind) -> Self {
        match value {
            NotificationKind::Order => NotificationType::Order,
            NotificationKind::Payment => NotificationType::Payment,
            NotificationKind::Kyc => NotificationType::Kyc,
            NotificationKind::System => NotificationType::System,
            NotificationKind::Security => NotificationType::Security,
            NotificationKind::Promotion => NotificationType::Promotion,
            NotificationKind::Wallet => NotificationType::Wallet,
            NotificationKind::Seller => NotificationType::Seller,
        }
    }
}

impl From<NotificationType> for NotificationKind {
    fn from(value: NotificationType) -> Self {
        match value {
            NotificationType::Order => NotificationKind::Order,
            NotificationType::Payment => NotificationKind::Payment,
            NotificationType::Kyc => NotificationKind::Kyc,
            NotificationType::System => NotificationKind::System,
            NotificationType::Security => NotificationKind::Security,
            NotificationType::Promotion => NotificationKind::Promotion,
            NotificationType::Wallet => NotificationKind::Wallet,
            NotificationType::Seller => NotificationKind::Seller,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[oai(rename_all = "lowercase")]
pub enum PriorityKind {
    Low,
    Medium,
    High,
    Critical,
}

impl From<NotificationPriority> for PriorityKind {
    fn from(value: NotificationPriority) -> Self {
        match value {
            NotificationPriority::Low => PriorityKind::Low,
            NotificationPriority::Medium => PriorityKind::Medium,
            NotificationPriority::High => PriorityKind::High,
            NotificationPriority::Critical => PriorityKind::Critical,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[oai(rename_all = "lowercase")]
pub enum NotificationStatusKind {
    Unread,
    Read,
    Archived,
}

impl From<NotificationStatusKind> for NotificationStatus {
    fn from(value: NotificationStatusKind) -> Self {
        match value {
            NotificationStatusKind::Unread => NotificationStatus::Unread,
            NotificationStatusKind::Read => NotificationStatus::Read,
            NotificationStatusKind::Archived => NotificationStatus::Archived,
        }
    }
}

impl From<NotificationStatus> for NotificationStatusKind {
    fn from(value: NotificationStatus) -> Self {
        match value {
            NotificationStatus::Unread => NotificationStatusKind::Unread,
            NotificationStatus::Read => NotificationStatusKind::Read,
            NotificationStatus::Archived => NotificationStatusKind::Archived,
        }
    }
}
