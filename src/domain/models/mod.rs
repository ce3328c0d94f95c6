pub mod category;
pub mod device;
pub mod notification;
pub mod outbox;
pub mod rate_limit;

pub use category::Category;
pub use device::{Browser, DeviceInfo, DeviceType, OperatingSystem};
pub use notification::{
    Notification, NotificationFilter, NotificationPriority, NotificationStatus, NotificationType,
};
pub use outbox::{
    NotificationPayload, NotificationTemplate, OutboxMessage, OutboxMessageKind, SmsPayload,
};
pub use rate_limit::{ApiRateLimit, SmsRateLimit};
