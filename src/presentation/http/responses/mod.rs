use poem_openapi::{ApiResponse, Object, payload::Json};
use uuid::Uuid;

use crate::presentation::models::{NotificationKind, NotificationStatusKind, PriorityKind};

#[derive(Object)]
pub struct SmsOtpResponseDto {
    pub message_id: Uuid,
    pub remaining_attempts: u32,
    pub expires_in_seconds: u64,
}

#[derive(ApiResponse)]
pub enum SmsOtpResponse {
    /// The OTP is queued for delivery.
    #[oai(status = 200)]
    Queued(
        Json<SmsOtpResponseDto>,
        #[oai(header = "X-RateLimit-Remaining")]
        u32,
    ),
}

#[derive(Object)]
pub struct NotificationDto {
    pub id: Uuid,
    #[oai(rename = "type")]
    pub notification_type: NotificationKind,
    pub title: String,
    pub message: String,
    pub priority: PriorityKind,
    pub status: NotificationStatusKind,
    pub metadata: Option<String>,
    pub read_at: Option<String>,
    pub created_at: String,
}

#[derive(Object)]
pub struct TypeCountDto {
    #[oai(rename = "type")]
    pub notification_type: NotificationKind,
    pub count: u32,
}

#[derive(Object)]
pub struct PriorityCountDto {
    pub priority: PriorityKind,
    pub count: u32,
}

#[derive(Object)]
pub struct NotificationStatsDto {
    pub total: u32,
    pub unread: u32,
    pub by_type: Vec<TypeCountDto>,
    pub by_priority: Vec<PriorityCountDto>,
}

#[derive(Object)]
pub struct PaginationDto {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Object)]
pub struct NotificationListDto {
    pub notifications: Vec<NotificationDto>,
    pub stats: NotificationStatsDto,
    pub pagination: PaginationDto,
}

#[derive(Object)]
pub struct MarkReadResponseDto {
    pub updated: u32,
}

#[derive(Object)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub parent_id: Option<Uuid>,
}
