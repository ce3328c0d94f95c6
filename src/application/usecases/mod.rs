pub mod list_categories;
pub mod list_notifications;
pub mod mark_notifications_read;
pub mod request_sms_otp;
