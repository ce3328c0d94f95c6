pub mod api_rate_limit;
pub mod captcha;
pub mod category_seed;
pub mod device;
pub mod jwt;
pub mod notification_templates;
pub mod outbox;
pub mod sms;
pub mod sms_rate_limit;
