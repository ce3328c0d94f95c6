pub mod captcha;
pub mod repositories;
pub mod sms;
