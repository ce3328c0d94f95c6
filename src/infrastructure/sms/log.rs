use async_trait::async_trait;

use crate::application::services::sms::{SmsSender, ensure_otp_request};

/// Development sender: the OTP only appears in the log.
#[derive(Default)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send_otp(&self, phone: &str, otp: &str, template: Option<&str>) -> anyhow::Result<()> {
        ensure_otp_request(phone, otp)?;
        tracing::info!(phone, otp, template, "sms delivery simulated");
        Ok(())
    }
}
