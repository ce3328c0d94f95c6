use async_trait::async_trait;

#[async_trait]
pub trait SmsSender: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send_otp(&self, phone: &str, otp: &str, template: Option<&str>) -> anyhow::Result<()>;
}

pub(crate) fn ensure_otp_request(phone: &str, otp: &str) -> anyhow::Result<()> {
    if phone.trim().is_empty() {
        anyhow::bail!("phone number is required");
    }
    if otp.trim().is_empty() {
        anyhow::bail!("OTP is required");
    }
    Ok(())
}
