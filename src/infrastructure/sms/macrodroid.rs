use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;

use crate::{
    application::services::sms::{SmsSender, ensure_otp_request},
    domain::value_objects::PhoneNumber,
};

#[derive(Debug, Clone)]
pub struct MacroDroidConfig {
    pub enabled: bool,
    pub base_url: String,
    pub key: String,
    pub action: String,
    pub otp_param: String,
    pub receiver_param: String,
}

impl Default for MacroDroidConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://trigger.macrodroid.com".to_string(),
            key: String::new(),
            action: "send-otp".to_string(),
            otp_param: "otp".to_string(),
            receiver_param: "to".to_string(),
        }
    }
}

/// Fires a MacroDroid webhook trigger on a phone that relays the SMS.
pub struct MacroDroidSmsSender {
    http: Client,
    config: MacroDroidConfig,
}

impl MacroDroidSmsSender {
    pub fn new(config: MacroDroidConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent("outbox/macrodroid")
            .build()
            .context("failed to build macrodroid client")?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl SmsSender for MacroDroidSmsSender {
    fn name(&self) -> &'static str {
        "macrodroid"
    }

    async fn send_otp(&self, phone: &str, otp: &str, template: Option<&str>) -> anyhow::Result<()> {
        if !self.config.enabled {
            tracing::info!(phone, otp, "sms sending disabled, otp not delivered");
            return Ok(());
        }

        ensure_otp_request(phone, otp)?;
        let to = PhoneNumber::normalize_short(phone)
            .ok_or_else(|| anyhow::anyhow!("Invalid recipient phone provided: '{phone}'"))?;

        let url = format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.key,
            self.config.action
        );
        let response = self
            .http
            .get(url)
            .query(&[
                (self.config.otp_param.as_str(), otp),
                (self.config.receiver_param.as_str(), to.as_str()),
            ])
            .send()
            .await
            .context("MacroDroid trigger request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("MacroDroid trigger failed: {status}. Body={body}");
        }

        tracing::info!(%to, template, "sms sent via macrodroid");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sms::stub::spawn_stub;

    #[tokio::test]
    async fn triggers_the_configured_action() {
        let (base_url, request) = spawn_stub(200, "ok").await;
        let sender = MacroDroidSmsSender::new(MacroDroidConfig {
            base_url,
            key: "device-key".to_string(),
            ..Default::default()
        })
        .unwrap();

        sender.send_otp("+92 300 1234567", "654321", None).await.unwrap();

        let raw = request.await.unwrap();
        assert!(raw.starts_with("GET /device-key/send-otp?otp=654321&to=923001234567 "));
    }

    #[tokio::test]
    async fn disabled_trigger_is_a_no_op() {
        let sender = MacroDroidSmsSender::new(MacroDroidConfig {
            enabled: false,
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();

        sender.send_otp("", "", None).await.unwrap();
    }
}
