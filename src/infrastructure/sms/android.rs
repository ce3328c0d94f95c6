use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;

use crate::{
    application::services::sms::{SmsSender, ensure_otp_request},
    domain::value_objects::PhoneNumber,
};

#[derive(Debug, Clone)]
pub struct AndroidSmsConfig {
    pub base_url: String,
    pub secret_key: Option<String>,
    pub use_hmac: bool,
    pub otp_param: String,
    pub receiver_param: String,
    pub timeout: Duration,
}

impl Default for AndroidSmsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            secret_key: None,
            use_hmac: false,
            otp_param: "otp".to_string(),
            receiver_param: "to".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Sends OTPs through the webhook exposed by the companion Android app.
pub struct AndroidSmsSender {
    http: Client,
    config: AndroidSmsConfig,
}

impl AndroidSmsSender {
    pub fn new(config: AndroidSmsConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent("outbox/android-sms")
            .timeout(config.timeout)
            .build()
            .context("failed to build android sms client")?;
        Ok(Self { http, config })
    }

    fn signature(&self, secret: &str, otp: &str, to: &str) -> anyhow::Result<String> {
        sign(secret, &format!("otp={otp}&to={to}"))
    }
}

fn sign(secret: &str, canonical: &str) -> anyhow::Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| anyhow::anyhow!("invalid webhook secret"))?;
    mac.update(canonical.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl SmsSender for AndroidSmsSender {
    fn name(&self) -> &'static str {
        "android"
    }

    async fn send_otp(&self, phone: &str, otp: &str, _template: Option<&str>) -> anyhow::Result<()> {
        ensure_otp_request(phone, otp)?;
        let to = PhoneNumber::normalize(phone)
            .ok_or_else(|| anyhow::anyhow!("Invalid recipient phone provided: '{phone}'"))?;

        let base_url = self.config.base_url.trim_end_matches('/');
        let mut request = self
            .http
            .get(format!("{base_url}/send-otp"))
            .query(&[
                (self.config.otp_param.as_str(), otp),
                (self.config.receiver_param.as_str(), to.as_str()),
            ]);

        if let Some(secret) = self.config.secret_key.as_deref().filter(|s| !s.trim().is_empty()) {
            request = request.header("X-Webhook-Secret", secret);
            if self.config.use_hmac {
                request = request.header("X-Signature", self.signature(secret, otp, to.as_str())?);
            }
        }

        tracing::debug!(%to, base_url, "sending sms via android gateway");
        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                anyhow::anyhow!(
                    "Android SMS service request timed out after {} seconds",
                    self.config.timeout.as_secs()
                )
            } else {
                anyhow::Error::new(err)
                    .context(format!("failed to connect to Android SMS service at {base_url}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "android sms service rejected request");
            anyhow::bail!("Android SMS service failed: {status}. Body={body}");
        }

        tracing::info!(%to, "sms sent via android gateway");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sms::stub::spawn_stub;

    fn sender(base_url: String, secret: Option<&str>, use_hmac: bool) -> AndroidSmsSender {
        AndroidSmsSender::new(AndroidSmsConfig {
            base_url,
            secret_key: secret.map(str::to_string),
            use_hmac,
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn signature_is_lowercase_hex_hmac() {
        assert_eq!(
            sign("webhook-secret", "otp=123456&to=923001234567").unwrap(),
            "cd9310bd81cd8a9fbae4157df2078a13c477879e3e4ae07c03a9a69fe59ba5f3"
        );
    }

    #[tokio::test]
    async fn sends_normalized_number_with_signature() {
        let (base_url, request) = spawn_stub(200, "queued").await;
        let sender = sender(base_url, Some("webhook-secret"), true);

        sender.send_otp("0300-1234567", "123456", None).await.unwrap();

        let raw = request.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /send-otp?otp=123456&to=923001234567 "));
        assert!(raw.contains("x-webhook-secret: webhook-secret"));
        assert!(raw.contains(
            "x-signature: cd9310bd81cd8a9fbae4157df2078a13c477879e3e4ae07c03a9a69fe59ba5f3"
        ));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base_url, _request) = spawn_stub(503, "device offline").await;
        let sender = sender(base_url, None, false);

        let err = sender
            .send_otp("923001234567", "123456", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("device offline"));
    }

    #[tokio::test]
    async fn invalid_phone_never_reaches_the_gateway() {
        let sender = sender("http://127.0.0.1:9".to_string(), None, false);
        let err = sender.send_otp("12345", "123456", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid recipient phone provided: '12345'");
    }
}
