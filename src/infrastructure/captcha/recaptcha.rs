use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::services::captcha::CaptchaVerifier;

pub const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Clone)]
pub struct RecaptchaConfig {
    /// Without a secret every token is accepted.
    pub secret_key: Option<String>,
    pub min_score: f64,
    pub verify_url: String,
}

impl Default for RecaptchaConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            min_score: 0.5,
            verify_url: SITEVERIFY_URL.to_string(),
        }
    }
}

pub struct RecaptchaVerifier {
    http: Client,
    config: RecaptchaConfig,
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    score: Option<f64>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

impl RecaptchaVerifier {
    pub fn new(config: RecaptchaConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent("outbox/recaptcha")
            .build()
            .context("failed to build recaptcha client")?;
        Ok(Self { http, config })
    }

    fn secret(&self) -> Option<&str> {
        self.config
            .secret_key
            .as_deref()
            .filter(|secret| !secret.is_empty())
    }

    async fn site_verify(
        &self,
        secret: &str,
        token: &str,
        remote_ip: Option<&str>,
    ) -> anyhow::Result<SiteVerifyResponse> {
        let mut form = vec![("secret", secret), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        self.http
            .post(&self.config.verify_url)
            .form(&form)
            .send()
            .await
            .context("captcha verification request failed")?
            .json::<SiteVerifyResponse>()
            .await
            .context("failed to parse captcha verification response")
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn validate(&self, token: &str, remote_ip: Option<&str>) -> bool {
        let Some(secret) = self.secret() else {
            tracing::warn!("captcha secret key not configured, skipping validation");
            return true;
        };
        if token.is_empty() {
            return false;
        }

        match self.site_verify(secret, token, remote_ip).await {
            Ok(response) => {
                if let Some(score) = response.score.filter(|s| *s < self.config.min_score) {
                    tracing::warn!(score, min_score = self.config.min_score, "captcha score too low");
                    return false;
                }
                if !response.success {
                    tracing::debug!(error_codes = ?response.error_codes, "captcha rejected");
                }
                response.success
            }
            Err(err) => {
                tracing::error!(error = ?err, "captcha validation failed");
                false
            }
        }
    }
}
