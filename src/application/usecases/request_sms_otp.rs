use std::{sync::Arc, time::Duration};

use rand::Rng;
use uuid::Uuid;

use crate::{
    application::services::{
        captcha::CaptchaVerifier,
        device::{fingerprint, parse_user_agent},
        outbox::OutboxService,
        sms_rate_limit::SmsRateLimitService,
    },
    domain::{errors::DomainError, value_objects::PhoneNumber},
};

pub struct RequestSmsOtpConfig {
    pub otp_ttl: Duration,
}

impl Default for RequestSmsOtpConfig {
    fn default() -> Self {
        Self {
            otp_ttl: Duration::from_secs(10 * 60),
        }
    }
}

pub struct RequestSmsOtpRequest {
    pub phone: String,
    pub user_agent: String,
    pub captcha_token: String,
    pub remote_ip: Option<String>,
    pub template: Option<String>,
}

#[derive(Debug)]
pub struct RequestSmsOtpResponse {
    pub message_id: Uuid,
    pub remaining_attempts: u32,
    pub expires_in: Duration,
}

/// Accepts an OTP request and records it in the outbox. Delivery happens in
/// the dispatcher, so gateway outages never fail the request itself.
pub struct RequestSmsOtpUseCase {
    captcha: Arc<dyn CaptchaVerifier>,
    rate_limit: SmsRateLimitService,
    outbox: OutboxService,
    config: RequestSmsOtpConfig,
}

impl RequestSmsOtpUseCase {
    pub fn new(
        captcha: Arc<dyn CaptchaVerifier>,
        rate_limit: SmsRateLimitService,
        outbox: OutboxService,
        config: RequestSmsOtpConfig,
    ) -> Self {
        Self {
            captcha,
            rate_limit,
            outbox,
            config,
        }
    }

    pub async fn execute(
        &self,
        request: RequestSmsOtpRequest,
    ) -> Result<RequestSmsOtpResponse, DomainError> {
        let remote_ip = request.remote_ip.as_deref();
        if !self
            .captcha
            .validate(&request.captcha_token, remote_ip)
            .await
        {
            return Err(DomainError::Forbidden("captcha validation failed".into()));
        }

        let device = fingerprint(&request.user_agent, remote_ip);

        if !self.rate_limit.is_allowed(&device, &request.phone).await? {
            let retry_after = self.rate_limit.block_remaining(&device).await?;
            tracing::info!(device, "sms otp request rate limited");
            return Err(DomainError::RateLimited { retry_after });
        }

        let phone = PhoneNumber::normalize(&request.phone).ok_or_else(|| {
            DomainError::Validation(format!("invalid phone number '{}'", request.phone))
        })?;

        // Counted before enqueueing so a failed count never leaves a sendable OTP.
        self.rate_limit
            .record_attempt(&device, phone.as_str())
            .await?;

        let code = generate_otp();
        let message_id = self
            .outbox
            .enqueue_sms_otp(phone.as_str(), &code, request.template.as_deref())
            .await?;
        let remaining_attempts = self.rate_limit.remaining_attempts(&device).await?;

        let info = parse_user_agent(&request.user_agent);
        tracing::info!(
            %message_id,
            %phone,
            remaining_attempts,
            device_type = ?info.device_type,
            browser = ?info.browser,
            os = ?info.os,
            "sms otp queued"
        );
        Ok(RequestSmsOtpResponse {
            message_id,
            remaining_attempts,
            expires_in: self.config.otp_ttl,
        })
    }
}

fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}
