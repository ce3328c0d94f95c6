use std::sync::Arc;

use poem::{Result as PoemResult, web::RemoteAddr};
use poem_openapi::{OpenApi, param::Header, payload::Json};

use crate::{
    application::usecases::request_sms_otp::RequestSmsOtpRequest,
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags, OTP_ENDPOINT},
        errors::{domain_error, too_many_requests},
        requests::RequestSmsOtpDto,
        responses::{SmsOtpResponse, SmsOtpResponseDto},
    },
};

#[derive(Clone)]
pub struct OtpEndpoints {
    state: Arc<ApiState>,
}

impl OtpEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl OtpEndpoints {
    /// Queue a one-time password for delivery by SMS.
    #[oai(path = "/otp/sms", method = "post", tag = EndpointsTags::Otp)]
    pub async fn request_sms_otp(
        &self,
        remote_addr: &RemoteAddr,
        #[oai(name = "User-Agent")] user_agent: Header<Option<String>>,
        #[oai(name = "X-Forwarded-For")] forwarded_for: Header<Option<String>>,
        body: Json<RequestSmsOtpDto>,
    ) -> PoemResult<SmsOtpResponse> {
        let client_ip = client_ip(forwarded_for.0.as_deref(), remote_addr);
        let identifier = client_ip.clone().unwrap_or_else(|| "unknown".to_string());
        let limit = self.state.otp_limit;

        if !self
            .state
            .api_rate_limit
            .is_allowed(&identifier, OTP_ENDPOINT, limit.max_requests, limit.window)
            .await
        {
            tracing::info!(identifier, endpoint = OTP_ENDPOINT, "api rate limit exceeded");
            return Err(too_many_requests(Some(limit.window.num_seconds().max(0) as u64)));
        }
        self.state
            .api_rate_limit
            .record_request(&identifier, OTP_ENDPOINT)
            .await;
        let requests_remaining = self
            .state
            .api_rate_limit
            .remaining_requests(&identifier, OTP_ENDPOINT, limit.max_requests, limit.window)
            .await;

        let body = body.0;
        let response = self
            .state
            .request_sms_otp_usecase
            .execute(RequestSmsOtpRequest {
                phone: body.phone,
                user_agent: user_agent.0.unwrap_or_default(),
                captcha_token: body.captcha_token,
                remote_ip: client_ip,
                template: body.template,
            })
            .await
            .map_err(domain_error)?;

        Ok(SmsOtpResponse::Queued(
            Json(SmsOtpResponseDto {
                message_id: response.message_id,
                remaining_attempts: response.remaining_attempts,
                expires_in_seconds: response.expires_in.as_secs(),
            }),
            requests_remaining,
        ))
    }
}

/// First hop of `X-Forwarded-For`, else the peer address.
fn client_ip(forwarded_for: Option<&str>, remote_addr: &RemoteAddr) -> Option<String> {
    forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| remote_addr.as_socket_addr().map(|addr| addr.ip().to_string()))
}
