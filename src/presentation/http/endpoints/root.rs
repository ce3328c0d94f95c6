use std::sync::Arc;

use poem_openapi::Tags;

use crate::application::services::{api_rate_limit::ApiRateLimitService, jwt::JwtServiceConfig};
use crate::application::usecases::{
    list_categories::ListCategoriesUseCase, list_notifications::ListNotificationsUseCase,
    mark_notifications_read::MarkNotificationsReadUseCase, request_sms_otp::RequestSmsOtpUseCase,
};

pub const OTP_ENDPOINT: &str = "otp/sms";

/// Per-client request budget for one endpoint.
#[derive(Clone, Copy, Debug)]
pub struct EndpointLimit {
    pub max_requests: u32,
    pub window: chrono::Duration,
}

impl Default for EndpointLimit {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: chrono::Duration::minutes(5),
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub request_sms_otp_usecase: Arc<RequestSmsOtpUseCase>,
    pub list_notifications_usecase: Arc<ListNotificationsUseCase>,
    pub mark_notifications_read_usecase: Arc<MarkNotificationsReadUseCase>,
    pub list_categories_usecase: Arc<ListCategoriesUseCase>,
    pub api_rate_limit: ApiRateLimitService,
    pub otp_limit: EndpointLimit,
    pub jwt_config: JwtServiceConfig,
}

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Otp,
    Notifications,
    Categories,
}
