pub mod categories;
pub mod health;
pub mod notifications;
pub mod otp;
pub mod root;

use std::sync::Arc;

use categories::CategoryEndpoints;
use health::HealthEndpoints;
use notifications::NotificationEndpoints;
use otp::OtpEndpoints;
use root::ApiState;

pub type Endpoints = (
    HealthEndpoints,
    OtpEndpoints,
    NotificationEndpoints,
    CategoryEndpoints,
);

pub fn endpoints(state: Arc<ApiState>) -> Endpoints {
    (
        HealthEndpoints,
        OtpEndpoints::new(state.clone()),
        NotificationEndpoints::new(state.clone()),
        CategoryEndpoints::new(state),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use poem::{Route, http::StatusCode, test::TestClient};
    use poem_openapi::OpenApiService;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::{
        application::{
            services::{
                api_rate_limit::ApiRateLimitService,
                captcha::CaptchaVerifier,
                jwt::{JwtServiceConfig, issue_token},
                outbox::OutboxService,
                sms_rate_limit::{SmsRateLimitConfig, SmsRateLimitService},
            },
            usecases::{
                list_categories::ListCategoriesUseCase,
                list_notifications::ListNotificationsUseCase,
                mark_notifications_read::MarkNotificationsReadUseCase,
                request_sms_otp::{RequestSmsOtpConfig, RequestSmsOtpUseCase},
            },
        },
        domain::{
            models::{Category, Notification, NotificationType},
            repositories::{CategoryRepository, NotificationRepository, OutboxRepository},
        },
        infrastructure::repositories::in_memory::{
            InMemoryApiRateLimitRepository, InMemoryCategoryRepository,
            InMemoryNotificationRepository, InMemoryOutboxRepository,
            InMemorySmsRateLimitRepository,
        },
        presentation::http::endpoints::root::EndpointLimit,
    };

    struct FixedCaptcha(bool);

    #[async_trait]
    impl CaptchaVerifier for FixedCaptcha {
        async fn validate(&self, _token: &str, _remote_ip: Option<&str>) -> bool {
            self.0
        }
    }

    struct Harness {
        client: TestClient<Route>,
        outbox: Arc<InMemoryOutboxRepository>,
        notifications: Arc<InMemoryNotificationRepository>,
        categories: Arc<InMemoryCategoryRepository>,
        jwt_config: JwtServiceConfig,
    }

    fn harness(captcha_ok: bool, otp_limit: EndpointLimit) -> Harness {
        let outbox = Arc::new(InMemoryOutboxRepository::new());
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let jwt_config = JwtServiceConfig {
            secret: "test-secret".into(),
        };

        let state = Arc::new(ApiState {
            request_sms_otp_usecase: Arc::new(RequestSmsOtpUseCase::new(
                Arc::new(FixedCaptcha(captcha_ok)),
                SmsRateLimitService::new(
                    Arc::new(InMemorySmsRateLimitRepository::new()),
                    SmsRateLimitConfig::default(),
                ),
                OutboxService::new(outbox.clone()),
                RequestSmsOtpConfig::default(),
            )),
            list_notifications_usecase: Arc::new(ListNotificationsUseCase::new(
                notifications.clone(),
            )),
            mark_notifications_read_usecase: Arc::new(MarkNotificationsReadUseCase::new(
                notifications.clone(),
            )),
            list_categories_usecase: Arc::new(ListCategoriesUseCase::new(categories.clone())),
            api_rate_limit: ApiRateLimitService::new(Arc::new(
                InMemoryApiRateLimitRepository::new(),
            )),
            otp_limit,
            jwt_config: jwt_config.clone(),
        });

        let api = OpenApiService::new(endpoints(state), "Test API", "0.0.0");
        Harness {
            client: TestClient::new(Route::new().nest("/api", api)),
            outbox,
            notifications,
            categories,
            jwt_config,
        }
    }

    fn bearer(config: &JwtServiceConfig, user_id: Uuid) -> String {
        format!("Bearer {}", issue_token(config, user_id, "buyer@example.com"))
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let h = harness(true, EndpointLimit::default());
        let resp = h.client.get("/api/health").send().await;
        resp.assert_status_is_ok();
        resp.assert_text("OK").await;
    }

    #[tokio::test]
    async fn otp_request_is_queued_in_the_outbox() {
        let h = harness(true, EndpointLimit::default());
        let resp = h
            .client
            .post("/api/otp/sms")
            .header("User-Agent", "Mozilla/5.0 (Windows NT 10.0) Chrome/120.0")
            .header("X-Forwarded-For", "203.0.113.7")
            .body_json(&json!({ "phone": "0300-1234567", "captcha_token": "t" }))
            .send()
            .await;
        resp.assert_status_is_ok();
        resp.assert_header("X-RateLimit-Remaining", "4");

        let json = resp.json().await;
        let body = json.value().object();
        body.get("remaining_attempts").assert_i64(2);
        body.get("expires_in_seconds").assert_i64(600);

        let pending = h.outbox.fetch_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].payload.contains("923001234567"));
    }

    #[tokio::test]
    async fn rejected_captcha_is_forbidden() {
        let h = harness(false, EndpointLimit::default());
        let resp = h
            .client
            .post("/api/otp/sms")
            .header("X-Forwarded-For", "203.0.113.7")
            .body_json(&json!({ "phone": "03001234567", "captcha_token": "bad" }))
            .send()
            .await;
        resp.assert_status(StatusCode::FORBIDDEN);
        assert!(h.outbox.fetch_pending(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn otp_endpoint_limits_each_client_ip() {
        let limit = EndpointLimit {
            max_requests: 1,
            window: chrono::Duration::minutes(5),
        };
        let h = harness(true, limit);
        let send = |ip: &'static str| {
            h.client
                .post("/api/otp/sms")
                .header("X-Forwarded-For", ip)
                .body_json(&json!({ "phone": "03001234567", "captcha_token": "t" }))
                .send()
        };

        let first = send("198.51.100.1").await;
        first.assert_status_is_ok();
        first.assert_header("X-RateLimit-Remaining", "0");
        let limited = send("198.51.100.1").await;
        limited.assert_status(StatusCode::TOO_MANY_REQUESTS);
        limited.assert_header("Retry-After", "300");
        send("198.51.100.2").await.assert_status_is_ok();
    }

    #[tokio::test]
    async fn notifications_require_a_bearer_token() {
        let h = harness(true, EndpointLimit::default());
        h.client
            .get("/api/notifications")
            .send()
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn lists_and_marks_notifications_for_the_caller() {
        let h = harness(true, EndpointLimit::default());
        let user_id = Uuid::new_v4();
        let wallet = Notification::unread(
            user_id,
            NotificationType::Wallet,
            "Withdrawal Completed".into(),
            "Your withdrawal was paid out".into(),
            None,
        );
        h.notifications.insert(&wallet).await.unwrap();
        h.notifications
            .insert(&Notification::unread(
                Uuid::new_v4(),
                NotificationType::System,
                "Someone else".into(),
                "m".into(),
                None,
            ))
            .await
            .unwrap();
        let auth = bearer(&h.jwt_config, user_id);

        let resp = h
            .client
            .get("/api/notifications")
            .header("Authorization", auth.clone())
            .query("type", &"wallet")
            .send()
            .await;
        resp.assert_status_is_ok();
        let json = resp.json().await;
        let body = json.value().object();
        body.get("notifications").array().assert_len(1);
        body.get("stats").object().get("unread").assert_i64(1);
        body.get("pagination").object().get("total").assert_i64(1);

        let resp = h
            .client
            .post("/api/notifications/read")
            .header("Authorization", auth.clone())
            .body_json(&json!({ "ids": [wallet.id] }))
            .send()
            .await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({ "updated": 1 })).await;

        let resp = h
            .client
            .post("/api/notifications/read-all")
            .header("Authorization", auth)
            .send()
            .await;
        resp.assert_json(json!({ "updated": 0 })).await;
    }

    #[tokio::test]
    async fn categories_are_listed() {
        let h = harness(true, EndpointLimit::default());
        let parent = Category::active("Computers", "Laptops and desktops", None);
        let child = Category::active("Laptops", "Portable computers", Some(parent.id));
        h.categories.insert_many(&[parent, child]).await.unwrap();

        let resp = h.client.get("/api/categories").send().await;
        resp.assert_status_is_ok();
        resp.json().await.value().array().assert_len(2);
    }

    #[test]
    fn default_otp_limit_is_five_per_five_minutes() {
        let limit = EndpointLimit::default();
        assert_eq!(limit.max_requests, 5);
        assert_eq!(limit.window.to_std().unwrap(), Duration::from_secs(300));
    }
}
