use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{models::ApiRateLimit, repositories::ApiRateLimitRepository};

/// Fixed-window limiter keyed by identifier and endpoint. Every storage
/// failure lets the request through.
#[derive(Clone)]
pub struct ApiRateLimitService {
    repo: Arc<dyn ApiRateLimitRepository>,
    retention: Duration,
}

impl ApiRateLimitService {
    pub fn new(repo: Arc<dyn ApiRateLimitRepository>) -> Self {
        Self {
            repo,
            retention: Duration::hours(24),
        }
    }

    pub async fn is_allowed(
        &self,
        identifier: &str,
        endpoint: &str,
        max_requests: u32,
        window: Duration,
    ) -> bool {
        self.is_allowed_at(identifier, endpoint, max_requests, window, Utc::now())
            .await
    }

    pub async fn is_allowed_at(
        &self,
        identifier: &str,
        endpoint: &str,
        max_requests: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        match self
            .check(identifier, endpoint, max_requests, window, now)
            .await
        {
            Ok(allowed) => allowed,
            Err(err) => {
                tracing::error!(
                    error = ?err,
                    endpoint,
                    identifier,
                    "api rate limit check failed, allowing request"
                );
                true
            }
        }
    }

    async fn check(
        &self,
        identifier: &str,
        endpoint: &str,
        max_requests: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        self.cleanup(endpoint, now).await;

        let Some(mut record) = self.repo.find(identifier, endpoint).await? else {
            return Ok(true);
        };

        if record.is_blocked(now) {
            return Ok(false);
        }

        if now >= record.window_start + window {
            record.request_count = 0;
            record.window_start = now;
            record.blocked_until = None;
            record.updated_at = now;
            self.repo.upsert(&record).await?;
            return Ok(true);
        }

        Ok(record.request_count < max_requests)
    }

    pub async fn record_request(&self, identifier: &str, endpoint: &str) {
        self.record_request_at(identifier, endpoint, Utc::now()).await
    }

    pub async fn record_request_at(&self, identifier: &str, endpoint: &str, now: DateTime<Utc>) {
        let result: anyhow::Result<()> = async {
            let record = match self.repo.find(identifier, endpoint).await? {
                Some(mut existing) => {
                    existing.request_count += 1;
                    existing.updated_at = now;
                    existing
                }
                None => ApiRateLimit::new(identifier, endpoint, 1, now),
            };
            self.repo.upsert(&record).await
        }
        .await;

        if let Err(err) = result {
            tracing::error!(error = ?err, endpoint, identifier, "failed to record api request");
        }
    }

    pub async fn remaining_requests(
        &self,
        identifier: &str,
        endpoint: &str,
        max_requests: u32,
        window: Duration,
    ) -> u32 {
        self.remaining_requests_at(identifier, endpoint, max_requests, window, Utc::now())
            .await
    }

    pub async fn remaining_requests_at(
        &self,
        identifier: &str,
        endpoint: &str,
        max_requests: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> u32 {
        match self.repo.find(identifier, endpoint).await {
            Ok(Some(record)) if now < record.window_start + window => {
                max_requests.saturating_sub(record.request_count)
            }
            Ok(_) => max_requests,
            Err(err) => {
                tracing::error!(error = ?err, endpoint, identifier, "failed to read api rate limit");
                max_requests
            }
        }
    }

    async fn cleanup(&self, endpoint: &str, now: DateTime<Utc>) {
        match self.repo.delete_stale(endpoint, now - self.retention).await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(endpoint, removed, "removed stale api rate limits"),
            Err(err) => tracing::error!(error = ?err, endpoint, "api rate limit cleanup failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemoryApiRateLimitRepository;

    const ENDPOINT: &str = "otp/sms";

    fn service() -> (ApiRateLimitService, Arc<InMemoryApiRateLimitRepository>) {
        let repo = Arc::new(InMemoryApiRateLimitRepository::new());
        (ApiRateLimitService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn denies_once_the_window_is_full() {
        let (limiter, _) = service();
        let now = Utc::now();
        let window = Duration::minutes(5);

        for _ in 0..3 {
            assert!(limiter.is_allowed_at("10.0.0.1", ENDPOINT, 3, window, now).await);
            limiter.record_request_at("10.0.0.1", ENDPOINT, now).await;
        }

        assert!(!limiter.is_allowed_at("10.0.0.1", ENDPOINT, 3, window, now).await);
        assert!(limiter.is_allowed_at("10.0.0.2", ENDPOINT, 3, window, now).await);
        assert_eq!(
            limiter
                .remaining_requests_at("10.0.0.1", ENDPOINT, 3, window, now)
                .await,
            0
        );
    }

    #[tokio::test]
    async fn elapsed_window_resets_the_counter() {
        let (limiter, repo) = service();
        let start = Utc::now();
        let window = Duration::minutes(5);

        for _ in 0..3 {
            limiter.record_request_at("10.0.0.1", ENDPOINT, start).await;
        }
        let later = start + Duration::minutes(6);
        assert!(limiter.is_allowed_at("10.0.0.1", ENDPOINT, 3, window, later).await);

        let record = repo.find("10.0.0.1", ENDPOINT).await.unwrap().unwrap();
        assert_eq!(record.request_count, 0);
        assert_eq!(record.window_start, later);
    }

    #[tokio::test]
    async fn stored_block_wins_over_counts() {
        let (limiter, repo) = service();
        let now = Utc::now();
        let mut record = ApiRateLimit::new("10.0.0.9", ENDPOINT, 1, now);
        record.blocked_until = Some(now + Duration::minutes(30));
        repo.upsert(&record).await.unwrap();

        assert!(
            !limiter
                .is_allowed_at("10.0.0.9", ENDPOINT, 100, Duration::hours(2), now)
                .await
        );
        assert!(
            limiter
                .is_allowed_at(
                    "10.0.0.9",
                    ENDPOINT,
                    100,
                    Duration::hours(2),
                    now + Duration::minutes(31)
                )
                .await
        );
    }

    struct BrokenRepository;

    #[async_trait]
    impl ApiRateLimitRepository for BrokenRepository {
        async fn find(&self, _: &str, _: &str) -> anyhow::Result<Option<ApiRateLimit>> {
            anyhow::bail!("connection reset")
        }
        async fn upsert(&self, _: &ApiRateLimit) -> anyhow::Result<()> {
            anyhow::bail!("connection reset")
        }
        async fn delete_stale(&self, _: &str, _: DateTime<Utc>) -> anyhow::Result<u64> {
            anyhow::bail!("connection reset")
        }
    }

    #[tokio::test]
    async fn storage_failures_fail_open() {
        let limiter = ApiRateLimitService::new(Arc::new(BrokenRepository));

        assert!(limiter.is_allowed("ip", ENDPOINT, 1, Duration::minutes(1)).await);
        limiter.record_request("ip", ENDPOINT).await;
        assert_eq!(
            limiter
                .remaining_requests("ip", ENDPOINT, 7, Duration::minutes(1))
                .await,
            7
        );
    }
}
