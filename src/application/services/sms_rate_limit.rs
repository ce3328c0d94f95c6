use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{models::SmsRateLimit, repositories::SmsRateLimitRepository};

#[derive(Debug, Clone, Copy)]
pub struct SmsRateLimitConfig {
    pub max_attempts: u32,
    pub window: Duration,
    pub block_duration: Duration,
    pub retention: Duration,
}

impl Default for SmsRateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window: Duration::hours(24),
            block_duration: Duration::hours(24),
            retention: Duration::days(2),
        }
    }
}

/// Daily OTP budget per device. Unlike the API limiter, storage errors are
/// returned to the caller.
#[derive(Clone)]
pub struct SmsRateLimitService {
    repo: Arc<dyn SmsRateLimitRepository>,
    config: SmsRateLimitConfig,
}

impl SmsRateLimitService {
    pub fn new(repo: Arc<dyn SmsRateLimitRepository>, config: SmsRateLimitConfig) -> Self {
        Self { repo, config }
    }

    pub async fn is_allowed(&self, device: &str, phone: &str) -> anyhow::Result<bool> {
        self.is_allowed_at(device, phone, Utc::now()).await
    }

    pub async fn is_allowed_at(
        &self,
        device: &str,
        _phone: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let removed = self
            .repo
            .delete_older_than(now - self.config.retention)
            .await?;
        if removed > 0 {
            tracing::debug!(removed, "removed expired sms rate limits");
        }

        let Some(mut record) = self.repo.find(device).await? else {
            return Ok(true);
        };

        if record.is_blocked(now) {
            return Ok(false);
        }

        if now - record.first_attempt_at >= self.config.window {
            record.attempt_count = 0;
            record.first_attempt_at = now;
            record.blocked_until = None;
            record.updated_at = now;
            self.repo.upsert(&record).await?;
            return Ok(true);
        }

        Ok(record.attempt_count < self.config.max_attempts)
    }

    pub async fn record_attempt(&self, device: &str, phone: &str) -> anyhow::Result<()> {
        self.record_attempt_at(device, phone, Utc::now()).await
    }

    pub async fn record_attempt_at(
        &self,
        device: &str,
        phone: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let record = match self.repo.find(device).await? {
            None => SmsRateLimit::first_attempt(device, phone, now),
            Some(mut record) => {
                if now - record.first_attempt_at >= self.config.window {
                    record.attempt_count = 1;
                    record.first_attempt_at = now;
                    record.blocked_until = None;
                } else {
                    record.attempt_count += 1;
                    if record.attempt_count >= self.config.max_attempts {
                        record.blocked_until =
                            Some(record.first_attempt_at + self.config.block_duration);
                        tracing::info!(device, attempts = record.attempt_count, "sms device blocked");
                    }
                }
                record.phone_number = phone.to_string();
                record.updated_at = now;
                record
            }
        };

        self.repo.upsert(&record).await
    }

    pub async fn remaining_attempts(&self, device: &str) -> anyhow::Result<u32> {
        self.remaining_attempts_at(device, Utc::now()).await
    }

    pub async fn remaining_attempts_at(
        &self,
        device: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<u32> {
        Ok(match self.repo.find(device).await? {
            Some(record) if now - record.first_attempt_at < self.config.window => self
                .config
                .max_attempts
                .saturating_sub(record.attempt_count),
            _ => self.config.max_attempts,
        })
    }

    pub async fn block_remaining(&self, device: &str) -> anyhow::Result<Option<std::time::Duration>> {
        self.block_remaining_at(device, Utc::now()).await
    }

    pub async fn block_remaining_at(
        &self,
        device: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<std::time::Duration>> {
        Ok(self
            .repo
            .find(device)
            .await?
            .and_then(|record| record.blocked_until)
            .filter(|until| *until > now)
            .and_then(|until| (until - now).to_std().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemorySmsRateLimitRepository;

    fn service() -> SmsRateLimitService {
        SmsRateLimitService::new(
            Arc::new(InMemorySmsRateLimitRepository::new()),
            SmsRateLimitConfig::default(),
        )
    }

    #[tokio::test]
    async fn third_attempt_blocks_the_device_for_a_day() {
        let limiter = service();
        let start = Utc::now();
        let phone = "923001234567";

        for minutes in 0..3 {
            let at = start + Duration::minutes(minutes);
            assert!(limiter.is_allowed_at("device-a", phone, at).await.unwrap());
            limiter.record_attempt_at("device-a", phone, at).await.unwrap();
        }

        let after = start + Duration::minutes(10);
        assert!(!limiter.is_allowed_at("device-a", phone, after).await.unwrap());
        assert_eq!(limiter.remaining_attempts_at("device-a", after).await.unwrap(), 0);

        let remaining = limiter
            .block_remaining_at("device-a", after)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(remaining.as_secs(), (Duration::hours(24) - Duration::minutes(10)).num_seconds() as u64);
    }

    #[tokio::test]
    async fn devices_are_limited_independently() {
        let limiter = service();
        let now = Utc::now();
        for _ in 0..3 {
            limiter.record_attempt_at("device-a", "923001234567", now).await.unwrap();
        }

        assert!(limiter.is_allowed_at("device-b", "923001234567", now).await.unwrap());
        assert_eq!(limiter.remaining_attempts_at("device-b", now).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn budget_resets_after_the_window() {
        let limiter = service();
        let start = Utc::now();
        limiter.record_attempt_at("device-a", "923001234567", start).await.unwrap();
        limiter.record_attempt_at("device-a", "923001234567", start).await.unwrap();

        let next_day = start + Duration::hours(25);
        assert_eq!(limiter.remaining_attempts_at("device-a", next_day).await.unwrap(), 3);
        limiter.record_attempt_at("device-a", "923007654321", next_day).await.unwrap();
        assert_eq!(limiter.remaining_attempts_at("device-a", next_day).await.unwrap(), 2);
        assert!(limiter.block_remaining_at("device-a", next_day).await.unwrap().is_none());
    }
}
