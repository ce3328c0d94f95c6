use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiRateLimit {
    pub id: Uuid,
    pub identifier: String,
    pub endpoint: String,
    pub request_count: u32,
    pub window_start: DateTime<Utc>,
    pub blocked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiRateLimit {
    pub fn new(identifier: &str, endpoint: &str, request_count: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier: identifier.to_string(),
            endpoint: endpoint.to_string(),
            request_count,
            window_start: now,
            blocked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_blocked(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SmsRateLimit {
    pub id: Uuid,
    pub device_identifier: String,
    pub phone_number: String,
    pub attempt_count: u32,
    pub first_attempt_at: DateTime<Utc>,
    pub blocked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SmsRateLimit {
    pub fn first_attempt(device_identifier: &str, phone_number: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_identifier: device_identifier.to_string(),
            phone_number: phone_number.to_string(),
            attempt_count: 1,
            first_attempt_at: now,
            blocked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_blocked(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }
}
