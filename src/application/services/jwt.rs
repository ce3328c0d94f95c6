use anyhow::Context;
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
pub struct JwtServiceConfig {
    pub secret: String,
}

/// Verifies the HS256 tokens the account service issues. The subject is the
/// account that owns notifications.
#[derive(Clone)]
pub struct JwtService {
    decoding: DecodingKey,
    validation: Validation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

impl JwtService {
    pub fn new(config: &JwtServiceConfig) -> Self {
        Self {
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .context("failed to verify JWT")
    }
}

/// Signs a one-hour token the way the account service does.
#[cfg(test)]
pub(crate) fn issue_token(config: &JwtServiceConfig, user_id: Uuid, email: &str) -> String {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use jsonwebtoken::{EncodingKey, Header};

    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (now + Duration::from_secs(3600)).as_secs() as usize,
        iat: now.as_secs() as usize,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap()
}
