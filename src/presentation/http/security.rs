use poem::{Error as PoemError, Result as PoemResult, http::StatusCode};
use poem_openapi::SecurityScheme;
use poem_openapi::auth::Bearer;
use uuid::Uuid;

use crate::application::services::jwt::{JwtService, JwtServiceConfig};

/// Bearer token issued by the account service.
#[derive(SecurityScheme)]
#[oai(ty = "bearer", bearer_format = "JWT")]
pub struct JwtAuth(pub Bearer);

pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl JwtAuth {
    pub fn into_user(self, config: &JwtServiceConfig) -> PoemResult<AuthenticatedUser> {
        match JwtService::new(config).verify(&self.0.token) {
            Ok(claims) => Ok(AuthenticatedUser {
                user_id: claims.sub,
            }),
            Err(err) => {
                tracing::debug!(error = %err, "rejected bearer token");
                Err(PoemError::from_string(
                    "invalid or expired token",
                    StatusCode::UNAUTHORIZED,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::jwt::issue_token;

    fn config(secret: &str) -> JwtServiceConfig {
        JwtServiceConfig {
            secret: secret.into(),
        }
    }

    #[test]
    fn valid_token_yields_the_user() {
        let user_id = Uuid::new_v4();
        let token = issue_token(&config("s1"), user_id, "seller@example.com");

        let user = JwtAuth(Bearer { token }).into_user(&config("s1")).unwrap();
        assert_eq!(user.user_id, user_id);
    }

    #[test]
    fn foreign_signature_is_unauthorized() {
        let token = issue_token(&config("s1"), Uuid::new_v4(), "a@example.com");

        let err = JwtAuth(Bearer { token }).into_user(&config("s2")).err().unwrap();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
