//! One-time email tokens (verification and password reset).

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

pub const PURPOSE_VERIFY_EMAIL: &str = "verify_email";
pub const PURPOSE_RESET_PASSWORD: &str = "reset_password";

/// Only the SHA-256 hash of the token is stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailVerificationToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub purpose: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EmailVerificationToken {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_in: i64, used: bool) -> EmailVerificationToken {
        let now = Utc::now();
        EmailVerificationToken {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            token_hash: "00".into(),
            purpose: PURPOSE_VERIFY_EMAIL.into(),
            expires_at: now + Duration::seconds(expires_in),
            used_at: used.then_some(now),
            created_at: now,
        }
    }

    #[test]
    fn fresh_token_is_usable() {
        assert!(token(60, false).is_usable(Utc::now()));
    }

    #[test]
    fn expired_or_used_tokens_are_not() {
        assert!(!token(-1, false).is_usable(Utc::now()));
        assert!(!token(60, true).is_usable(Utc::now()));
    }
}
