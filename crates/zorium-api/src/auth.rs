//! Password hashing and token issuance.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use uuid::Uuid;
use zorium_common::auth::{ACCESS_TOKEN, Claims, REFRESH_TOKEN};
use zorium_common::error::ZoriumError;
use zorium_common::models::user::User;

/// Token pair returned on login/register.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against an Argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn generate_token(
    user_id: Uuid,
    username: &str,
    role: &str,
    token_type: &str,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role: role.to_string(),
        iat: now.timestamp(),
        exp: (now + zorium_common::config::duration_secs(ttl_secs)).timestamp(),
        token_type: token_type.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Generate both access and refresh tokens.
pub fn generate_token_pair(
    user_id: Uuid,
    username: &str,
    role: &str,
    secret: &str,
    access_ttl: u64,
    refresh_ttl: u64,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    Ok(TokenPair {
        access_token: generate_token(user_id, username, role, ACCESS_TOKEN, secret, access_ttl)?,
        refresh_token: generate_token(user_id, username, role, REFRESH_TOKEN, secret, refresh_ttl)?,
        expires_in: access_ttl,
        token_type: "Bearer".to_string(),
    })
}

/// Issue a token pair for `user` using the global auth settings.
pub fn tokens_for(user: &User) -> Result<TokenPair, ZoriumError> {
    let config = zorium_common::config::get();
    generate_token_pair(
        user.id,
        &user.username,
        &user.role,
        &config.auth.jwt_secret,
        config.auth.access_token_ttl_secs,
        config.auth.refresh_token_ttl_secs,
    )
    .map_err(|e| ZoriumError::Internal(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zorium_common::auth::validate_token;

    const SECRET: &str = "test-secret-with-enough-entropy";

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn token_pair_carries_role_and_type() {
        let id = Uuid::now_v7();
        let pair = generate_token_pair(id, "alice", "admin", SECRET, 60, 120).unwrap();
        assert_eq!(pair.expires_in, 60);

        let access = validate_token(&pair.access_token, SECRET).unwrap();
        assert_eq!(access.sub, id.to_string());
        assert_eq!(access.role, "admin");
        assert_eq!(access.token_type, ACCESS_TOKEN);

        let refresh = validate_token(&pair.refresh_token, SECRET).unwrap();
        assert_eq!(refresh.token_type, REFRESH_TOKEN);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn huge_ttl_does_not_overflow() {
        let pair = generate_token_pair(Uuid::now_v7(), "alice", "user", SECRET, u64::MAX, u64::MAX)
            .unwrap();
        let access = validate_token(&pair.access_token, SECRET).unwrap();
        assert!(access.exp > access.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let pair = generate_token_pair(Uuid::now_v7(), "bob", "user", SECRET, 60, 60).unwrap();
        assert!(validate_token(&pair.access_token, "another-secret").is_err());
    }
}
