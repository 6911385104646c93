//! One-time email tokens. Only SHA-256 hashes are stored.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;
use zorium_common::models::email_token::EmailVerificationToken;

/// Store a new token hash, invalidating earlier unused tokens for the same purpose.
pub async fn create_token(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    token_hash: &str,
    purpose: &str,
    expires_at: DateTime<Utc>,
) -> Result<EmailVerificationToken, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE email_verification_tokens SET used_at = NOW() WHERE user_id = $1 AND purpose = $2 AND used_at IS NULL",
    )
    .bind(user_id)
    .bind(purpose)
    .execute(&mut *tx)
    .await?;

    let token = sqlx::query_as::<_, EmailVerificationToken>(
        r#"
        INSERT INTO email_verification_tokens (id, user_id, token_hash, purpose, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(token_hash)
    .bind(purpose)
    .bind(expires_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(token)
}

/// Look up a token by hash and purpose, locking it for the caller's transaction.
pub async fn find_for_update<'e>(
    executor: impl PgExecutor<'e>,
    token_hash: &str,
    purpose: &str,
) -> Result<Option<EmailVerificationToken>, sqlx::Error> {
    sqlx::query_as::<_, EmailVerificationToken>(
        "SELECT * FROM email_verification_tokens WHERE token_hash = $1 AND purpose = $2 FOR UPDATE",
    )
    .bind(token_hash)
    .bind(purpose)
    .fetch_optional(executor)
    .await
}

pub async fn mark_used<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE email_verification_tokens SET used_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}
