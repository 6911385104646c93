//! Likes repository: one like per (user, NFT).

use sqlx::PgPool;
use uuid::Uuid;

/// Like an NFT. Returns true if newly added, false if already liked.
pub async fn add_like(pool: &PgPool, user_id: Uuid, nft_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO likes (user_id, nft_id, created_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id, nft_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(nft_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a like. Returns true if a like was removed.
pub async fn remove_like(pool: &PgPool, user_id: Uuid, nft_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND nft_id = $2")
        .bind(user_id)
        .bind(nft_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_for_nft(pool: &PgPool, nft_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE nft_id = $1")
        .bind(nft_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
