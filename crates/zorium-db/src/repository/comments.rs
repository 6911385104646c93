//! Comment repository.

use sqlx::PgPool;
use uuid::Uuid;
use zorium_common::models::social::{Comment, CommentWithAuthor};

pub async fn create_comment(
    pool: &PgPool,
    id: Uuid,
    nft_id: Uuid,
    user_id: Uuid,
    parent_id: Option<Uuid>,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (id, nft_id, user_id, parent_id, content, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(nft_id)
    .bind(user_id)
    .bind(parent_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Comments on an NFT, oldest first, with author info.
pub async fn list_for_nft(
    pool: &PgPool,
    nft_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, CommentWithAuthor>(
        r#"
        SELECT c.*, u.username AS author_username, u.avatar_url AS author_avatar_url
        FROM comments c
        INNER JOIN users u ON u.id = c.user_id
        WHERE c.nft_id = $1
        ORDER BY c.created_at ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(nft_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_for_nft(pool: &PgPool, nft_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE nft_id = $1")
        .bind(nft_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Delete a comment (replies cascade).
pub async fn delete_comment(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
