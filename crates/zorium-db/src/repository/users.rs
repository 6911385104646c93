//! User repository: CRUD operations for user accounts.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;
use zorium_common::models::user::{User, UserProfile};

/// Create a password account.
pub async fn create_user(
    pool: &PgPool,
    id: Uuid,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, email_verified, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 'user', FALSE, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

/// Create a wallet-only account (no password, no email).
pub async fn create_wallet_user(
    pool: &PgPool,
    id: Uuid,
    username: &str,
    wallet_address: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, wallet_address, role, email_verified, created_at, updated_at)
        VALUES ($1, $2, $3, 'user', FALSE, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(wallet_address)
    .fetch_one(pool)
    .await
}

/// Find a user by their unique ID.
pub async fn find_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Find a user by username (case-insensitive).
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Find a user by email.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Find a user by username or email, for login.
pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1) LIMIT 1",
    )
    .bind(login)
    .fetch_optional(pool)
    .await
}

/// Find a user by linked wallet address (stored lowercase).
pub async fn find_by_wallet<'e>(
    executor: impl PgExecutor<'e>,
    wallet_address: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE wallet_address = LOWER($1)")
        .bind(wallet_address)
        .fetch_optional(executor)
        .await
}

/// Update user profile fields.
pub async fn update_user(
    pool: &PgPool,
    id: Uuid,
    username: Option<&str>,
    display_name: Option<&str>,
    bio: Option<&str>,
    avatar_url: Option<&str>,
    banner_url: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            username = COALESCE($2, username),
            display_name = COALESCE($3, display_name),
            bio = COALESCE($4, bio),
            avatar_url = COALESCE($5, avatar_url),
            banner_url = COALESCE($6, banner_url),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(display_name)
    .bind(bio)
    .bind(avatar_url)
    .bind(banner_url)
    .fetch_one(pool)
    .await
}

/// Attach a wallet address to an account.
pub async fn set_wallet(pool: &PgPool, id: Uuid, wallet_address: &str) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET wallet_address = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(wallet_address)
    .fetch_one(pool)
    .await
}

pub async fn set_password<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn mark_email_verified<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET email_verified = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn set_role(pool: &PgPool, id: Uuid, role: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(role)
    .fetch_optional(pool)
    .await
}

/// Load a user's public profile with follower/following/creation counters.
pub async fn profile(
    pool: &PgPool,
    user: User,
    viewer: Option<Uuid>,
) -> Result<UserProfile, sqlx::Error> {
    let (followers, following, nfts_created, followed_by_me): (i64, i64, i64, bool) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM follows WHERE followed_id = $1),
                (SELECT COUNT(*) FROM follows WHERE follower_id = $1),
                (SELECT COUNT(*) FROM nfts WHERE creator_id = $1),
                EXISTS(SELECT 1 FROM follows WHERE follower_id = $2 AND followed_id = $1)
            "#,
        )
        .bind(user.id)
        .bind(viewer)
        .fetch_one(pool)
        .await?;

    Ok(UserProfile {
        user: user.into(),
        followers,
        following,
        nfts_created,
        followed_by_me: viewer.map(|_| followed_by_me),
    })
}

/// List accounts for the admin dashboard, newest first.
pub async fn list_users(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2")
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Count total users.
pub async fn count_users<'e>(executor: impl PgExecutor<'e>) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

/// Case-insensitive username/display name/wallet search.
pub async fn search(pool: &PgPool, pattern: &str, limit: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE username ILIKE $1 OR display_name ILIKE $1 OR wallet_address ILIKE $1
        ORDER BY username
        LIMIT $2
        "#,
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await
}
