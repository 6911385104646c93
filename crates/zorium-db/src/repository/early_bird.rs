//! Early Bird reward repository.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;
use zorium_common::models::rewards::EarlyBirdReward;

const REWARD_COLUMNS: &str = "id, user_id, position, amount::TEXT AS amount, claimed, created_at";

/// Serialize Early Bird grants for the rest of the transaction.
pub async fn lock_grants<'e>(executor: impl PgExecutor<'e>) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext('early_bird_rewards'))")
        .execute(executor)
        .await?;
    Ok(())
}

/// Position the next reward would take. Only stable under [`lock_grants`].
pub async fn next_position<'e>(executor: impl PgExecutor<'e>) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COALESCE(MAX(position), 0) + 1 FROM early_bird_rewards")
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

/// Record an Early Bird reward. Returns `None` if the user already has one.
pub async fn create_reward<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
    position: i64,
    amount: &str,
) -> Result<Option<EarlyBirdReward>, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO early_bird_rewards (id, user_id, position, amount, claimed, created_at)
        VALUES ($1, $2, $3, $4::NUMERIC, FALSE, NOW())
        ON CONFLICT DO NOTHING
        RETURNING {REWARD_COLUMNS}
        "#
    );
    sqlx::query_as::<_, EarlyBirdReward>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(position)
        .bind(amount)
        .fetch_optional(executor)
        .await
}

pub async fn find_for_user(pool: &PgPool, user_id: Uuid) -> Result<Option<EarlyBirdReward>, sqlx::Error> {
    let sql = format!("SELECT {REWARD_COLUMNS} FROM early_bird_rewards WHERE user_id = $1");
    sqlx::query_as::<_, EarlyBirdReward>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_rewards(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<EarlyBirdReward>, sqlx::Error> {
    let sql = format!(
        "SELECT {REWARD_COLUMNS} FROM early_bird_rewards ORDER BY position ASC LIMIT $1 OFFSET $2"
    );
    sqlx::query_as::<_, EarlyBirdReward>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}
