//! Wheel spin history.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;
use zorium_common::models::rewards::{WheelHistory, WheelSpin};

const SPIN_COLUMNS: &str = "id, user_id, wallet_address, prize_label, amount::TEXT AS amount, created_at";

pub async fn create_spin<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
    wallet_address: &str,
    prize_label: &str,
    amount: &str,
) -> Result<WheelSpin, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO wheel_spins (id, user_id, wallet_address, prize_label, amount, created_at)
        VALUES ($1, $2, $3, $4, $5::NUMERIC, NOW())
        RETURNING {SPIN_COLUMNS}
        "#
    );
    sqlx::query_as::<_, WheelSpin>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(wallet_address)
        .bind(prize_label)
        .bind(amount)
        .fetch_one(executor)
        .await
}

/// Spin count, total won (base units), and last spin time for a wallet.
pub async fn history_for_wallet<'e>(
    executor: impl PgExecutor<'e>,
    wallet_address: &str,
) -> Result<WheelHistory, sqlx::Error> {
    sqlx::query_as::<_, WheelHistory>(
        r#"
        SELECT COUNT(*) AS total_spins,
               COALESCE(SUM(amount), 0)::TEXT AS total_won,
               MAX(created_at) AS last_spin_at
        FROM wheel_spins
        WHERE wallet_address = $1
        "#,
    )
    .bind(wallet_address)
    .fetch_one(executor)
    .await
}

/// Serialize concurrent spins for one wallet inside a transaction.
pub async fn lock_wallet<'e>(
    executor: impl PgExecutor<'e>,
    wallet_address: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(wallet_address)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn recent_spins(
    pool: &PgPool,
    wallet_address: &str,
    limit: i64,
) -> Result<Vec<WheelSpin>, sqlx::Error> {
    let sql = format!(
        "SELECT {SPIN_COLUMNS} FROM wheel_spins WHERE wallet_address = $1 ORDER BY created_at DESC LIMIT $2"
    );
    sqlx::query_as::<_, WheelSpin>(&sql)
        .bind(wallet_address)
        .bind(limit)
        .fetch_all(pool)
        .await
}
