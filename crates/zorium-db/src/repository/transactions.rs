//! Marketplace transaction history.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;
use zorium_common::models::transaction::Transaction;

const TX_COLUMNS: &str =
    "id, nft_id, from_user_id, to_user_id, kind, price::TEXT AS price, tx_hash, created_at";

/// Record a transaction. `price` is a base-unit decimal string.
pub async fn create_transaction<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    nft_id: Uuid,
    from_user_id: Option<Uuid>,
    to_user_id: Option<Uuid>,
    kind: &str,
    price: Option<&str>,
    tx_hash: Option<&str>,
) -> Result<Transaction, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO transactions (id, nft_id, from_user_id, to_user_id, kind, price, tx_hash, created_at)
        VALUES ($1, $2, $3, $4, $5, $6::NUMERIC, $7, NOW())
        RETURNING {TX_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Transaction>(&sql)
        .bind(id)
        .bind(nft_id)
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(kind)
        .bind(price)
        .bind(tx_hash)
        .fetch_one(executor)
        .await
}

pub async fn exists_by_hash(pool: &PgPool, tx_hash: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM transactions WHERE tx_hash = $1)")
        .bind(tx_hash)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn list_for_nft(
    pool: &PgPool,
    nft_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let sql = format!(
        "SELECT {TX_COLUMNS} FROM transactions WHERE nft_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
    );
    sqlx::query_as::<_, Transaction>(&sql)
        .bind(nft_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Transactions where the user is sender or receiver.
pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {TX_COLUMNS} FROM transactions
        WHERE from_user_id = $1 OR to_user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    sqlx::query_as::<_, Transaction>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}
