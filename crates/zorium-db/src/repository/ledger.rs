//! ZRM ledger repository.
//!
//! Every credit (Early Bird, wheel, admin allocation, verified on-chain
//! deposit) is one row. Rows carrying a `tx_hash` are unique by hash, which
//! is the only idempotency guarantee for on-chain verification.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;
use zorium_common::models::rewards::{LedgerEntry, LedgerTotal, NewLedgerEntry};

const LEDGER_COLUMNS: &str = "id, user_id, wallet_address, kind, amount::TEXT AS amount, tx_hash, note, created_by, created_at";

pub async fn insert_entry<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    entry: &NewLedgerEntry<'_>,
) -> Result<LedgerEntry, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO zrm_ledger (id, user_id, wallet_address, kind, amount, tx_hash, note, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5::NUMERIC, $6, $7, $8, NOW())
        RETURNING {LEDGER_COLUMNS}
        "#
    );
    sqlx::query_as::<_, LedgerEntry>(&sql)
        .bind(id)
        .bind(entry.user_id)
        .bind(entry.wallet_address)
        .bind(entry.kind)
        .bind(entry.amount)
        .bind(entry.tx_hash)
        .bind(entry.note)
        .bind(entry.created_by)
        .fetch_one(executor)
        .await
}

pub async fn exists_by_hash(pool: &PgPool, tx_hash: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM zrm_ledger WHERE tx_hash = $1)")
        .bind(tx_hash)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Paginated ledger, optionally filtered by kind.
pub async fn list_entries(
    pool: &PgPool,
    kind: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {LEDGER_COLUMNS} FROM zrm_ledger
        WHERE ($1::TEXT IS NULL OR kind = $1)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    sqlx::query_as::<_, LedgerEntry>(&sql)
        .bind(kind)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_entries(pool: &PgPool, kind: Option<&str>) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM zrm_ledger WHERE ($1::TEXT IS NULL OR kind = $1)")
            .bind(kind)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    let sql = format!(
        "SELECT {LEDGER_COLUMNS} FROM zrm_ledger WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
    );
    sqlx::query_as::<_, LedgerEntry>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Net balance for a user in base units: credits minus withdrawals.
pub async fn balance_for_user(pool: &PgPool, user_id: Uuid) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(CASE WHEN kind = 'withdrawal' THEN -amount ELSE amount END), 0)::TEXT
        FROM zrm_ledger
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Totals per ledger kind.
pub async fn totals_by_kind(pool: &PgPool) -> Result<Vec<LedgerTotal>, sqlx::Error> {
    sqlx::query_as::<_, LedgerTotal>(
        r#"
        SELECT kind, COUNT(*) AS entries, COALESCE(SUM(amount), 0)::TEXT AS total
        FROM zrm_ledger
        GROUP BY kind
        ORDER BY kind
        "#,
    )
    .fetch_all(pool)
    .await
}
