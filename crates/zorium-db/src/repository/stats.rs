//! Analytics aggregation and daily platform snapshots.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use zorium_common::models::stats::{PlatformStats, PlatformTotals, TopCreator, TopNft};

const STATS_COLUMNS: &str = r#"
    id, snapshot_date, total_users, total_nfts, total_collections, total_transactions,
    total_volume::TEXT AS total_volume, total_zrm_distributed::TEXT AS total_zrm_distributed, created_at
"#;

/// Live platform totals. Volume counts sales only; ZRM distributed counts
/// every credit kind except deposits.
pub async fn totals(pool: &PgPool) -> Result<PlatformTotals, sqlx::Error> {
    sqlx::query_as::<_, PlatformTotals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) AS total_users,
            (SELECT COUNT(*) FROM nfts) AS total_nfts,
            (SELECT COUNT(*) FROM collections) AS total_collections,
            (SELECT COUNT(*) FROM transactions) AS total_transactions,
            (SELECT COUNT(*) FROM likes) AS total_likes,
            (SELECT COUNT(*) FROM comments) AS total_comments,
            (SELECT COALESCE(SUM(price), 0) FROM transactions WHERE kind = 'sale')::TEXT AS total_volume,
            (SELECT COALESCE(SUM(amount), 0) FROM zrm_ledger
                WHERE kind IN ('early_bird', 'wheel', 'allocation'))::TEXT AS total_zrm_distributed
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn top_nfts(pool: &PgPool, limit: i64) -> Result<Vec<TopNft>, sqlx::Error> {
    sqlx::query_as::<_, TopNft>(
        r#"
        SELECT n.id, n.name, n.image_url, COUNT(l.user_id) AS like_count, n.view_count
        FROM nfts n
        LEFT JOIN likes l ON l.nft_id = n.id
        GROUP BY n.id
        ORDER BY like_count DESC, n.view_count DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn top_creators(pool: &PgPool, limit: i64) -> Result<Vec<TopCreator>, sqlx::Error> {
    sqlx::query_as::<_, TopCreator>(
        r#"
        SELECT u.id, u.username, u.avatar_url,
               (SELECT COUNT(*) FROM nfts n WHERE n.creator_id = u.id) AS nfts_created,
               (SELECT COUNT(*) FROM follows f WHERE f.followed_id = u.id) AS followers
        FROM users u
        ORDER BY nfts_created DESC, followers DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Store (or overwrite) the snapshot for `date`.
pub async fn upsert_snapshot(
    pool: &PgPool,
    id: Uuid,
    date: NaiveDate,
    totals: &PlatformTotals,
) -> Result<PlatformStats, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO platform_stats (id, snapshot_date, total_users, total_nfts, total_collections,
                                    total_transactions, total_volume, total_zrm_distributed, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7::NUMERIC, $8::NUMERIC, NOW())
        ON CONFLICT (snapshot_date) DO UPDATE SET
            total_users = EXCLUDED.total_users,
            total_nfts = EXCLUDED.total_nfts,
            total_collections = EXCLUDED.total_collections,
            total_transactions = EXCLUDED.total_transactions,
            total_volume = EXCLUDED.total_volume,
            total_zrm_distributed = EXCLUDED.total_zrm_distributed
        RETURNING {STATS_COLUMNS}
        "#
    );
    sqlx::query_as::<_, PlatformStats>(&sql)
        .bind(id)
        .bind(date)
        .bind(totals.total_users)
        .bind(totals.total_nfts)
        .bind(totals.total_collections)
        .bind(totals.total_transactions)
        .bind(&totals.total_volume)
        .bind(&totals.total_zrm_distributed)
        .fetch_one(pool)
        .await
}

/// Most recent snapshots, newest first.
pub async fn history(pool: &PgPool, limit: i64) -> Result<Vec<PlatformStats>, sqlx::Error> {
    let sql = format!("SELECT {STATS_COLUMNS} FROM platform_stats ORDER BY snapshot_date DESC LIMIT $1");
    sqlx::query_as::<_, PlatformStats>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await
}
