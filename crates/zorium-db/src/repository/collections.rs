//! Collection repository: ERC-1155 contracts and their synced tokens.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;
use zorium_common::models::collection::Collection;
use zorium_common::models::nft::NftToken;

const TOKEN_COLUMNS: &str =
    "id, collection_id, token_id, metadata_uri, total_supply::TEXT AS total_supply, synced_at";

/// Register a collection by hand (not via factory sync). Starts unverified;
/// only a factory sync marks it verified.
pub async fn create_collection<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    contract_address: &str,
    name: &str,
    symbol: Option<&str>,
    description: Option<&str>,
    image_url: Option<&str>,
    creator_id: Option<Uuid>,
    chain_id: i64,
    token_count: i64,
) -> Result<Collection, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        r#"
        INSERT INTO collections (id, contract_address, name, symbol, description, image_url,
                                 creator_id, chain_id, token_count, is_verified, last_synced_at,
                                 created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, NOW(), NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(contract_address)
    .bind(name)
    .bind(symbol)
    .bind(description)
    .bind(image_url)
    .bind(creator_id)
    .bind(chain_id)
    .bind(token_count)
    .fetch_one(executor)
    .await
}

/// Insert or refresh a collection discovered on-chain. Hand-entered
/// description and image are preserved; the creator is only filled in when
/// still unknown.
pub async fn upsert_synced<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    contract_address: &str,
    name: &str,
    symbol: Option<&str>,
    creator_id: Option<Uuid>,
    chain_id: i64,
    token_count: i64,
) -> Result<Collection, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        r#"
        INSERT INTO collections (id, contract_address, name, symbol, creator_id, chain_id,
                                 token_count, is_verified, last_synced_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, NOW(), NOW(), NOW())
        ON CONFLICT (contract_address) DO UPDATE SET
            name = EXCLUDED.name,
            symbol = EXCLUDED.symbol,
            creator_id = COALESCE(collections.creator_id, EXCLUDED.creator_id),
            chain_id = EXCLUDED.chain_id,
            token_count = EXCLUDED.token_count,
            is_verified = TRUE,
            last_synced_at = NOW(),
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(contract_address)
    .bind(name)
    .bind(symbol)
    .bind(creator_id)
    .bind(chain_id)
    .bind(token_count)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_address(
    pool: &PgPool,
    contract_address: &str,
) -> Result<Option<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE contract_address = LOWER($1)")
        .bind(contract_address)
        .fetch_optional(pool)
        .await
}

pub async fn list_collections(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        "SELECT * FROM collections ORDER BY is_verified DESC, created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_collections(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM collections")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn search(pool: &PgPool, pattern: &str, limit: i64) -> Result<Vec<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        r#"
        SELECT * FROM collections
        WHERE name ILIKE $1 OR symbol ILIKE $1 OR contract_address ILIKE $1
        ORDER BY is_verified DESC, token_count DESC
        LIMIT $2
        "#,
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Insert or refresh one on-chain token. `total_supply` is a decimal string.
pub async fn upsert_token<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    collection_id: Uuid,
    token_id: &str,
    metadata_uri: Option<&str>,
    total_supply: &str,
) -> Result<NftToken, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO nft_tokens (id, collection_id, token_id, metadata_uri, total_supply, synced_at)
        VALUES ($1, $2, $3, $4, $5::NUMERIC, NOW())
        ON CONFLICT (collection_id, token_id) DO UPDATE SET
            metadata_uri = EXCLUDED.metadata_uri,
            total_supply = EXCLUDED.total_supply,
            synced_at = NOW()
        RETURNING {TOKEN_COLUMNS}
        "#
    );
    sqlx::query_as::<_, NftToken>(&sql)
        .bind(id)
        .bind(collection_id)
        .bind(token_id)
        .bind(metadata_uri)
        .bind(total_supply)
        .fetch_one(executor)
        .await
}

pub async fn find_token(
    pool: &PgPool,
    collection_id: Uuid,
    token_id: &str,
) -> Result<Option<NftToken>, sqlx::Error> {
    let sql = format!("SELECT {TOKEN_COLUMNS} FROM nft_tokens WHERE collection_id = $1 AND token_id = $2");
    sqlx::query_as::<_, NftToken>(&sql)
        .bind(collection_id)
        .bind(token_id)
        .fetch_optional(pool)
        .await
}

/// Tokens of a collection in numeric token-id order.
pub async fn list_tokens(
    pool: &PgPool,
    collection_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<NftToken>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {TOKEN_COLUMNS} FROM nft_tokens
        WHERE collection_id = $1
        ORDER BY token_id::NUMERIC ASC
        LIMIT $2 OFFSET $3
        "#
    );
    sqlx::query_as::<_, NftToken>(&sql)
        .bind(collection_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}
