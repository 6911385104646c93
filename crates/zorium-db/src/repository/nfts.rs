//! NFT repository: listings, detail views, ownership changes.

use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use zorium_common::models::nft::{Nft, NftDetail, NftFilter};

/// Column list for `Nft`; NUMERIC columns are cast to text.
pub(crate) const NFT_COLUMNS: &str = r#"
    n.id, n.name, n.description, n.image_url, n.metadata_url, n.price::TEXT AS price,
    n.is_listed, n.creator_id, n.owner_id, n.collection_id, n.token_ref, n.view_count,
    n.created_at, n.updated_at
"#;

const COUNTERS: &str = r#"
    (SELECT COUNT(*) FROM likes l WHERE l.nft_id = n.id) AS like_count,
    (SELECT COUNT(*) FROM comments c WHERE c.nft_id = n.id) AS comment_count
"#;

/// Fields for a new NFT row.
#[derive(Debug)]
pub struct NewNft<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub image_url: &'a str,
    pub metadata_url: Option<&'a str>,
    pub price: Option<&'a str>,
    pub is_listed: bool,
    pub creator_id: Uuid,
    pub collection_id: Option<Uuid>,
    pub token_ref: Option<Uuid>,
}

pub async fn create_nft<'e>(executor: impl PgExecutor<'e>, new: &NewNft<'_>) -> Result<Nft, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO nfts AS n (id, name, description, image_url, metadata_url, price, is_listed,
                               creator_id, owner_id, collection_id, token_ref, view_count, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6::NUMERIC, $7, $8, $8, $9, $10, 0, NOW(), NOW())
        RETURNING {NFT_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Nft>(&sql)
        .bind(new.id)
        .bind(new.name)
        .bind(new.description)
        .bind(new.image_url)
        .bind(new.metadata_url)
        .bind(new.price)
        .bind(new.is_listed)
        .bind(new.creator_id)
        .bind(new.collection_id)
        .bind(new.token_ref)
        .fetch_one(executor)
        .await
}

pub async fn find_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Nft>, sqlx::Error> {
    let sql = format!("SELECT {NFT_COLUMNS} FROM nfts n WHERE n.id = $1");
    sqlx::query_as::<_, Nft>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Fetch an NFT with like/comment counters and, when `viewer` is given,
/// whether that user has liked it.
pub async fn find_detail(
    pool: &PgPool,
    id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Option<NftDetail>, sqlx::Error> {
    let sql = format!("SELECT {NFT_COLUMNS}, {COUNTERS} FROM nfts n WHERE n.id = $1");
    let Some(mut detail) = sqlx::query_as::<_, NftDetail>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    if let Some(viewer) = viewer {
        let (liked,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = $1 AND nft_id = $2)")
                .bind(viewer)
                .bind(id)
                .fetch_one(pool)
                .await?;
        detail.liked_by_me = Some(liked);
    }

    Ok(Some(detail))
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &NftFilter) {
    qb.push(" WHERE TRUE");
    if let Some(collection_id) = filter.collection_id {
        qb.push(" AND n.collection_id = ").push_bind(collection_id);
    }
    if let Some(creator_id) = filter.creator_id {
        qb.push(" AND n.creator_id = ").push_bind(creator_id);
    }
    if let Some(owner_id) = filter.owner_id {
        qb.push(" AND n.owner_id = ").push_bind(owner_id);
    }
    if let Some(listed) = filter.listed {
        qb.push(" AND n.is_listed = ").push_bind(listed);
    }
}

/// Paginated, filtered NFT listing with counters.
pub async fn list_nfts(
    pool: &PgPool,
    filter: &NftFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<NftDetail>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {NFT_COLUMNS}, {COUNTERS} FROM nfts n"
    ));
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY ").push(filter.sort.order_by());
    qb.push(" LIMIT ").push_bind(limit);
    qb.push(" OFFSET ").push_bind(offset);

    qb.build_query_as::<NftDetail>().fetch_all(pool).await
}

pub async fn count_nfts(pool: &PgPool, filter: &NftFilter) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM nfts n");
    push_filters(&mut qb, filter);
    let (count,): (i64,) = qb.build_query_as().fetch_one(pool).await?;
    Ok(count)
}

/// Update mutable NFT fields. `price` is a base-unit decimal string.
pub async fn update_nft(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
    price: Option<&str>,
    is_listed: Option<bool>,
) -> Result<Nft, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE nfts AS n SET
            name = COALESCE($2, n.name),
            description = COALESCE($3, n.description),
            price = COALESCE($4::NUMERIC, n.price),
            is_listed = COALESCE($5, n.is_listed),
            updated_at = NOW()
        WHERE n.id = $1
        RETURNING {NFT_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Nft>(&sql)
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(is_listed)
        .fetch_one(pool)
        .await
}

/// Move ownership; a sale also delists the NFT.
pub async fn transfer_ownership<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    new_owner: Uuid,
    delist: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE nfts SET
            owner_id = $2,
            is_listed = CASE WHEN $3 THEN FALSE ELSE is_listed END,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(new_owner)
    .bind(delist)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete_nft(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM nfts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Bump the view counter, returning the new value.
pub async fn increment_views(pool: &PgPool, id: Uuid) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("UPDATE nfts SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}

/// NFTs the user has liked, most recent like first.
pub async fn liked_by_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Nft>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {NFT_COLUMNS} FROM nfts n
        INNER JOIN likes l ON l.nft_id = n.id
        WHERE l.user_id = $1
        ORDER BY l.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    sqlx::query_as::<_, Nft>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Case-insensitive name/description search.
pub async fn search(pool: &PgPool, pattern: &str, limit: i64) -> Result<Vec<Nft>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {NFT_COLUMNS} FROM nfts n
        WHERE n.name ILIKE $1 OR n.description ILIKE $1
        ORDER BY n.view_count DESC, n.created_at DESC
        LIMIT $2
        "#
    );
    sqlx::query_as::<_, Nft>(&sql)
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await
}
