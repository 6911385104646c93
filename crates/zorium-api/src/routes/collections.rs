//! Collection routes: browse and register on-chain collections.

use alloy::primitives::Address;
use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use uuid::Uuid;
use zorium_common::{
    error::{ZoriumError, ZoriumResult},
    ids::generate_id,
    models::{
        collection::{Collection, CreateCollectionRequest},
        nft::{NftDetail, NftFilter, NftSort, NftToken},
    },
    pagination::{Page, PageParams},
    validation::{validate_address, validate_request},
};
use zorium_db::postgres::is_unique_violation;
use zorium_db::repository::{collections, nfts, users};

use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/collections", get(list_collections))
        .route("/collections/{collection_id}", get(get_collection))
        .route("/collections/{collection_id}/tokens", get(list_tokens))
        .route("/collections/{collection_id}/nfts", get(list_collection_nfts));

    let protected = Router::new()
        .route("/collections", post(register_collection))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

async fn require_collection(state: &AppState, id: Uuid) -> ZoriumResult<Collection> {
    collections::find_by_id(&state.db.pg, id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("Collection"))
}

/// GET /api/v1/collections
async fn list_collections(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> ZoriumResult<Json<Page<Collection>>> {
    let (limit, offset) = super::page_window(&params);
    let items = collections::list_collections(&state.db.pg, limit, offset).await?;
    let total = collections::count_collections(&state.db.pg).await?;
    Ok(Json(Page::new(items, &params, limit, total)))
}

/// GET /api/v1/collections/{collection_id}
async fn get_collection(
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<Uuid>,
) -> ZoriumResult<Json<Collection>> {
    Ok(Json(require_collection(&state, collection_id).await?))
}

/// GET /api/v1/collections/{collection_id}/tokens
async fn list_tokens(
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ZoriumResult<Json<Page<NftToken>>> {
    let collection = require_collection(&state, collection_id).await?;
    let (limit, offset) = super::page_window(&params);
    let items = collections::list_tokens(&state.db.pg, collection_id, limit, offset).await?;
    Ok(Json(Page::new(items, &params, limit, collection.token_count)))
}

/// GET /api/v1/collections/{collection_id}/nfts
async fn list_collection_nfts(
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<Uuid>,
    Query(params): Query<PageParams>,
    Query(sort): Query<SortQuery>,
) -> ZoriumResult<Json<Page<NftDetail>>> {
    require_collection(&state, collection_id).await?;
    let (limit, offset) = super::page_window(&params);
    let filter = NftFilter {
        collection_id: Some(collection_id),
        sort: sort.sort,
        ..Default::default()
    };
    let items = nfts::list_nfts(&state.db.pg, &filter, limit, offset).await?;
    let total = nfts::count_nfts(&state.db.pg, &filter).await?;
    Ok(Json(Page::new(items, &params, limit, total)))
}

#[derive(Debug, serde::Deserialize)]
struct SortQuery {
    #[serde(default)]
    sort: NftSort,
}

/// Only the wallet that owns the contract on-chain may register it.
fn ensure_contract_owner(wallet: Option<&str>, owner: Option<Address>) -> ZoriumResult<()> {
    let (Some(wallet), Some(owner)) = (wallet, owner) else {
        return Err(ZoriumError::Forbidden);
    };
    match wallet.parse::<Address>() {
        Ok(linked) if linked == owner => Ok(()),
        _ => Err(ZoriumError::Forbidden),
    }
}

/// POST /api/v1/collections
///
/// Registers a deployed contract owned by the caller's linked wallet. Name,
/// symbol and tokens are read from the chain and stored in one transaction.
async fn register_collection(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCollectionRequest>,
) -> ZoriumResult<Json<Collection>> {
    validate_request(&body)?;
    let address = validate_address(&body.contract_address)?;

    if collections::find_by_address(&state.db.pg, &address)
        .await?
        .is_some()
    {
        return Err(ZoriumError::AlreadyExists {
            resource: "Collection".into(),
        });
    }

    let parsed = address
        .parse::<Address>()
        .map_err(|_| ZoriumError::validation("Invalid contract address"))?;
    let info = state.chain.collection_info(parsed).await?;

    let caller = users::find_by_id(&state.db.pg, auth.user_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;
    ensure_contract_owner(caller.wallet_address.as_deref(), info.owner)?;

    let chain_id = zorium_common::config::get().chain.chain_id as i64;
    let mut tx = state.db.pg.begin().await?;

    let collection = collections::create_collection(
        &mut *tx,
        generate_id(),
        &address,
        &info.name,
        info.symbol.as_deref(),
        body.description.as_deref(),
        body.image_url.as_deref(),
        Some(caller.id),
        chain_id,
        info.tokens.len() as i64,
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ZoriumError::AlreadyExists {
                resource: "Collection".into(),
            }
        } else {
            e.into()
        }
    })?;

    for token in &info.tokens {
        collections::upsert_token(
            &mut *tx,
            generate_id(),
            collection.id,
            &token.token_id.to_string(),
            token.uri.as_deref(),
            &token.total_supply.to_string(),
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        collection_id = %collection.id,
        contract = %address,
        tokens = info.tokens.len(),
        "Collection registered"
    );
    Ok(Json(collection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const OWNER: &str = "0x00000000000000000000000000000000000000ab";

    #[test]
    fn owner_wallet_may_register() {
        let owner: Address = OWNER.parse().unwrap();
        assert!(ensure_contract_owner(Some(OWNER), Some(owner)).is_ok());
        assert!(
            ensure_contract_owner(Some("0x00000000000000000000000000000000000000AB"), Some(owner))
                .is_ok()
        );
    }

    #[test]
    fn other_wallets_and_walletless_users_are_forbidden() {
        let owner: Address = OWNER.parse().unwrap();
        let other = "0x00000000000000000000000000000000000000cd";

        for result in [
            ensure_contract_owner(Some(other), Some(owner)),
            ensure_contract_owner(None, Some(owner)),
            ensure_contract_owner(Some(OWNER), None),
        ] {
            assert_eq!(result.unwrap_err().status_code(), StatusCode::FORBIDDEN);
        }
    }
}
