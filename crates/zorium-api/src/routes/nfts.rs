//! NFT routes: browse, mint, edit, delete, view counter.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use zorium_common::{
    error::{ZoriumError, ZoriumResult},
    ids::generate_id,
    models::{
        nft::{CreateNftRequest, Nft, NftDetail, NftFilter, UpdateNftRequest},
        transaction::TX_MINT,
    },
    pagination::{Page, PageParams},
    validation::{validate_name, validate_request},
};
use zorium_db::repository::{collections, nfts, transactions};

use crate::{
    AppState,
    middleware::{AuthContext, MaybeAuth},
};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/nfts", get(list_nfts))
        .route("/nfts/{nft_id}", get(get_nft))
        .route("/nfts/{nft_id}/view", post(record_view))
        .route_layer(middleware::from_fn(
            crate::middleware::optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/nfts", post(create_nft))
        .route("/nfts/{nft_id}", axum::routing::patch(update_nft).delete(delete_nft))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

pub(crate) async fn require_nft(state: &AppState, nft_id: Uuid) -> ZoriumResult<Nft> {
    nfts::find_by_id(&state.db.pg, nft_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("NFT"))
}

/// GET /api/v1/nfts
async fn list_nfts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
    Query(filter): Query<NftFilter>,
) -> ZoriumResult<Json<Page<NftDetail>>> {
    let (limit, offset) = super::page_window(&params);
    let items = nfts::list_nfts(&state.db.pg, &filter, limit, offset).await?;
    let total = nfts::count_nfts(&state.db.pg, &filter).await?;
    Ok(Json(Page::new(items, &params, limit, total)))
}

/// GET /api/v1/nfts/{nft_id}
async fn get_nft(
    viewer: MaybeAuth,
    State(state): State<Arc<AppState>>,
    Path(nft_id): Path<Uuid>,
) -> ZoriumResult<Json<NftDetail>> {
    let detail = nfts::find_detail(&state.db.pg, nft_id, viewer.user_id())
        .await?
        .ok_or_else(|| ZoriumError::not_found("NFT"))?;
    Ok(Json(detail))
}

/// POST /api/v1/nfts
///
/// The caller becomes creator and owner; a `mint` transaction is recorded
/// alongside.
async fn create_nft(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateNftRequest>,
) -> ZoriumResult<Json<Nft>> {
    validate_request(&body)?;
    validate_name(&body.name)?;

    let price = body.price.as_deref().map(super::to_base_units).transpose()?;

    let token_ref = match (body.collection_id, body.token_id.as_deref()) {
        (Some(collection_id), token_id) => {
            collections::find_by_id(&state.db.pg, collection_id)
                .await?
                .ok_or_else(|| ZoriumError::not_found("Collection"))?;
            match token_id {
                Some(token_id) => Some(
                    collections::find_token(&state.db.pg, collection_id, token_id.trim())
                        .await?
                        .ok_or_else(|| ZoriumError::not_found("Token"))?
                        .id,
                ),
                None => None,
            }
        }
        (None, Some(_)) => {
            return Err(ZoriumError::validation(
                "token_id requires a collection_id",
            ));
        }
        (None, None) => None,
    };

    let new = nfts::NewNft {
        id: generate_id(),
        name: body.name.trim(),
        description: body.description.as_deref(),
        image_url: &body.image_url,
        metadata_url: body.metadata_url.as_deref(),
        price: price.as_deref(),
        is_listed: body.is_listed && price.is_some(),
        creator_id: auth.user_id,
        collection_id: body.collection_id,
        token_ref,
    };

    let mut tx = state.db.pg.begin().await?;
    let nft = nfts::create_nft(&mut *tx, &new).await?;
    transactions::create_transaction(
        &mut *tx,
        generate_id(),
        nft.id,
        None,
        Some(auth.user_id),
        TX_MINT,
        price.as_deref(),
        None,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(nft_id = %nft.id, creator = %auth.user_id, "NFT created");
    Ok(Json(nft))
}

/// PATCH /api/v1/nfts/{nft_id} (owner only)
async fn update_nft(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(nft_id): Path<Uuid>,
    Json(body): Json<UpdateNftRequest>,
) -> ZoriumResult<Json<Nft>> {
    validate_request(&body)?;
    if let Some(ref name) = body.name {
        validate_name(name)?;
    }

    let nft = require_nft(&state, nft_id).await?;
    if nft.owner_id != auth.user_id {
        return Err(ZoriumError::Forbidden);
    }

    let price = body.price.as_deref().map(super::to_base_units).transpose()?;
    if body.is_listed == Some(true) && price.is_none() && nft.price.is_none() {
        return Err(ZoriumError::validation("Set a price before listing"));
    }

    let updated = nfts::update_nft(
        &state.db.pg,
        nft_id,
        body.name.as_deref().map(str::trim),
        body.description.as_deref(),
        price.as_deref(),
        body.is_listed,
    )
    .await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/nfts/{nft_id} (owner or admin)
async fn delete_nft(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(nft_id): Path<Uuid>,
) -> ZoriumResult<StatusCode> {
    let nft = require_nft(&state, nft_id).await?;
    if nft.owner_id != auth.user_id && !auth.is_admin() {
        return Err(ZoriumError::Forbidden);
    }

    nfts::delete_nft(&state.db.pg, nft_id).await?;
    tracing::info!(nft_id = %nft_id, by = %auth.user_id, "NFT deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct ViewCount {
    id: Uuid,
    view_count: i64,
}

/// POST /api/v1/nfts/{nft_id}/view
async fn record_view(
    State(state): State<Arc<AppState>>,
    Path(nft_id): Path<Uuid>,
) -> ZoriumResult<Json<ViewCount>> {
    let view_count = nfts::increment_views(&state.db.pg, nft_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("NFT"))?;
    Ok(Json(ViewCount {
        id: nft_id,
        view_count,
    }))
}
