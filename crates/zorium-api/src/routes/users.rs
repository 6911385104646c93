//! User routes: profiles, owned NFTs, likes and ZRM balance.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    middleware,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use zorium_common::{
    error::{ZoriumError, ZoriumResult},
    models::{
        nft::{Nft, NftDetail, NftFilter, NftSort},
        rewards::ZrmBalance,
        user::{UpdateUserRequest, UserProfile, UserResponse},
    },
    pagination::{Page, PageParams},
    validation::{validate_address, validate_request},
};
use zorium_db::repository::{ledger, nfts, users};

use crate::{
    AppState,
    middleware::{AuthContext, MaybeAuth},
};

pub fn router() -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/users/@me", get(get_current_user).patch(update_current_user))
        .route("/users/@me/likes", get(my_likes))
        .route("/users/@me/zrm", get(my_zrm_balance))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    let public = Router::new()
        .route("/users/{user_id}", get(get_user))
        .route("/users/by-address/{address}", get(get_user_by_address))
        .route("/users/{user_id}/nfts", get(user_nfts))
        .route_layer(middleware::from_fn(
            crate::middleware::optional_auth_middleware,
        ));

    protected.merge(public)
}

/// GET /api/v1/users/@me
async fn get_current_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> ZoriumResult<Json<UserProfile>> {
    let user = users::find_by_id(&state.db.pg, auth.user_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;

    Ok(Json(users::profile(&state.db.pg, user, None).await?))
}

/// PATCH /api/v1/users/@me
async fn update_current_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateUserRequest>,
) -> ZoriumResult<Json<UserResponse>> {
    validate_request(&body)?;

    if let Some(ref new_username) = body.username {
        if let Some(existing) = users::find_by_username(&state.db.pg, new_username).await? {
            if existing.id != auth.user_id {
                return Err(ZoriumError::AlreadyExists {
                    resource: "Username".into(),
                });
            }
        }
    }

    let user = users::update_user(
        &state.db.pg,
        auth.user_id,
        body.username.as_deref(),
        body.display_name.as_deref(),
        body.bio.as_deref(),
        body.avatar_url.as_deref(),
        body.banner_url.as_deref(),
    )
    .await?;

    Ok(Json(user.into()))
}

/// GET /api/v1/users/{user_id}
async fn get_user(
    viewer: MaybeAuth,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ZoriumResult<Json<UserProfile>> {
    let user = users::find_by_id(&state.db.pg, user_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;

    Ok(Json(users::profile(&state.db.pg, user, viewer.user_id()).await?))
}

/// GET /api/v1/users/by-address/{address}
async fn get_user_by_address(
    viewer: MaybeAuth,
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ZoriumResult<Json<UserProfile>> {
    let address = validate_address(&address)?;
    let user = users::find_by_wallet(&state.db.pg, &address)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;

    Ok(Json(users::profile(&state.db.pg, user, viewer.user_id()).await?))
}

#[derive(Debug, Deserialize)]
struct UserNftsQuery {
    /// List NFTs the user created instead of the ones they own.
    #[serde(default)]
    created: bool,
    #[serde(default)]
    sort: NftSort,
}

/// GET /api/v1/users/{user_id}/nfts
async fn user_nfts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PageParams>,
    Query(query): Query<UserNftsQuery>,
) -> ZoriumResult<Json<Page<NftDetail>>> {
    let (limit, offset) = super::page_window(&params);
    let filter = if query.created {
        NftFilter {
            creator_id: Some(user_id),
            sort: query.sort,
            ..Default::default()
        }
    } else {
        NftFilter {
            owner_id: Some(user_id),
            sort: query.sort,
            ..Default::default()
        }
    };

    let items = nfts::list_nfts(&state.db.pg, &filter, limit, offset).await?;
    let total = nfts::count_nfts(&state.db.pg, &filter).await?;
    Ok(Json(Page::new(items, &params, limit, total)))
}

/// GET /api/v1/users/@me/likes
async fn my_likes(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> ZoriumResult<Json<Vec<Nft>>> {
    let (limit, offset) = super::page_window(&params);
    Ok(Json(
        nfts::liked_by_user(&state.db.pg, auth.user_id, limit, offset).await?,
    ))
}

/// GET /api/v1/users/@me/zrm
///
/// Balance is the sum of the caller's ledger entries.
async fn my_zrm_balance(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> ZoriumResult<Json<ZrmBalance>> {
    let balance = ledger::balance_for_user(&state.db.pg, auth.user_id).await?;
    let recent = ledger::list_for_user(&state.db.pg, auth.user_id, 20).await?;

    Ok(Json(ZrmBalance {
        user_id: auth.user_id,
        balance_zrm: super::format_zrm(&balance),
        balance,
        recent,
    }))
}
