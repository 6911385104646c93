//! Marketplace transaction routes: record sales and transfers, list history.

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
        notification::NOTIFY_SALE,
        transaction::{CreateTransactionRequest, TX_SALE, TX_TRANSFER, Transaction},
    },
    pagination::PageParams,
    validation::validate_tx_hash,
};
use zorium_db::postgres::is_unique_violation;
use zorium_db::repository::{notifications, nfts, transactions, users};

use super::nfts::require_nft;
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/nfts/{nft_id}/transactions", get(nft_history))
        .route("/users/{user_id}/transactions", get(user_history));

    let protected = Router::new()
        .route("/transactions", post(record_transaction))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

fn duplicate_hash() -> ZoriumError {
    ZoriumError::AlreadyExists {
        resource: "Transaction hash".into(),
    }
}

/// POST /api/v1/transactions
///
/// `sale`: the caller buys a listed NFT from its owner. `transfer`: the
/// owner hands the NFT to `to_user_id`. Ownership moves and the NFT is
/// delisted in the same database transaction as the history row.
async fn record_transaction(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTransactionRequest>,
) -> ZoriumResult<Json<Transaction>> {
    let nft = require_nft(&state, body.nft_id).await?;

    let tx_hash = body.tx_hash.as_deref().map(validate_tx_hash).transpose()?;
    if let Some(ref hash) = tx_hash {
        if transactions::exists_by_hash(&state.db.pg, hash).await? {
            return Err(duplicate_hash());
        }
    }

    let (from, to, price) = match body.kind.as_str() {
        TX_SALE => {
            if nft.owner_id == auth.user_id {
                return Err(ZoriumError::validation("You already own this NFT"));
            }
            if !nft.is_listed {
                return Err(ZoriumError::validation("NFT is not listed for sale"));
            }
            let price = match body.price.as_deref() {
                Some(p) => Some(super::to_base_units(p)?),
                None => nft.price.clone(),
            };
            if price.is_none() {
                return Err(ZoriumError::validation("A sale needs a price"));
            }
            (nft.owner_id, auth.user_id, price)
        }
        TX_TRANSFER => {
            if nft.owner_id != auth.user_id {
                return Err(ZoriumError::Forbidden);
            }
            let to = body
                .to_user_id
                .ok_or_else(|| ZoriumError::validation("to_user_id is required for transfers"))?;
            if to == auth.user_id {
                return Err(ZoriumError::validation("Cannot transfer to yourself"));
            }
            users::find_by_id(&state.db.pg, to)
                .await?
                .ok_or_else(|| ZoriumError::not_found("Recipient"))?;
            (auth.user_id, to, None)
        }
        other => {
            return Err(ZoriumError::validation(format!(
                "Unknown transaction kind '{other}'; expected 'sale' or 'transfer'"
            )));
        }
    };

    let mut tx = state.db.pg.begin().await?;
    let record = transactions::create_transaction(
        &mut *tx,
        generate_id(),
        nft.id,
        Some(from),
        Some(to),
        &body.kind,
        price.as_deref(),
        tx_hash.as_deref(),
    )
    .await
    .map_err(|e| if is_unique_violation(&e) { duplicate_hash() } else { e.into() })?;
    nfts::transfer_ownership(&mut *tx, nft.id, to, true).await?;

    if record.kind == TX_SALE {
        notifications::create_notification(
            &mut *tx,
            generate_id(),
            from,
            NOTIFY_SALE,
            Some(auth.user_id),
            Some(nft.id),
            &format!("{} bought {}", auth.username, nft.name),
        )
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        nft_id = %nft.id,
        kind = %record.kind,
        from = %from,
        to = %to,
        "Ownership moved"
    );
    Ok(Json(record))
}

/// GET /api/v1/nfts/{nft_id}/transactions
async fn nft_history(
    State(state): State<Arc<AppState>>,
    Path(nft_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ZoriumResult<Json<Vec<Transaction>>> {
    require_nft(&state, nft_id).await?;
    let (limit, offset) = super::page_window(&params);
    Ok(Json(
        transactions::list_for_nft(&state.db.pg, nft_id, limit, offset).await?,
    ))
}

/// GET /api/v1/users/{user_id}/transactions
async fn user_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ZoriumResult<Json<Vec<Transaction>>> {
    let (limit, offset) = super::page_window(&params);
    Ok(Json(
        transactions::list_for_user(&state.db.pg, user_id, limit, offset).await?,
    ))
}
