//! Admin routes: ZRM treasury and ledger, collection sync, stats
//! snapshots, user roles. Every route requires the admin role.

use alloy::primitives::{Address, B256};
use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    middleware,
    routing::{get, patch, post},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use zorium_chain::{ChainError, ledger::verify_transfer, ledger::treasury_snapshot, parse_configured, zrm};
use zorium_common::{
    error::{ZoriumError, ZoriumResult},
    ids::generate_id,
    models::{
        collection::SyncReport,
        notification::NOTIFY_REWARD,
        rewards::{
            AllocateRequest, EarlyBirdReward, LEDGER_ALLOCATION, LEDGER_DEPOSIT, LEDGER_KINDS,
            LedgerEntry, LedgerFilter, NewLedgerEntry, TreasuryOverview, VerifyTransactionRequest,
        },
        stats::PlatformStats,
        user::{ROLE_ADMIN, ROLE_USER, UpdateRoleRequest, UserResponse},
    },
    pagination::{Page, PageParams},
    validation::{validate_address, validate_tx_hash},
};
use zorium_db::postgres::is_unique_violation;
use zorium_db::repository::{early_bird, ledger, notifications, stats, users};

use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/zrm/treasury", get(treasury))
        .route("/admin/zrm/verify-transaction", post(verify_transaction))
        .route("/admin/zrm/allocate", post(allocate))
        .route("/admin/zrm/ledger", get(list_ledger))
        .route("/admin/collections/sync", post(sync_collections))
        .route("/admin/stats/snapshot", post(snapshot_stats))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{user_id}/role", patch(update_role))
        .route("/admin/early-bird", get(list_early_bird))
        .route_layer(middleware::from_fn(crate::middleware::require_admin))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// Configured contract/wallet addresses the ledger routes depend on.
struct RewardAddresses {
    token: Option<Address>,
    treasury: Option<Address>,
    allocation: Option<Address>,
}

impl RewardAddresses {
    fn from_config() -> ZoriumResult<Self> {
        let chain = &zorium_common::config::get().chain;
        Ok(Self {
            token: parse_configured(chain.zrm_token_address.as_deref(), "chain.zrm_token_address")?,
            treasury: parse_configured(chain.treasury_address.as_deref(), "chain.treasury_address")?,
            allocation: parse_configured(
                chain.allocation_address.as_deref(),
                "chain.allocation_address",
            )?,
        })
    }
}

fn hex_address(address: Option<Address>) -> Option<String> {
    address.map(|a| format!("{a:#x}"))
}

/// GET /api/v1/admin/zrm/treasury
async fn treasury(State(state): State<Arc<AppState>>) -> ZoriumResult<Json<TreasuryOverview>> {
    let addresses = RewardAddresses::from_config()?;
    let decimals = zorium_common::config::get().chain.zrm_decimals;

    let (treasury_balance, allocation_balance, block_number) =
        match (addresses.token, addresses.treasury, addresses.allocation) {
            (Some(_), Some(treasury), Some(allocation)) => {
                let snap = treasury_snapshot(state.chain.as_ref(), treasury, allocation).await?;
                (
                    Some(zrm::format_amount(snap.treasury_balance, decimals)),
                    Some(zrm::format_amount(snap.allocation_balance, decimals)),
                    snap.block_number,
                )
            }
            _ => (None, None, state.chain.block_number().await?),
        };

    let ledger = ledger::totals_by_kind(&state.db.pg).await?;

    Ok(Json(TreasuryOverview {
        token_address: hex_address(addresses.token),
        treasury_address: hex_address(addresses.treasury),
        treasury_balance,
        allocation_address: hex_address(addresses.allocation),
        allocation_balance,
        block_number,
        ledger,
    }))
}

fn duplicate_hash() -> ZoriumError {
    ZoriumError::AlreadyExists {
        resource: "Ledger transaction".into(),
    }
}

/// POST /api/v1/admin/zrm/verify-transaction
///
/// Confirms an on-chain ZRM transfer into the treasury (`deposit`) or the
/// allocation wallet (`allocation`) and records it. A tx hash is accepted
/// once.
async fn verify_transaction(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyTransactionRequest>,
) -> ZoriumResult<Json<LedgerEntry>> {
    let tx_hash = validate_tx_hash(&body.tx_hash)?;
    let from_address = validate_address(&body.from_address)?;
    let amount = super::positive_base_units(&body.amount)?;

    let addresses = RewardAddresses::from_config()?;
    let destination = match body.kind.as_str() {
        LEDGER_DEPOSIT => addresses.treasury.ok_or(ChainError::NotConfigured("chain.treasury_address")),
        LEDGER_ALLOCATION => addresses
            .allocation
            .ok_or(ChainError::NotConfigured("chain.allocation_address")),
        other => {
            return Err(ZoriumError::validation(format!(
                "Unknown kind '{other}'; expected 'deposit' or 'allocation'"
            )));
        }
    }?;
    let token = addresses
        .token
        .ok_or(ChainError::NotConfigured("chain.zrm_token_address"))?;

    if ledger::exists_by_hash(&state.db.pg, &tx_hash).await? {
        return Err(duplicate_hash());
    }

    if let Some(user_id) = body.user_id {
        users::find_by_id(&state.db.pg, user_id)
            .await?
            .ok_or_else(|| ZoriumError::not_found("User"))?;
    }

    let hash = tx_hash
        .parse::<B256>()
        .map_err(|_| ZoriumError::validation("Invalid transaction hash"))?;
    let from = from_address
        .parse::<Address>()
        .map_err(|_| ZoriumError::validation("Invalid sender address"))?;
    let expected = zrm::parse_base_units(&amount)?;

    let receipt = state.chain.transaction_receipt(hash).await?;
    let verified = verify_transfer(&receipt, token, from, destination, expected)?;

    let mut tx = state.db.pg.begin().await?;
    let entry = ledger::insert_entry(
        &mut *tx,
        generate_id(),
        &NewLedgerEntry {
            user_id: body.user_id,
            wallet_address: Some(&from_address),
            kind: &body.kind,
            amount: &amount,
            tx_hash: Some(&tx_hash),
            note: body.note.as_deref(),
            created_by: Some(auth.user_id),
        },
    )
    .await
    .map_err(|e| if is_unique_violation(&e) { duplicate_hash() } else { e.into() })?;

    if let Some(user_id) = body.user_id {
        notifications::create_notification(
            &mut *tx,
            generate_id(),
            user_id,
            NOTIFY_REWARD,
            Some(auth.user_id),
            None,
            &format!("{} ZRM was credited to your balance", super::format_zrm(&amount)),
        )
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        tx_hash = %tx_hash,
        kind = %entry.kind,
        amount = %amount,
        block = ?verified.block_number,
        admin = %auth.user_id,
        "On-chain ZRM transfer recorded"
    );
    Ok(Json(entry))
}

/// POST /api/v1/admin/zrm/allocate
///
/// Off-chain allocation credit; no transaction hash.
async fn allocate(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<AllocateRequest>,
) -> ZoriumResult<Json<LedgerEntry>> {
    let amount = super::positive_base_units(&body.amount)?;
    let user = users::find_by_id(&state.db.pg, body.user_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;

    let mut tx = state.db.pg.begin().await?;
    let entry = ledger::insert_entry(
        &mut *tx,
        generate_id(),
        &NewLedgerEntry {
            user_id: Some(user.id),
            wallet_address: user.wallet_address.as_deref(),
            kind: LEDGER_ALLOCATION,
            amount: &amount,
            tx_hash: None,
            note: body.note.as_deref(),
            created_by: Some(auth.user_id),
        },
    )
    .await?;
    notifications::create_notification(
        &mut *tx,
        generate_id(),
        user.id,
        NOTIFY_REWARD,
        Some(auth.user_id),
        None,
        &format!("You received a {} ZRM allocation", super::format_zrm(&amount)),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, amount = %amount, admin = %auth.user_id, "ZRM allocated");
    Ok(Json(entry))
}

/// GET /api/v1/admin/zrm/ledger
async fn list_ledger(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
    Query(filter): Query<LedgerFilter>,
) -> ZoriumResult<Json<Page<LedgerEntry>>> {
    let kind = filter.kind.as_deref().filter(|k| !k.is_empty());
    if let Some(kind) = kind {
        if !LEDGER_KINDS.contains(&kind) {
            return Err(ZoriumError::validation(format!("Unknown ledger kind '{kind}'")));
        }
    }

    let (limit, offset) = super::page_window(&params);
    let items = ledger::list_entries(&state.db.pg, kind, limit, offset).await?;
    let total = ledger::count_entries(&state.db.pg, kind).await?;
    Ok(Json(Page::new(items, &params, limit, total)))
}

/// POST /api/v1/admin/collections/sync
async fn sync_collections(State(state): State<Arc<AppState>>) -> ZoriumResult<Json<SyncReport>> {
    let chain_id = zorium_common::config::get().chain.chain_id as i64;
    let report = crate::sync::sync_collections(&state.db, state.chain.as_ref(), chain_id).await?;
    Ok(Json(report))
}

/// POST /api/v1/admin/stats/snapshot
///
/// Upserts today's row, so repeated calls on the same day refresh it.
async fn snapshot_stats(State(state): State<Arc<AppState>>) -> ZoriumResult<Json<PlatformStats>> {
    let totals = stats::totals(&state.db.pg).await?;
    let today = Utc::now().date_naive();
    Ok(Json(
        stats::upsert_snapshot(&state.db.pg, generate_id(), today, &totals).await?,
    ))
}

/// GET /api/v1/admin/users
async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> ZoriumResult<Json<Page<UserResponse>>> {
    let (limit, offset) = super::page_window(&params);
    let items = users::list_users(&state.db.pg, limit, offset)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = users::count_users(&state.db.pg).await?;
    Ok(Json(Page::new(items, &params, limit, total)))
}

/// PATCH /api/v1/admin/users/{user_id}/role
async fn update_role(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateRoleRequest>,
) -> ZoriumResult<Json<UserResponse>> {
    let role = body.role.trim();
    if role != ROLE_USER && role != ROLE_ADMIN {
        return Err(ZoriumError::validation("Role must be 'user' or 'admin'"));
    }
    if user_id == auth.user_id && role != ROLE_ADMIN {
        return Err(ZoriumError::validation("Admins cannot demote themselves"));
    }

    let user = users::set_role(&state.db.pg, user_id, role)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;

    tracing::info!(user_id = %user.id, role, admin = %auth.user_id, "Role changed");
    Ok(Json(user.into()))
}

/// GET /api/v1/admin/early-bird
async fn list_early_bird(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> ZoriumResult<Json<Vec<EarlyBirdReward>>> {
    let (limit, offset) = super::page_window(&params);
    Ok(Json(early_bird::list_rewards(&state.db.pg, limit, offset).await?))
}
