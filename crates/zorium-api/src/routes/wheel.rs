//! Reward wheel routes. One spin per wallet per cooldown window; each win
//! is a `wheel` ledger credit.

use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    middleware,
    routing::{get, post},
};
use chrono::Utc;
use std::sync::Arc;
use zorium_common::{
    error::{ZoriumError, ZoriumResult},
    ids::generate_id,
    models::{
        notification::NOTIFY_REWARD,
        rewards::{LEDGER_WHEEL, NewLedgerEntry, SpinResult, WheelStatus},
    },
    validation::validate_address,
};
use zorium_db::repository::{ledger, notifications, users, wheel as spins};

use crate::{
    AppState,
    middleware::AuthContext,
    wheel::{can_spin, next_spin_at, pick_prize},
};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new().route("/wheel/{address}/status", get(status));

    let protected = Router::new()
        .route("/wheel/{address}/spin", post(spin))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

/// GET /api/v1/wheel/{address}/status
async fn status(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ZoriumResult<Json<WheelStatus>> {
    let address = validate_address(&address)?;
    let cooldown = zorium_common::config::get().rewards.wheel_cooldown_secs;
    let history = spins::history_for_wallet(&state.db.pg, &address).await?;
    let now = Utc::now();

    Ok(Json(WheelStatus {
        can_spin: can_spin(history.last_spin_at, cooldown, now),
        next_spin_at: next_spin_at(history.last_spin_at, cooldown).filter(|next| *next > now),
        last_spin_at: history.last_spin_at,
        total_spins: history.total_spins,
        total_won: super::format_zrm(&history.total_won),
        address,
    }))
}

/// POST /api/v1/wheel/{address}/spin
///
/// The wallet must be linked to the caller. The cooldown check, spin row
/// and ledger credit run under a per-wallet advisory lock so concurrent
/// spins cannot both pass the check.
async fn spin(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ZoriumResult<Json<SpinResult>> {
    let address = validate_address(&address)?;
    let cooldown = zorium_common::config::get().rewards.wheel_cooldown_secs;

    let user = users::find_by_id(&state.db.pg, auth.user_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;
    if user.wallet_address.as_deref() != Some(address.as_str()) {
        return Err(ZoriumError::Forbidden);
    }

    let mut tx = state.db.pg.begin().await?;
    spins::lock_wallet(&mut *tx, &address).await?;

    let history = spins::history_for_wallet(&mut *tx, &address).await?;
    let now = Utc::now();
    if !can_spin(history.last_spin_at, cooldown, now) {
        let next = next_spin_at(history.last_spin_at, cooldown).unwrap_or(now);
        return Err(ZoriumError::validation(format!(
            "Wheel is on cooldown until {}",
            next.to_rfc3339()
        )));
    }

    let prize = pick_prize(&mut rand::rng());
    let amount = super::to_base_units(&prize.amount.to_string())?;

    let spin = spins::create_spin(&mut *tx, generate_id(), user.id, &address, prize.label, &amount)
        .await?;
    ledger::insert_entry(
        &mut *tx,
        generate_id(),
        &NewLedgerEntry {
            user_id: Some(user.id),
            wallet_address: Some(&address),
            kind: LEDGER_WHEEL,
            amount: &amount,
            tx_hash: None,
            note: Some(prize.label),
            created_by: None,
        },
    )
    .await?;
    notifications::create_notification(
        &mut *tx,
        generate_id(),
        user.id,
        NOTIFY_REWARD,
        None,
        None,
        &format!("You won {} on the wheel", prize.label),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, wallet = %address, prize = prize.label, "Wheel spin");

    Ok(Json(SpinResult {
        amount_zrm: prize.amount.to_string(),
        next_spin_at: next_spin_at(Some(spin.created_at), cooldown).unwrap_or(spin.created_at),
        spin,
    }))
}
