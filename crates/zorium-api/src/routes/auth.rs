//! Authentication routes: password accounts, wallet sign-in, email
//! verification and password reset.

use alloy::primitives::Address;
use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use zorium_chain::{NonceChallenge, wallet};
use zorium_common::{
    auth::{REFRESH_TOKEN, validate_token},
    error::{ZoriumError, ZoriumResult},
    ids::generate_id,
    models::{
        email_token::{
            ForgotPasswordRequest, PURPOSE_RESET_PASSWORD, PURPOSE_VERIFY_EMAIL,
            ResetPasswordRequest, VerifyEmailRequest,
        },
        notification::NOTIFY_REWARD,
        rewards::{EarlyBirdReward, LEDGER_EARLY_BIRD, NewLedgerEntry},
        user::{CreateUserRequest, LoginRequest, RefreshRequest, User, UserResponse, WalletAuthRequest},
    },
    validation::{validate_address, validate_request},
};
use zorium_db::Database;
use zorium_db::postgres::is_unique_violation;
use zorium_db::repository::{early_bird, email_tokens, ledger, notifications, users};

use crate::{
    AppState,
    auth::{self, TokenPair},
    middleware::AuthContext,
};

/// Auth router.
pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/nonce/{address}", get(issue_nonce))
        .route("/auth/wallet", post(wallet_login))
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password));

    let protected = Router::new()
        .route("/auth/wallet/link", post(link_wallet))
        .route("/auth/resend-verification", post(resend_verification))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

#[derive(Serialize)]
struct AuthResponse {
    user: UserResponse,
    #[serde(flatten)]
    tokens: TokenPair,
    #[serde(skip_serializing_if = "Option::is_none")]
    early_bird: Option<EarlyBirdReward>,
}

fn internal(e: impl std::fmt::Display) -> ZoriumError {
    ZoriumError::Internal(anyhow::anyhow!("{e}"))
}

fn hash_email_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.trim().as_bytes()))
}

/// Username for a new wallet-only account: `0x1234...abcd`, then
/// `0x1234...abcd-2`, `-3` and so on when taken.
pub(crate) fn wallet_username(address: &str, attempt: u32) -> String {
    let base = format!("{}...{}", &address[..6], &address[address.len() - 4..]);
    if attempt <= 1 {
        base
    } else {
        format!("{base}-{attempt}")
    }
}

/// Credit the Early Bird bonus while fewer than `rewards.early_bird_limit`
/// rewards exist. Grants are serialized by an advisory lock, and the reward
/// row, ledger credit and notification land in one transaction.
pub(crate) async fn grant_early_bird(
    db: &Database,
    user: &User,
) -> ZoriumResult<Option<EarlyBirdReward>> {
    let config = zorium_common::config::get();
    let amount = super::to_base_units(&config.rewards.early_bird_amount)?;

    let mut tx = db.pg.begin().await?;
    early_bird::lock_grants(&mut *tx).await?;
    let position = early_bird::next_position(&mut *tx).await?;
    if position > config.rewards.early_bird_limit {
        return Ok(None);
    }

    let Some(reward) =
        early_bird::create_reward(&mut *tx, generate_id(), user.id, position, &amount).await?
    else {
        return Ok(None);
    };

    ledger::insert_entry(
        &mut *tx,
        generate_id(),
        &NewLedgerEntry {
            user_id: Some(user.id),
            wallet_address: user.wallet_address.as_deref(),
            kind: LEDGER_EARLY_BIRD,
            amount: &amount,
            tx_hash: None,
            note: Some("Early Bird reward"),
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
        &format!(
            "You are Early Bird #{position}! {} ZRM has been added to your balance.",
            config.rewards.early_bird_amount
        ),
    )
    .await?;

    tx.commit().await?;
    tracing::info!(user_id = %user.id, position, "Early Bird reward granted");
    Ok(Some(reward))
}

/// Early Bird failures never block account creation.
async fn try_grant_early_bird(db: &Database, user: &User) -> Option<EarlyBirdReward> {
    match grant_early_bird(db, user).await {
        Ok(reward) => reward,
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Early Bird grant failed");
            None
        }
    }
}

/// Store a fresh single-use token and return the raw value for the email link.
async fn issue_email_token(db: &Database, user_id: uuid::Uuid, purpose: &str) -> ZoriumResult<String> {
    let ttl = zorium_common::config::get().auth.email_token_ttl_secs;
    let raw = hex::encode(rand::random::<[u8; 32]>());
    email_tokens::create_token(
        &db.pg,
        generate_id(),
        user_id,
        &hash_email_token(&raw),
        purpose,
        Utc::now() + zorium_common::config::duration_secs(ttl),
    )
    .await?;
    Ok(raw)
}

async fn send_verification(state: &AppState, user: &User) -> ZoriumResult<()> {
    let Some(email) = user.email.clone() else {
        return Ok(());
    };
    let token = issue_email_token(&state.db, user.id, PURPOSE_VERIFY_EMAIL).await?;
    let content = state.email.verification(&user.username, &token);
    state.email.send_in_background(email, content);
    Ok(())
}

/// POST /api/v1/auth/register
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserRequest>,
) -> ZoriumResult<Json<AuthResponse>> {
    validate_request(&body)?;

    if users::find_by_username(&state.db.pg, &body.username)
        .await?
        .is_some()
    {
        return Err(ZoriumError::AlreadyExists {
            resource: "Username".into(),
        });
    }

    if let Some(ref email) = body.email {
        if users::find_by_email(&state.db.pg, email).await?.is_some() {
            return Err(ZoriumError::AlreadyExists {
                resource: "Email".into(),
            });
        }
    }

    let password_hash = auth::hash_password(&body.password).map_err(internal)?;

    let user = users::create_user(
        &state.db.pg,
        generate_id(),
        &body.username,
        body.email.as_deref(),
        &password_hash,
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ZoriumError::AlreadyExists {
                resource: "Account".into(),
            }
        } else {
            e.into()
        }
    })?;

    if let Err(e) = send_verification(&state, &user).await {
        tracing::warn!(user_id = %user.id, error = %e, "Could not queue verification email");
    }
    let early_bird = try_grant_early_bird(&state.db, &user).await;
    let tokens = auth::tokens_for(&user)?;

    tracing::info!(user_id = %user.id, username = %user.username, "New user registered");

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens,
        early_bird,
    }))
}

/// POST /api/v1/auth/login
///
/// `login` is a username or an email address.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ZoriumResult<Json<AuthResponse>> {
    validate_request(&body)?;

    let user = users::find_by_login(&state.db.pg, &body.login)
        .await?
        .ok_or(ZoriumError::InvalidCredentials)?;

    // Wallet-only accounts have no password.
    let hash = user
        .password_hash
        .as_deref()
        .ok_or(ZoriumError::InvalidCredentials)?;
    let valid =
        auth::verify_password(&body.password, hash).map_err(|_| ZoriumError::InvalidCredentials)?;
    if !valid {
        return Err(ZoriumError::InvalidCredentials);
    }

    let tokens = auth::tokens_for(&user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens,
        early_bird: None,
    }))
}

/// POST /api/v1/auth/refresh
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ZoriumResult<Json<TokenPair>> {
    let config = zorium_common::config::get();

    let claims = validate_token(&body.refresh_token, &config.auth.jwt_secret)
        .map_err(|_| ZoriumError::InvalidToken)?;
    if claims.token_type != REFRESH_TOKEN {
        return Err(ZoriumError::InvalidToken);
    }

    let user_id: uuid::Uuid = claims.sub.parse().map_err(|_| ZoriumError::InvalidToken)?;

    // Re-read the user so role changes take effect on refresh.
    let user = users::find_by_id(&state.db.pg, user_id)
        .await?
        .ok_or(ZoriumError::InvalidToken)?;

    Ok(Json(auth::tokens_for(&user)?))
}

fn parse_wallet(address: &str) -> ZoriumResult<(String, Address)> {
    let normalized = validate_address(address)?;
    let parsed = normalized
        .parse::<Address>()
        .map_err(|_| ZoriumError::validation("Invalid wallet address"))?;
    Ok((normalized, parsed))
}

/// GET /api/v1/auth/nonce/{address}
async fn issue_nonce(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ZoriumResult<Json<NonceChallenge>> {
    let (_, parsed) = parse_wallet(&address)?;
    Ok(Json(state.nonces.issue(parsed)))
}

/// Consume the pending nonce and check the signature over its message.
fn verify_wallet(state: &AppState, body: &WalletAuthRequest) -> ZoriumResult<String> {
    validate_request(body)?;
    let (normalized, parsed) = parse_wallet(&body.address)?;
    let message = state.nonces.consume(parsed)?;
    wallet::verify_signature(parsed, &message, &body.signature)?;
    Ok(normalized)
}

/// POST /api/v1/auth/wallet
///
/// Sign in with a wallet, creating a wallet-only account on first use.
async fn wallet_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WalletAuthRequest>,
) -> ZoriumResult<Json<AuthResponse>> {
    let address = verify_wallet(&state, &body)?;

    if let Some(user) = users::find_by_wallet(&state.db.pg, &address).await? {
        let tokens = auth::tokens_for(&user)?;
        tracing::info!(user_id = %user.id, "Wallet sign-in");
        return Ok(Json(AuthResponse {
            user: user.into(),
            tokens,
            early_bird: None,
        }));
    }

    let mut attempt = 1;
    let username = loop {
        let candidate = wallet_username(&address, attempt);
        if users::find_by_username(&state.db.pg, &candidate).await?.is_none() {
            break candidate;
        }
        attempt += 1;
        if attempt > 50 {
            break address.clone();
        }
    };

    let user = users::create_wallet_user(&state.db.pg, generate_id(), &username, &address)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ZoriumError::AlreadyExists {
                    resource: "Wallet".into(),
                }
            } else {
                e.into()
            }
        })?;

    let early_bird = try_grant_early_bird(&state.db, &user).await;
    let tokens = auth::tokens_for(&user)?;
    tracing::info!(user_id = %user.id, wallet = %address, "New wallet account");

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens,
        early_bird,
    }))
}

/// An account keeps the first wallet it links; switching wallets is refused.
fn ensure_no_other_wallet(current: Option<&str>, address: &str) -> ZoriumResult<()> {
    match current {
        Some(linked) if !linked.eq_ignore_ascii_case(address) => Err(ZoriumError::AlreadyExists {
            resource: "Linked wallet".into(),
        }),
        _ => Ok(()),
    }
}

/// POST /api/v1/auth/wallet/link
async fn link_wallet(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<WalletAuthRequest>,
) -> ZoriumResult<Json<UserResponse>> {
    let address = verify_wallet(&state, &body)?;

    if let Some(owner) = users::find_by_wallet(&state.db.pg, &address).await? {
        if owner.id != auth.user_id {
            return Err(ZoriumError::AlreadyExists {
                resource: "Wallet".into(),
            });
        }
        return Ok(Json(owner.into()));
    }

    let current = users::find_by_id(&state.db.pg, auth.user_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;
    ensure_no_other_wallet(current.wallet_address.as_deref(), &address)?;

    let user = users::set_wallet(&state.db.pg, auth.user_id, &address)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ZoriumError::not_found("User"),
            e if is_unique_violation(&e) => ZoriumError::AlreadyExists {
                resource: "Wallet".into(),
            },
            e => e.into(),
        })?;

    tracing::info!(user_id = %user.id, wallet = %address, "Wallet linked");
    Ok(Json(user.into()))
}

/// POST /api/v1/auth/verify-email
async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyEmailRequest>,
) -> ZoriumResult<Json<Value>> {
    let hash = hash_email_token(&body.token);

    let mut tx = state.db.pg.begin().await?;
    let token = email_tokens::find_for_update(&mut *tx, &hash, PURPOSE_VERIFY_EMAIL)
        .await?
        .filter(|t| t.is_usable(Utc::now()))
        .ok_or_else(|| ZoriumError::validation("Invalid or expired verification token"))?;

    email_tokens::mark_used(&mut *tx, token.id).await?;
    users::mark_email_verified(&mut *tx, token.user_id).await?;
    let user = users::find_by_id(&mut *tx, token.user_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;
    tx.commit().await?;

    if let Some(email) = user.email.clone() {
        state
            .email
            .send_in_background(email, state.email.welcome(&user.username));
    }

    tracing::info!(user_id = %user.id, "Email verified");
    Ok(Json(json!({ "verified": true })))
}

/// POST /api/v1/auth/resend-verification
async fn resend_verification(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> ZoriumResult<StatusCode> {
    let user = users::find_by_id(&state.db.pg, auth.user_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;

    if user.email.is_none() {
        return Err(ZoriumError::validation("No email address on this account"));
    }
    if user.email_verified {
        return Err(ZoriumError::validation("Email is already verified"));
    }

    send_verification(&state, &user).await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/auth/forgot-password
///
/// Always 202 so the response does not reveal which emails are registered.
async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ZoriumResult<StatusCode> {
    validate_request(&body)?;

    if let Some(user) = users::find_by_email(&state.db.pg, &body.email).await? {
        let token = issue_email_token(&state.db, user.id, PURPOSE_RESET_PASSWORD).await?;
        let content = state.email.password_reset(&user.username, &token);
        state.email.send_in_background(body.email, content);
        tracing::info!(user_id = %user.id, "Password reset requested");
    }

    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/auth/reset-password
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetPasswordRequest>,
) -> ZoriumResult<Json<Value>> {
    validate_request(&body)?;
    let hash = hash_email_token(&body.token);
    let password_hash = auth::hash_password(&body.password).map_err(internal)?;

    let mut tx = state.db.pg.begin().await?;
    let token = email_tokens::find_for_update(&mut *tx, &hash, PURPOSE_RESET_PASSWORD)
        .await?
        .filter(|t| t.is_usable(Utc::now()))
        .ok_or_else(|| ZoriumError::validation("Invalid or expired reset token"))?;

    users::set_password(&mut *tx, token.user_id, &password_hash).await?;
    email_tokens::mark_used(&mut *tx, token.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = %token.user_id, "Password reset");
    Ok(Json(json!({ "reset": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

    #[test]
    fn wallet_username_abbreviates_address() {
        assert_eq!(wallet_username(ADDR, 1), "0x5290...9ee7");
        assert_eq!(wallet_username(ADDR, 2), "0x5290...9ee7-2");
    }

    #[test]
    fn wallet_username_fits_username_rules() {
        let name = wallet_username(ADDR, 12);
        assert!(name.len() <= 32);
        assert!(zorium_common::validation::USERNAME_REGEX.is_match(&name));
    }

    #[test]
    fn relinking_a_different_wallet_is_a_conflict() {
        assert!(ensure_no_other_wallet(None, ADDR).is_ok());
        assert!(ensure_no_other_wallet(Some("0x52908400098527886E0F7030069857D2E4169EE7"), ADDR).is_ok());

        let other = "0x00000000000000000000000000000000000000aa";
        let err = ensure_no_other_wallet(Some(other), ADDR).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn email_token_hash_is_sha256_hex() {
        let hash = hash_email_token("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_email_token(" abc\n"), hash);
    }
}
