//! Social routes: comments, likes and follows. Actions on someone else's
//! content notify its owner.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use uuid::Uuid;
use zorium_common::{
    error::{ZoriumError, ZoriumResult},
    ids::generate_id,
    models::{
        notification::{NOTIFY_COMMENT, NOTIFY_FOLLOW, NOTIFY_LIKE},
        social::{Comment, CommentWithAuthor, CreateCommentRequest, FollowState, LikeState},
        user::UserResponse,
    },
    pagination::{Page, PageParams},
    validation::validate_request,
};
use zorium_db::repository::{comments, follows, likes, notifications, users};

use super::nfts::require_nft;
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/nfts/{nft_id}/comments", get(list_comments))
        .route("/users/{user_id}/followers", get(list_followers))
        .route("/users/{user_id}/following", get(list_following));

    let protected = Router::new()
        .route("/nfts/{nft_id}/comments", post(create_comment))
        .route("/comments/{comment_id}", delete(delete_comment))
        .route("/nfts/{nft_id}/like", post(like_nft).delete(unlike_nft))
        .route("/users/{user_id}/follow", post(follow_user).delete(unfollow_user))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

/// Best-effort notification; a failure is logged and swallowed.
async fn notify(
    state: &AppState,
    user_id: Uuid,
    kind: &str,
    actor: &AuthContext,
    nft_id: Option<Uuid>,
    message: String,
) {
    if user_id == actor.user_id {
        return;
    }
    if let Err(e) = notifications::create_notification(
        &state.db.pg,
        generate_id(),
        user_id,
        kind,
        Some(actor.user_id),
        nft_id,
        &message,
    )
    .await
    {
        tracing::warn!(user_id = %user_id, kind, error = %e, "Failed to create notification");
    }
}

/// GET /api/v1/nfts/{nft_id}/comments
async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(nft_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ZoriumResult<Json<Page<CommentWithAuthor>>> {
    require_nft(&state, nft_id).await?;
    let (limit, offset) = super::page_window(&params);
    let items = comments::list_for_nft(&state.db.pg, nft_id, limit, offset).await?;
    let total = comments::count_for_nft(&state.db.pg, nft_id).await?;
    Ok(Json(Page::new(items, &params, limit, total)))
}

/// POST /api/v1/nfts/{nft_id}/comments
async fn create_comment(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(nft_id): Path<Uuid>,
    Json(body): Json<CreateCommentRequest>,
) -> ZoriumResult<Json<Comment>> {
    validate_request(&body)?;

    let content = body.content.trim();
    let max = zorium_common::config::get().limits.max_comment_length;
    if content.is_empty() {
        return Err(ZoriumError::validation("Comment cannot be empty"));
    }
    if content.chars().count() > max {
        return Err(ZoriumError::validation(format!(
            "Comment must be at most {max} characters"
        )));
    }

    let nft = require_nft(&state, nft_id).await?;

    if let Some(parent_id) = body.parent_id {
        let parent = comments::find_by_id(&state.db.pg, parent_id)
            .await?
            .ok_or_else(|| ZoriumError::not_found("Parent comment"))?;
        if parent.nft_id != nft_id {
            return Err(ZoriumError::validation(
                "Parent comment belongs to a different NFT",
            ));
        }
    }

    let comment = comments::create_comment(
        &state.db.pg,
        generate_id(),
        nft_id,
        auth.user_id,
        body.parent_id,
        content,
    )
    .await?;

    notify(
        &state,
        nft.owner_id,
        NOTIFY_COMMENT,
        &auth,
        Some(nft_id),
        format!("{} commented on {}", auth.username, nft.name),
    )
    .await;

    Ok(Json(comment))
}

/// DELETE /api/v1/comments/{comment_id} (author or admin)
async fn delete_comment(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(comment_id): Path<Uuid>,
) -> ZoriumResult<StatusCode> {
    let comment = comments::find_by_id(&state.db.pg, comment_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("Comment"))?;

    if comment.user_id != auth.user_id && !auth.is_admin() {
        return Err(ZoriumError::Forbidden);
    }

    comments::delete_comment(&state.db.pg, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/nfts/{nft_id}/like
async fn like_nft(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(nft_id): Path<Uuid>,
) -> ZoriumResult<Json<LikeState>> {
    let nft = require_nft(&state, nft_id).await?;

    if likes::add_like(&state.db.pg, auth.user_id, nft_id).await? {
        notify(
            &state,
            nft.owner_id,
            NOTIFY_LIKE,
            &auth,
            Some(nft_id),
            format!("{} liked {}", auth.username, nft.name),
        )
        .await;
    }

    Ok(Json(LikeState {
        nft_id,
        liked: true,
        like_count: likes::count_for_nft(&state.db.pg, nft_id).await?,
    }))
}

/// DELETE /api/v1/nfts/{nft_id}/like
async fn unlike_nft(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(nft_id): Path<Uuid>,
) -> ZoriumResult<Json<LikeState>> {
    require_nft(&state, nft_id).await?;
    likes::remove_like(&state.db.pg, auth.user_id, nft_id).await?;

    Ok(Json(LikeState {
        nft_id,
        liked: false,
        like_count: likes::count_for_nft(&state.db.pg, nft_id).await?,
    }))
}

async fn require_follow_target(
    state: &AppState,
    auth: &AuthContext,
    user_id: Uuid,
) -> ZoriumResult<()> {
    if user_id == auth.user_id {
        return Err(ZoriumError::validation("You cannot follow yourself"));
    }
    users::find_by_id(&state.db.pg, user_id)
        .await?
        .ok_or_else(|| ZoriumError::not_found("User"))?;
    Ok(())
}

/// POST /api/v1/users/{user_id}/follow
async fn follow_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ZoriumResult<Json<FollowState>> {
    require_follow_target(&state, &auth, user_id).await?;

    if follows::follow(&state.db.pg, auth.user_id, user_id).await? {
        notify(
            &state,
            user_id,
            NOTIFY_FOLLOW,
            &auth,
            None,
            format!("{} started following you", auth.username),
        )
        .await;
    }

    Ok(Json(FollowState {
        user_id,
        following: true,
        followers: follows::count_followers(&state.db.pg, user_id).await?,
    }))
}

/// DELETE /api/v1/users/{user_id}/follow
async fn unfollow_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ZoriumResult<Json<FollowState>> {
    require_follow_target(&state, &auth, user_id).await?;
    follows::unfollow(&state.db.pg, auth.user_id, user_id).await?;

    Ok(Json(FollowState {
        user_id,
        following: false,
        followers: follows::count_followers(&state.db.pg, user_id).await?,
    }))
}

/// GET /api/v1/users/{user_id}/followers
async fn list_followers(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ZoriumResult<Json<Vec<UserResponse>>> {
    let (limit, offset) = super::page_window(&params);
    let list = follows::list_followers(&state.db.pg, user_id, limit, offset).await?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/users/{user_id}/following
async fn list_following(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ZoriumResult<Json<Vec<UserResponse>>> {
    let (limit, offset) = super::page_window(&params);
    let list = follows::list_following(&state.db.pg, user_id, limit, offset).await?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}
