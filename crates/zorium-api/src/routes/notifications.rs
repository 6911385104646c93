//! Notification inbox routes.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;
use zorium_common::{
    error::{ZoriumError, ZoriumResult},
    models::notification::{Notification, NotificationFilter},
    pagination::PageParams,
};
use zorium_db::repository::notifications;

use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{notification_id}/read", post(mark_read))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// GET /api/v1/notifications
async fn list_notifications(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
    Query(filter): Query<NotificationFilter>,
) -> ZoriumResult<Json<Vec<Notification>>> {
    let (limit, offset) = super::page_window(&params);
    Ok(Json(
        notifications::list_for_user(&state.db.pg, auth.user_id, filter.unread_only, limit, offset)
            .await?,
    ))
}

/// GET /api/v1/notifications/unread-count
async fn unread_count(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> ZoriumResult<Json<Value>> {
    let count = notifications::unread_count(&state.db.pg, auth.user_id).await?;
    Ok(Json(json!({ "unread": count })))
}

/// POST /api/v1/notifications/{notification_id}/read
async fn mark_read(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<Uuid>,
) -> ZoriumResult<StatusCode> {
    if !notifications::mark_read(&state.db.pg, notification_id, auth.user_id).await? {
        return Err(ZoriumError::not_found("Notification"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
async fn mark_all_read(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> ZoriumResult<Json<Value>> {
    let updated = notifications::mark_all_read(&state.db.pg, auth.user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}
