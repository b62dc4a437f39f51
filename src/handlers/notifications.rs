use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::domain::Actor;
use crate::{ApiResponse, ApiResult, AppState};

pub async fn list_notifications(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Vec<crate::entities::notification::Model>> {
    let rows = state.services.notifications.list_for_user(actor.id).await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.notifications.mark_read(id).await?;
    Ok(Json(ApiResponse::success(())))
}
