use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::domain::Actor;
use crate::errors::ServiceError;
use crate::services::transfers::RequestTransferRequest;
use crate::{ApiResponse, ApiResult, AppState};

pub async fn create_transfer(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<RequestTransferRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let transfer = state
        .services
        .transfers
        .request_transfer(actor, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(transfer))))
}

/// Pending transfers addressed to the caller's area.
pub async fn pending_transfers(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Vec<crate::entities::transfer::Model>> {
    let transfers = state.services.transfers.pending_for_area(actor.area).await?;
    Ok(Json(ApiResponse::success(transfers)))
}

/// All transfers touching the caller's area.
pub async fn area_transfers(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Vec<crate::entities::transfer::Model>> {
    let transfers = state.services.transfers.list_for_area(actor.area).await?;
    Ok(Json(ApiResponse::success(transfers)))
}

pub async fn accept_transfer(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<crate::entities::transfer::Model> {
    let transfer = state.services.transfers.accept(actor, id).await?;
    Ok(Json(ApiResponse::success(transfer)))
}

pub async fn reject_transfer(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<crate::entities::transfer::Model> {
    let transfer = state.services.transfers.reject(actor, id).await?;
    Ok(Json(ApiResponse::success(transfer)))
}
