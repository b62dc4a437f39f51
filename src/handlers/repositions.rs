use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Actor, Area};
use crate::errors::ServiceError;
use crate::services::reposition_transfers::ProcessDecision;
use crate::services::repositions::{CreateRepositionRequest, ReviewDecision};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RepositionsQuery {
    pub area: Option<Area>,
    #[serde(default)]
    pub include_finished: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewDecision,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RepositionTransferRequest {
    pub to_area: Area,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessTransferRequest {
    pub action: ProcessDecision,
}

#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub reason: String,
}

pub async fn create_reposition(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CreateRepositionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let reposition = state
        .services
        .repositions
        .create_reposition(actor, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(reposition))))
}

pub async fn list_repositions(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<RepositionsQuery>,
) -> ApiResult<Vec<crate::entities::reposition::Model>> {
    let area = query.area.or(Some(actor.area));
    let rows = state
        .services
        .repositions
        .list(actor, area, query.include_finished)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn get_reposition(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<crate::entities::reposition::Model> {
    let row = state
        .services
        .repositions
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Reposition {id} not found")))?;
    Ok(Json(ApiResponse::success(row)))
}

pub async fn get_reposition_pieces(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<crate::entities::reposition_piece::Model>> {
    let rows = state.services.repositions.pieces(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn get_reposition_history(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<crate::entities::reposition_history::Model>> {
    let rows = state.services.repositions.history(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn review_reposition(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<crate::entities::reposition::Model> {
    let row = state
        .services
        .repositions
        .review(actor, id, request.action, request.notes)
        .await?;
    Ok(Json(ApiResponse::success(row)))
}

pub async fn request_completion(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<CompletionRequest>,
) -> ApiResult<()> {
    state
        .services
        .repositions
        .request_completion(actor, id, request.notes)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn complete_reposition(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<CompletionRequest>,
) -> ApiResult<crate::entities::reposition::Model> {
    let row = state
        .services
        .repositions
        .complete(actor, id, request.notes)
        .await?;
    Ok(Json(ApiResponse::success(row)))
}

pub async fn delete_reposition(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<crate::entities::reposition::Model> {
    let row = state
        .services
        .repositions
        .delete(actor, id, &request.reason)
        .await?;
    Ok(Json(ApiResponse::success(row)))
}

pub async fn create_reposition_transfer(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<RepositionTransferRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let transfer = state
        .services
        .reposition_transfers
        .request_transfer(actor, id, request.to_area, request.notes)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(transfer))))
}

pub async fn process_reposition_transfer(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<ProcessTransferRequest>,
) -> ApiResult<crate::entities::reposition_transfer::Model> {
    let transfer = state
        .services
        .reposition_transfers
        .process(actor, id, request.action)
        .await?;
    Ok(Json(ApiResponse::success(transfer)))
}

pub async fn pending_reposition_transfers(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Vec<crate::entities::reposition_transfer::Model>> {
    let rows = state
        .services
        .reposition_transfers
        .pending_for_area(actor.area)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn reposition_tracking(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<crate::services::tracking::TrackingResponse> {
    let tracking = state.services.tracking.tracking(id).await?;
    Ok(Json(ApiResponse::success(tracking)))
}
