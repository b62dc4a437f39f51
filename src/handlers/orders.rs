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
use crate::services::orders::CreateOrderRequest;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub area: Option<Area>,
}

pub async fn create_order(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.create_order(actor, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

pub async fn list_orders(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<Vec<crate::entities::order::Model>> {
    let orders = state.services.orders.list_orders(query.area).await?;
    Ok(Json(ApiResponse::success(orders)))
}

pub async fn get_order(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<crate::entities::order::Model> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))?;
    Ok(Json(ApiResponse::success(order)))
}

pub async fn get_order_by_folio(
    State(state): State<AppState>,
    _actor: Actor,
    Path(folio): Path<String>,
) -> ApiResult<crate::entities::order::Model> {
    let order = state
        .services
        .orders
        .get_order_by_folio(&folio)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order with folio {folio} not found")))?;
    Ok(Json(ApiResponse::success(order)))
}

pub async fn get_order_pieces(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<crate::services::orders::OrderPiecesResponse> {
    let pieces = state.services.orders.order_pieces(id).await?;
    Ok(Json(ApiResponse::success(pieces)))
}

pub async fn get_order_history(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<crate::entities::order_history::Model>> {
    let history = state.services.orders.order_history(id).await?;
    Ok(Json(ApiResponse::success(history)))
}

pub async fn complete_order(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<crate::entities::order::Model> {
    let order = state.services.orders.complete_order(actor, id).await?;
    Ok(Json(ApiResponse::success(order)))
}

pub async fn delete_order(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.orders.delete_order(actor, id).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<crate::services::orders::DashboardStats> {
    let stats = state.services.orders.dashboard_stats(actor).await?;
    Ok(Json(ApiResponse::success(stats)))
}
