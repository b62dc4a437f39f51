//! Taller API Library
//!
//! Core domain logic for the garment production tracker: the piece
//! ledger, order and reposition transfer state machines, audit history
//! and the notification sink, behind a thin HTTP adapter.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub broadcaster: events::RealtimeBroadcaster,
    pub services: handlers::AppServices,
}

// Common response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// API routes
pub fn api_v1_routes() -> Router<AppState> {
    let orders = Router::new()
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route(
            "/orders/:id",
            get(handlers::orders::get_order).delete(handlers::orders::delete_order),
        )
        .route(
            "/orders/by-folio/:folio",
            get(handlers::orders::get_order_by_folio),
        )
        .route("/orders/:id/pieces", get(handlers::orders::get_order_pieces))
        .route(
            "/orders/:id/history",
            get(handlers::orders::get_order_history),
        )
        .route(
            "/orders/:id/complete",
            post(handlers::orders::complete_order),
        )
        .route("/dashboard/stats", get(handlers::orders::dashboard_stats));

    let transfers = Router::new()
        .route("/transfers", post(handlers::transfers::create_transfer))
        .route(
            "/transfers/pending",
            get(handlers::transfers::pending_transfers),
        )
        .route("/transfers/area", get(handlers::transfers::area_transfers))
        .route(
            "/transfers/:id/accept",
            post(handlers::transfers::accept_transfer),
        )
        .route(
            "/transfers/:id/reject",
            post(handlers::transfers::reject_transfer),
        );

    let repositions = Router::new()
        .route(
            "/repositions",
            get(handlers::repositions::list_repositions)
                .post(handlers::repositions::create_reposition),
        )
        .route(
            "/repositions/pending-transfers",
            get(handlers::repositions::pending_reposition_transfers),
        )
        .route(
            "/repositions/transfers/:id/process",
            post(handlers::repositions::process_reposition_transfer),
        )
        .route(
            "/repositions/:id",
            get(handlers::repositions::get_reposition)
                .delete(handlers::repositions::delete_reposition),
        )
        .route(
            "/repositions/:id/pieces",
            get(handlers::repositions::get_reposition_pieces),
        )
        .route(
            "/repositions/:id/history",
            get(handlers::repositions::get_reposition_history),
        )
        .route(
            "/repositions/:id/tracking",
            get(handlers::repositions::reposition_tracking),
        )
        .route(
            "/repositions/:id/transfer",
            post(handlers::repositions::create_reposition_transfer),
        )
        .route(
            "/repositions/:id/approval",
            post(handlers::repositions::review_reposition),
        )
        .route(
            "/repositions/:id/request-completion",
            post(handlers::repositions::request_completion),
        )
        .route(
            "/repositions/:id/complete",
            post(handlers::repositions::complete_reposition),
        );

    let notifications = Router::new()
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/notifications/:id/read",
            post(handlers::notifications::mark_notification_read),
        );

    let areas = Router::new().route(
        "/areas/:area/destinations",
        get(handlers::areas::legal_destinations),
    );

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(orders)
        .merge(transfers)
        .merge(repositions)
        .merge(notifications)
        .merge(areas)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "taller-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
            "broadcast_subscribers": state.broadcaster.subscriber_count(),
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
