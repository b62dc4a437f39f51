use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Area;

/// Lifecycle of a production order. Orders are hard-deleted (with full
/// cascade) rather than archived; repositions are the soft-delete side of
/// the house.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// The `orders` table: one garment production job.
///
/// `total_piezas` is immutable after creation; the per-area split lives in
/// `order_pieces`. `current_area` is denormalized and only trustworthy
/// while a single area holds every piece — the pieces read model exposes
/// the derived resident area for everything else.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Caller-supplied human-readable identifier, unique across orders.
    #[sea_orm(unique)]
    pub folio: String,
    pub cliente_hotel: String,
    pub no_solicitud: String,
    pub no_hoja: Option<String>,
    pub modelo: String,
    pub tipo_prenda: String,
    pub color: String,
    pub tela: String,
    pub total_piezas: i32,
    pub current_area: Area,
    pub status: OrderStatus,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_piece::Entity")]
    OrderPieces,
    #[sea_orm(has_many = "super::transfer::Entity")]
    Transfers,
    #[sea_orm(has_many = "super::order_history::Entity")]
    OrderHistory,
}

impl Related<super::order_piece::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderPieces.def()
    }
}

impl Related<super::transfer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transfers.def()
    }
}

impl Related<super::order_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
