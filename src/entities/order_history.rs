use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Area;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "transfer_created")]
    TransferCreated,
    #[sea_orm(string_value = "transfer_accepted")]
    TransferAccepted,
    #[sea_orm(string_value = "transfer_rejected")]
    TransferRejected,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// The `order_history` audit log. Append-only; rows only ever disappear
/// through the order hard-delete cascade.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub action: OrderAction,
    pub description: String,
    pub from_area: Option<Area>,
    pub to_area: Option<Area>,
    pub pieces: Option<i32>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
