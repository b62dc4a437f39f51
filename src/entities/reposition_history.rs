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
pub enum RepositionAction {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "transfer_requested")]
    TransferRequested,
    #[sea_orm(string_value = "transfer_accepted")]
    TransferAccepted,
    #[sea_orm(string_value = "transfer_rejected")]
    TransferRejected,
    #[sea_orm(string_value = "completion_requested")]
    CompletionRequested,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

/// The `reposition_history` audit log. Append-only; survives soft
/// deletion (an `eliminado` ticket keeps its full trail).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reposition_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reposition_id: Uuid,
    pub action: RepositionAction,
    pub description: String,
    pub from_area: Option<Area>,
    pub to_area: Option<Area>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reposition::Entity",
        from = "Column::RepositionId",
        to = "super::reposition::Column::Id"
    )]
    Reposition,
}

impl Related<super::reposition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reposition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
